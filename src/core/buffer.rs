use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Payload type tag carried by buffers and declared on pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Frame,
    Audio,
    Trigger,
}

impl DataType {
    /// Parse a registry data type string ("frame", "audio", "trigger").
    pub fn parse(s: &str) -> Option<DataType> {
        match s {
            "frame" => Some(DataType::Frame),
            "audio" => Some(DataType::Audio),
            "trigger" => Some(DataType::Trigger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Frame => "frame",
            DataType::Audio => "audio",
            DataType::Trigger => "trigger",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single grayscale image frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    /// Create a black frame of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn with_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Block of audio samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioBlock {
    pub sample_rate: u32,
    pub samples: Vec<f64>,
}

/// Unit of data flowing between elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    Frame(VideoFrame),
    Audio(AudioBlock),
    Trigger,
}

impl Payload {
    pub fn data_type(&self) -> DataType {
        match self {
            Payload::Frame(_) => DataType::Frame,
            Payload::Audio(_) => DataType::Audio,
            Payload::Trigger => DataType::Trigger,
        }
    }
}

/// Shared-ownership buffer passed between elements without copying.
///
/// Clone is cheap (reference count increment). Every holder (producing
/// element, connection queue, consuming element) shares ownership of the
/// same payload, and the payload is dropped exactly once when the last
/// holder releases it. A holder may only mutate the payload in place while
/// it is the sole remaining holder; otherwise it must copy.
#[derive(Debug, Clone)]
pub struct Buffer {
    inner: Arc<BufferInner>,
}

#[derive(Debug)]
struct BufferInner {
    payload: Payload,
    sequence: u64,
    timestamp_us: u64,
}

impl Buffer {
    /// Create a buffer stamped with the current wall-clock time.
    pub fn new(payload: Payload, sequence: u64) -> Self {
        Self::with_timestamp(payload, sequence, now_micros())
    }

    pub fn with_timestamp(payload: Payload, sequence: u64, timestamp_us: u64) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                payload,
                sequence,
                timestamp_us,
            }),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.inner.payload.data_type()
    }

    pub fn payload(&self) -> &Payload {
        &self.inner.payload
    }

    /// Sequential number assigned by the producer, for ordering.
    pub fn sequence(&self) -> u64 {
        self.inner.sequence
    }

    /// Timestamp in microseconds since epoch.
    pub fn timestamp_us(&self) -> u64 {
        self.inner.timestamp_us
    }

    /// Number of holders currently sharing this buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// True when this handle is the sole remaining holder.
    pub fn is_exclusive(&self) -> bool {
        self.ref_count() == 1
    }

    /// Mutable access to the payload, granted only to the sole holder.
    ///
    /// Returns `None` while any other holder (a connection queue, another
    /// consumer) still references this buffer.
    pub fn try_payload_mut(&mut self) -> Option<&mut Payload> {
        Arc::get_mut(&mut self.inner).map(|inner| &mut inner.payload)
    }

    /// Copy of the payload, for consumers that must modify shared data.
    pub fn to_owned_payload(&self) -> Payload {
        self.inner.payload.clone()
    }
}

/// Microseconds since the Unix epoch.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
