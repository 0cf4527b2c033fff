use crate::core::{Buffer, ElementIo, Payload, ProcessingElement};
use anyhow::Result;
use async_trait::async_trait;
use framewire_macros::FlowElement;
use serde::{Deserialize, Serialize};

/// Adds a constant offset to every pixel of incoming frames.
///
/// Mutates the frame in place when it holds the only remaining reference
/// to the buffer; otherwise (another consumer still queued behind a
/// fan-out) it copies the payload first, so shared buffers are never
/// modified under another holder.
#[derive(FlowElement, Debug, Clone, Serialize, Deserialize)]
#[element_meta(name = "Brightness", category = "Processors")]
pub struct Brightness {
    #[input(name = "Frame In", data_type = "frame")]
    _in: (),

    #[output(name = "Frame Out", data_type = "frame")]
    _out: (),

    #[param(default = "16")]
    pub offset: f64,
}

impl Brightness {
    pub const INPUT: &'static str = "in";
    pub const OUTPUT: &'static str = "out";

    pub fn new(offset: f64) -> Self {
        Self {
            _in: (),
            _out: (),
            offset,
        }
    }

    fn apply(&self, pixels: &mut [u8]) {
        for px in pixels.iter_mut() {
            *px = (*px as f64 + self.offset).clamp(0.0, 255.0) as u8;
        }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new(16.0)
    }
}

#[async_trait]
impl ProcessingElement for Brightness {
    async fn on_create(&mut self, config: serde_json::Value) -> Result<()> {
        if let Some(offset) = config.get("offset").and_then(|v| v.as_f64()) {
            self.offset = offset;
        }
        Ok(())
    }

    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()> {
        let mut buffer = match io.pop(Self::INPUT) {
            Some(buffer) => buffer,
            None => return Ok(()),
        };

        let out = if let Some(Payload::Frame(frame)) = buffer.try_payload_mut() {
            self.apply(&mut frame.pixels);
            buffer
        } else {
            let mut payload = buffer.to_owned_payload();
            if let Payload::Frame(frame) = &mut payload {
                self.apply(&mut frame.pixels);
            }
            Buffer::with_timestamp(payload, buffer.sequence(), buffer.timestamp_us())
        };

        io.push(Self::OUTPUT, out)?;
        Ok(())
    }
}
