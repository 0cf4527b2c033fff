use crate::core::{ElementIo, Payload, ProcessingElement, VideoFrame};
use anyhow::Result;
use async_trait::async_trait;
use framewire_macros::FlowElement;
use serde::{Deserialize, Serialize};

/// Passive inspection point for a fan-out.
///
/// Keeps a copy of the most recent frame it observes and never mutates
/// the shared buffer, so it can sit next to any other consumer on the
/// same output pin.
#[derive(FlowElement, Debug, Clone, Serialize, Deserialize)]
#[element_meta(name = "Passive Tap", category = "Sinks")]
pub struct PassiveTap {
    #[input(name = "Frame In", data_type = "frame")]
    _in: (),

    #[serde(skip)]
    pub observed: u64,

    #[serde(skip)]
    pub last_sequence: Option<u64>,

    #[serde(skip)]
    pub last_frame: Option<VideoFrame>,
}

impl PassiveTap {
    pub const INPUT: &'static str = "in";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for PassiveTap {
    fn default() -> Self {
        Self {
            _in: (),
            observed: 0,
            last_sequence: None,
            last_frame: None,
        }
    }
}

#[async_trait]
impl ProcessingElement for PassiveTap {
    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()> {
        while let Some(buffer) = io.pop(Self::INPUT) {
            if let Payload::Frame(frame) = buffer.payload() {
                self.last_frame = Some(frame.clone());
            }
            self.last_sequence = Some(buffer.sequence());
            self.observed += 1;
        }
        Ok(())
    }
}
