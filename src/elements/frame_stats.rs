use crate::core::{ElementIo, Payload, ProcessingElement};
use anyhow::Result;
use async_trait::async_trait;
use framewire_macros::FlowElement;
use serde::{Deserialize, Serialize};

/// Sink that prints per-frame statistics.
#[derive(FlowElement, Debug, Clone, Serialize, Deserialize)]
#[element_meta(name = "Frame Stats", category = "Sinks")]
pub struct FrameStats {
    #[input(name = "Frame In", data_type = "frame")]
    _in: (),

    #[param(default = "\"Output\"")]
    pub label: String,

    #[serde(skip)]
    pub frames_seen: u64,
}

impl FrameStats {
    pub const INPUT: &'static str = "in";

    pub fn new(label: impl Into<String>) -> Self {
        Self {
            _in: (),
            label: label.into(),
            frames_seen: 0,
        }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new("Output")
    }
}

#[async_trait]
impl ProcessingElement for FrameStats {
    async fn on_create(&mut self, config: serde_json::Value) -> Result<()> {
        if let Some(label) = config.get("label").and_then(|v| v.as_str()) {
            self.label = label.to_string();
        }
        Ok(())
    }

    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()> {
        while let Some(buffer) = io.pop(Self::INPUT) {
            if let Payload::Frame(frame) = buffer.payload() {
                let mean = if frame.pixels.is_empty() {
                    0.0
                } else {
                    frame.pixels.iter().map(|&p| p as f64).sum::<f64>() / frame.pixels.len() as f64
                };
                println!(
                    "[{}] Frame #{} {}x{} mean={:.1}",
                    self.label,
                    buffer.sequence(),
                    frame.width,
                    frame.height,
                    mean
                );
            }
            self.frames_seen += 1;
        }
        Ok(())
    }
}
