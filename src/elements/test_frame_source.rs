use crate::core::{Buffer, ElementIo, ElementState, Payload, ProcessingElement, VideoFrame};
use anyhow::Result;
use async_trait::async_trait;
use framewire_macros::FlowElement;
use serde::{Deserialize, Serialize};

/// Synthesizes gradient test frames.
///
/// Without a trigger channel the source is ready every tick until
/// `frame_limit` is reached. With one, readiness follows the capture
/// signal: a worker thread (a camera loop, a timer) sends on the channel
/// and the source emits one frame per signal, never blocking the
/// scheduler.
#[derive(FlowElement, Debug, Clone, Serialize, Deserialize)]
#[element_meta(name = "Test Frame Source", category = "Sources")]
pub struct TestFrameSource {
    #[output(name = "Frame Out", data_type = "frame")]
    _out: (),

    #[param(default = "320", min = 1.0, max = 8192.0)]
    pub width: u32,

    #[param(default = "240", min = 1.0, max = 8192.0)]
    pub height: u32,

    /// Frames to emit before going quiet; 0 means unlimited.
    #[param(default = "0")]
    pub frame_limit: u64,

    #[serde(skip)]
    sequence: u64,

    #[serde(skip)]
    trigger: Option<crossbeam_channel::Receiver<()>>,
}

impl TestFrameSource {
    pub const OUTPUT: &'static str = "out";

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_limit(width: u32, height: u32, frame_limit: u64) -> Self {
        Self {
            width,
            height,
            frame_limit,
            ..Default::default()
        }
    }

    /// Emit one frame per signal received on the channel.
    pub fn with_trigger(
        width: u32,
        height: u32,
        trigger: crossbeam_channel::Receiver<()>,
    ) -> Self {
        Self {
            width,
            height,
            trigger: Some(trigger),
            ..Default::default()
        }
    }

    fn synthesize(&self) -> VideoFrame {
        let (width, height) = (self.width, self.height);
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x + y + self.sequence as u32) & 0xff) as u8);
            }
        }
        VideoFrame::with_pixels(width, height, pixels)
    }
}

impl Default for TestFrameSource {
    fn default() -> Self {
        Self {
            _out: (),
            width: 320,
            height: 240,
            frame_limit: 0,
            sequence: 0,
            trigger: None,
        }
    }
}

#[async_trait]
impl ProcessingElement for TestFrameSource {
    async fn on_create(&mut self, config: serde_json::Value) -> Result<()> {
        if let Some(w) = config.get("width").and_then(|v| v.as_u64()) {
            self.width = w as u32;
        }
        if let Some(h) = config.get("height").and_then(|v| v.as_u64()) {
            self.height = h as u32;
        }
        if let Some(limit) = config.get("frame_limit").and_then(|v| v.as_u64()) {
            self.frame_limit = limit;
        }
        Ok(())
    }

    async fn init(&mut self) -> Result<ElementState> {
        Ok(ElementState::Ready)
    }

    fn is_ready_for_processing(&self, _io: &ElementIo<'_>) -> bool {
        if self.frame_limit > 0 && self.sequence >= self.frame_limit {
            return false;
        }
        match &self.trigger {
            Some(rx) => !rx.is_empty(),
            None => true,
        }
    }

    async fn process(&mut self, io: &mut ElementIo<'_>) -> Result<()> {
        if let Some(rx) = &self.trigger {
            if rx.try_recv().is_err() {
                return Ok(());
            }
        }

        let frame = self.synthesize();
        io.push(Self::OUTPUT, Buffer::new(Payload::Frame(frame), self.sequence))?;
        self.sequence += 1;
        Ok(())
    }
}
