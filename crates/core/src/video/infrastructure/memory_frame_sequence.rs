use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_sequence::MattedFrameSequence;

/// Keeps every keyed frame in memory. Suited to short clips and tests.
#[derive(Default)]
pub struct InMemoryFrameSequence {
    frames: Vec<Frame>,
}

impl InMemoryFrameSequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MattedFrameSequence for InMemoryFrameSequence {
    fn push(&mut self, frame: Frame) -> Result<(), BoxError> {
        self.frames.push(frame);
        Ok(())
    }

    fn get(&self, position: usize) -> Result<Frame, BoxError> {
        self.frames
            .get(position)
            .cloned()
            .ok_or_else(|| format!("no frame at position {position}").into())
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}
