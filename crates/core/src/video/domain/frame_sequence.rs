use crate::shared::error::BoxError;
use crate::shared::frame::Frame;

/// Ordered, index-addressable store of keyed frames.
///
/// Extract appends in source order; Compose reads back by position. The
/// sequence owns whatever storage it uses and releases it on drop.
pub trait MattedFrameSequence: Send {
    fn push(&mut self, frame: Frame) -> Result<(), BoxError>;

    /// Reads the frame at `position` (0-based, in push order).
    fn get(&self, position: usize) -> Result<Frame, BoxError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
