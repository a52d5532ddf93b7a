use crate::shared::frame::Frame;

/// Domain interface for turning a source frame into an alpha-matted frame.
///
/// Implementations are pure: the same RGB frame always yields the same RGBA
/// frame, so one keyer can serve a whole job.
pub trait FrameKeyer: Send {
    fn key(&self, frame: &Frame) -> Frame;
}
