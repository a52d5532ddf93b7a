use std::path::Path;

use thiserror::Error;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A frame the decoder could not produce. The stream continues after it.
#[derive(Error, Debug)]
#[error("frame {position}: {message}")]
pub struct FrameDecodeError {
    /// Position in decode order, counting earlier failures.
    pub position: usize,
    pub message: String,
}

/// Decodes a source video into RGB frames.
///
/// Keying only ever sees [`Frame`] and [`VideoMetadata`]; container and codec
/// details stay behind this trait.
pub trait VideoReader: Send {
    /// Opens the source and reports its stream properties.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, BoxError>;

    /// Frames in decode order. A per-frame `Err` does not end the stream;
    /// readers report it as a [`FrameDecodeError`] when they know the position.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, BoxError>> + '_>;

    fn close(&mut self);
}
