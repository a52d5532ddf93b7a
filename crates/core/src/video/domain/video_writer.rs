use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Encodes composited RGB frames to an output file.
pub trait VideoWriter: Send {
    /// Prepares an encoder for `metadata.codec` (a fourcc such as `avc1`).
    ///
    /// An `Err` means this codec is unavailable; the caller may try another.
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), BoxError>;

    fn write(&mut self, frame: &Frame) -> Result<(), BoxError>;

    /// Flushes buffered packets and finalizes the container.
    fn close(&mut self) -> Result<(), BoxError>;
}
