use std::path::PathBuf;

use crate::shared::constants::FALLBACK_FPS;

/// Stream properties shared between readers and writers.
///
/// For writers, `codec` holds the fourcc requested for the output stream.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Frame rate to encode at; containers that report no rate get 30 fps.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            FALLBACK_FPS
        }
    }
}
