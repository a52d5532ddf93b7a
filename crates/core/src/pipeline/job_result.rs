use std::path::PathBuf;

use serde::Serialize;

/// Outcome of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    /// Frames actually written to the output.
    pub frame_count: usize,
    pub fps: f64,
    pub output_path: PathBuf,
    /// Fourcc of the encoder that opened.
    pub codec: String,
}

/// Outcome of the extract phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractSummary {
    pub frame_count: usize,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    /// Frames the decoder reported but that could not be used.
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_result_serializes_to_json() {
        let result = JobResult {
            frame_count: 12,
            fps: 25.0,
            output_path: PathBuf::from("/tmp/out.mp4"),
            codec: "avc1".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["frame_count"], 12);
        assert_eq!(json["fps"], 25.0);
        assert_eq!(json["output_path"], "/tmp/out.mp4");
        assert_eq!(json["codec"], "avc1");
    }
}
