use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compositing::domain::background_spec::{BackgroundSpec, FitMode};
use crate::compositing::infrastructure::background_loader;
use crate::keying::domain::key_color::KeyColorSpec;
use crate::shared::constants::DEFAULT_BACKGROUND_COLOR;
use crate::shared::error::ChromaKeyError;

/// One background replacement job in a batch manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchJob {
    /// Local path or http(s) URL.
    pub input: String,
    pub output: PathBuf,
    #[serde(default)]
    pub bg_color: Option<[u8; 3]>,
    /// Path or data URL; takes precedence over `bg_color`.
    #[serde(default)]
    pub bg_image: Option<String>,
    #[serde(default)]
    pub bg_mode: Option<FitMode>,
    #[serde(default)]
    pub key_color: Option<[u8; 3]>,
}

impl BatchJob {
    /// Builds the background, loading `image_source` when the job names an
    /// image. `image_source` is the (possibly downloaded) local form of
    /// `bg_image`.
    pub fn background(&self, image_source: Option<&str>) -> Result<BackgroundSpec, ChromaKeyError> {
        match image_source.or(self.bg_image.as_deref()) {
            Some(source) => Ok(BackgroundSpec::Image(
                background_loader::load(source)?,
                self.bg_mode.unwrap_or_default(),
            )),
            None => Ok(BackgroundSpec::SolidColor(
                self.bg_color.unwrap_or(DEFAULT_BACKGROUND_COLOR),
            )),
        }
    }

    pub fn key_color(&self) -> KeyColorSpec {
        self.key_color.map(KeyColorSpec::new).unwrap_or_default()
    }
}

/// A JSON file of the form `{"jobs": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchManifest {
    pub jobs: Vec<BatchJob>,
}

impl BatchManifest {
    pub fn from_file(path: &Path) -> Result<Self, ChromaKeyError> {
        let json = fs::read_to_string(path).map_err(|e| {
            ChromaKeyError::InvalidConfig(format!("cannot read manifest {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ChromaKeyError> {
        serde_json::from_str(json)
            .map_err(|e| ChromaKeyError::InvalidConfig(format!("invalid batch manifest: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parses_optional_fields() {
        let manifest = BatchManifest::from_json(
            r#"{"jobs": [
                {"input": "a.mp4", "output": "a_out.mp4"},
                {"input": "https://example.com/b.mp4", "output": "b_out.mp4",
                 "bg_color": [0, 0, 255], "bg_mode": "tile", "key_color": [0, 0, 255]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(manifest.jobs.len(), 2);
        assert_eq!(manifest.jobs[0].bg_color, None);
        assert_eq!(manifest.jobs[1].bg_mode, Some(FitMode::Tile));
        assert_eq!(manifest.jobs[1].key_color().rgb(), [0, 0, 255]);
    }

    #[test]
    fn test_default_background_is_solid_gray() {
        let job = BatchJob {
            input: "a.mp4".into(),
            output: "b.mp4".into(),
            bg_color: None,
            bg_image: None,
            bg_mode: None,
            key_color: None,
        };
        assert_eq!(job.background(None).unwrap(), BackgroundSpec::SolidColor([40, 40, 40]));
        assert_eq!(job.key_color(), KeyColorSpec::default());
    }

    #[test]
    fn test_missing_image_is_background_error() {
        let job = BatchJob {
            input: "a.mp4".into(),
            output: "b.mp4".into(),
            bg_color: Some([1, 2, 3]),
            bg_image: Some("/nonexistent/bg.jpg".into()),
            bg_mode: None,
            key_color: None,
        };
        assert!(matches!(job.background(None), Err(ChromaKeyError::BackgroundLoad(_))));
    }

    #[test]
    fn test_bad_manifest_is_invalid_config() {
        let err = BatchManifest::from_json(r#"{"jobs": [{"input": 3}]}"#).unwrap_err();
        assert!(matches!(err, ChromaKeyError::InvalidConfig(_)));
    }
}
