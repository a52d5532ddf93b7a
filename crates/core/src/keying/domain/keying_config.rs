use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DILATION_AMOUNT, DEFAULT_EDGE_BLUR,
    DEFAULT_HUE_TOLERANCE, DEFAULT_MIN_SATURATION, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_SMOOTHNESS, DEFAULT_SPILL_STRENGTH,
};
use crate::shared::error::ChromaKeyError;

/// Per-job keying parameters. Read-only once a job starts.
///
/// Missing fields in a JSON file fall back to the defaults, so a config file
/// only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyingConfig {
    /// Distances at or below this are fully transparent.
    pub threshold: f32,
    /// Width of the partial-transparency ramp above `threshold`.
    pub smoothness: f32,
    /// Maximum circular hue difference (0..180 hue units) for a key candidate.
    pub hue_tolerance: f32,
    /// Saturation (0..1) a key candidate must exceed.
    pub min_saturation: f32,
    /// Spill suppression strength in [0, 1]; 0 disables it.
    pub spill_strength: f32,
    /// Gaussian blur radius for the matte; kernel is `2 * edge_blur + 1`.
    pub edge_blur: usize,
    pub edge_dilation: bool,
    pub dilation_amount: usize,
    /// Disable to key on RGB distance alone.
    pub smart_keying: bool,
}

impl Default for KeyingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            smoothness: DEFAULT_SMOOTHNESS,
            hue_tolerance: DEFAULT_HUE_TOLERANCE,
            min_saturation: DEFAULT_MIN_SATURATION,
            spill_strength: DEFAULT_SPILL_STRENGTH,
            edge_blur: DEFAULT_EDGE_BLUR,
            edge_dilation: false,
            dilation_amount: DEFAULT_DILATION_AMOUNT,
            smart_keying: true,
        }
    }
}

impl KeyingConfig {
    /// Reads a JSON config file and validates it.
    pub fn from_file(path: &Path) -> Result<Self, ChromaKeyError> {
        let json = fs::read_to_string(path).map_err(|e| {
            ChromaKeyError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            ChromaKeyError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the user's config file if there is one, otherwise the defaults.
    pub fn load_user_default() -> Result<Self, ChromaKeyError> {
        match Self::user_config_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading keying config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `$XDG_CONFIG_HOME/chromaswap/keying.json` or the platform equivalent.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ChromaKeyError> {
        let unit = |name: &str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ChromaKeyError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )))
            }
        };
        unit("threshold", self.threshold)?;
        unit("min_saturation", self.min_saturation)?;
        unit("spill_strength", self.spill_strength)?;

        if !(self.smoothness > 0.0 && self.smoothness <= 1.0) {
            return Err(ChromaKeyError::InvalidConfig(format!(
                "smoothness must be in (0.0, 1.0], got {}",
                self.smoothness
            )));
        }
        if !(self.hue_tolerance > 0.0 && self.hue_tolerance <= 90.0) {
            return Err(ChromaKeyError::InvalidConfig(format!(
                "hue_tolerance must be in (0, 90], got {}",
                self.hue_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let c = KeyingConfig::default();
        assert_relative_eq!(c.threshold, 0.25);
        assert_relative_eq!(c.smoothness, 0.12);
        assert_relative_eq!(c.hue_tolerance, 18.0);
        assert_relative_eq!(c.min_saturation, 0.15);
        assert_relative_eq!(c.spill_strength, 0.65);
        assert_eq!(c.edge_blur, 2);
        assert!(!c.edge_dilation);
        assert!(c.smart_keying);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: KeyingConfig = serde_json::from_str(r#"{"threshold": 0.2, "edge_blur": 6}"#).unwrap();
        assert_relative_eq!(c.threshold, 0.2);
        assert_eq!(c.edge_blur, 6);
        assert_relative_eq!(c.smoothness, 0.12);
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keying.json");
        let config = KeyingConfig {
            edge_dilation: true,
            dilation_amount: 2,
            ..KeyingConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(KeyingConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keying.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            KeyingConfig::from_file(&path),
            Err(ChromaKeyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(KeyingConfig::from_file(Path::new("/nonexistent/keying.json")).is_err());
    }

    #[rstest]
    #[case(KeyingConfig { threshold: 1.5, ..KeyingConfig::default() })]
    #[case(KeyingConfig { smoothness: 0.0, ..KeyingConfig::default() })]
    #[case(KeyingConfig { hue_tolerance: 120.0, ..KeyingConfig::default() })]
    #[case(KeyingConfig { spill_strength: -0.1, ..KeyingConfig::default() })]
    #[case(KeyingConfig { min_saturation: f32::NAN, ..KeyingConfig::default() })]
    fn test_validate_rejects(#[case] config: KeyingConfig) {
        assert!(config.validate().is_err());
    }
}
