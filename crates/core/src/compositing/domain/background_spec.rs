use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::shared::constants::DEFAULT_BACKGROUND_COLOR;

/// How a background image is mapped onto the output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Non-uniform resize to exactly the target size.
    Stretch,
    /// Uniform scale to fit inside the target, centered on black.
    Fit,
    /// Uniform scale to cover the target, center-cropped.
    #[default]
    Fill,
    /// Repeat the unscaled image from the top-left corner.
    Tile,
}

impl FitMode {
    pub const ALL: [FitMode; 4] = [FitMode::Stretch, FitMode::Fit, FitMode::Fill, FitMode::Tile];

    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Stretch => "stretch",
            FitMode::Fit => "fit",
            FitMode::Fill => "fill",
            FitMode::Tile => "tile",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown background mode '{s}' (expected stretch, fit, fill or tile)"))
    }
}

/// What goes behind the keyed subject.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSpec {
    SolidColor([u8; 3]),
    Image(RgbImage, FitMode),
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        BackgroundSpec::SolidColor(DEFAULT_BACKGROUND_COLOR)
    }
}

/// A background raster of exactly the output frame size.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBackground {
    image: RgbImage,
}

impl ResolvedBackground {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Interleaved RGB samples, row-major.
    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("stretch", FitMode::Stretch)]
    #[case("fit", FitMode::Fit)]
    #[case("FILL", FitMode::Fill)]
    #[case("Tile", FitMode::Tile)]
    fn test_fit_mode_parses(#[case] input: &str, #[case] expected: FitMode) {
        assert_eq!(input.parse::<FitMode>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_fit_mode_rejected() {
        let err = "zoom".parse::<FitMode>().unwrap_err();
        assert!(err.contains("zoom"));
    }

    #[test]
    fn test_fit_mode_defaults_to_fill() {
        assert_eq!(FitMode::default(), FitMode::Fill);
    }

    #[test]
    fn test_fit_mode_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&FitMode::Tile).unwrap(), "\"tile\"");
        let mode: FitMode = serde_json::from_str("\"stretch\"").unwrap();
        assert_eq!(mode, FitMode::Stretch);
    }

    #[test]
    fn test_default_background_is_dark_gray() {
        assert_eq!(BackgroundSpec::default(), BackgroundSpec::SolidColor([40, 40, 40]));
    }
}
