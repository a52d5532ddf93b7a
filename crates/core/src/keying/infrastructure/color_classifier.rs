use ndarray::Array2;

use crate::keying::domain::hsv::Hsv;
use crate::keying::domain::key_color::KeyColorSpec;
use crate::keying::domain::keying_config::KeyingConfig;
use crate::shared::constants::{HUE_OVERRIDE_DISTANCE, HUE_RANGE};
use crate::shared::frame::Frame;

/// Per-pixel distance to the key in [0, 1], indexed `[row, col]`.
/// Lower means more background-like.
pub type DistanceField = Array2<f32>;

const SQRT_3: f32 = 1.732_050_8;

/// Scores every pixel by how much it looks like the key color.
///
/// RGB distance alone confuses dark clothing and skin with a green screen,
/// so a pixel only keeps its RGB distance when its hue is near the key hue
/// and it is saturated enough. Everything else is pinned to 1.0.
pub struct ColorClassifier {
    key: KeyColorSpec,
    hue_tolerance: f32,
    min_saturation: f32,
    smart_keying: bool,
}

impl ColorClassifier {
    pub fn new(key: KeyColorSpec, config: &KeyingConfig) -> Self {
        Self {
            key,
            hue_tolerance: config.hue_tolerance,
            min_saturation: config.min_saturation,
            smart_keying: config.smart_keying,
        }
    }

    pub fn classify(&self, frame: &Frame) -> DistanceField {
        let px = frame.as_ndarray();
        let shape = (frame.height() as usize, frame.width() as usize);
        Array2::from_shape_fn(shape, |(y, x)| {
            self.pixel_distance(px[[y, x, 0]], px[[y, x, 1]], px[[y, x, 2]])
        })
    }

    pub fn pixel_distance(&self, r: u8, g: u8, b: u8) -> f32 {
        let color_distance = self.rgb_distance(r, g, b);
        if !self.smart_keying {
            return color_distance;
        }

        let hsv = Hsv::from_rgb(r, g, b);
        let hue_diff = circular_hue_diff(hsv.hue as f32, self.key.hue_center());
        let hue_distance = hue_diff / (HUE_RANGE / 2.0);

        let is_key_hue = hue_diff < self.hue_tolerance;
        let is_saturated = hsv.saturation_norm() > self.min_saturation;

        let mut distance = if is_key_hue && is_saturated {
            color_distance
        } else {
            1.0
        };
        // Independent of the tolerance gate; the two thresholds differ
        if hue_distance > HUE_OVERRIDE_DISTANCE {
            distance = 1.0;
        }
        distance
    }

    fn rgb_distance(&self, r: u8, g: u8, b: u8) -> f32 {
        let key = self.key.rgb_norm();
        let dr = r as f32 / 255.0 - key[0];
        let dg = g as f32 / 255.0 - key[1];
        let db = b as f32 / 255.0 - key[2];
        (dr * dr + dg * dg + db * db).sqrt() / SQRT_3
    }
}

fn circular_hue_diff(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs();
    diff.min(HUE_RANGE - diff)
}
