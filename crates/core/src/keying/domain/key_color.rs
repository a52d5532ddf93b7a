use crate::keying::domain::hsv::Hsv;
use crate::shared::constants::DEFAULT_KEY_COLOR;

/// The chroma key to remove, with its hue center derived once per job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyColorSpec {
    rgb: [u8; 3],
    rgb_norm: [f32; 3],
    hue_center: f32,
}

impl KeyColorSpec {
    pub fn new(rgb: [u8; 3]) -> Self {
        let hsv = Hsv::from_rgb(rgb[0], rgb[1], rgb[2]);
        Self {
            rgb,
            rgb_norm: rgb.map(|c| c as f32 / 255.0),
            hue_center: hsv.hue as f32,
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    /// Key color with channels scaled to [0, 1].
    pub fn rgb_norm(&self) -> [f32; 3] {
        self.rgb_norm
    }

    /// Hue center in 8-bit hue units (0..180).
    pub fn hue_center(&self) -> f32 {
        self.hue_center
    }
}

impl Default for KeyColorSpec {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_COLOR)
    }
}
