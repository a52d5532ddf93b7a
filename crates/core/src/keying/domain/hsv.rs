/// An 8-bit HSV sample: hue in half degrees (0..=180), saturation and value 0..=255.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hsv {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    /// Converts an RGB sample using the common 8-bit convention
    /// (hue scaled by 1/2 so the circle fits in a byte).
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let v = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let diff = v - min;

        let saturation = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

        let mut hue = if diff == 0.0 {
            0.0
        } else if v == rf {
            60.0 * (gf - bf) / diff
        } else if v == gf {
            120.0 + 60.0 * (bf - rf) / diff
        } else {
            240.0 + 60.0 * (rf - gf) / diff
        };
        if hue < 0.0 {
            hue += 360.0;
        }

        Self {
            hue: (hue / 2.0).round() as u8,
            saturation: saturation.round().clamp(0.0, 255.0) as u8,
            value: v as u8,
        }
    }

    pub fn saturation_norm(&self) -> f32 {
        self.saturation as f32 / 255.0
    }
}
