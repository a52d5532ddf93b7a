use super::matte_generator::AlphaMatte;

/// Pulls excess green out of pixels, mostly where the matte is translucent.
///
/// Spill is how far G exceeds both R and B. Fully opaque pixels get half the
/// correction of fully transparent ones so subject colors survive.
pub struct SpillSuppressor {
    strength: f32,
}

impl SpillSuppressor {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    /// Corrects the green channel of interleaved RGB(A) `data` in place.
    pub fn suppress(&self, data: &mut [u8], channels: usize, alpha: &AlphaMatte) {
        if self.strength <= 0.0 {
            return;
        }
        for (px, &a) in data.chunks_exact_mut(channels).zip(alpha.iter()) {
            px[1] = self.corrected_green(px[0], px[1], px[2], a);
        }
    }

    pub fn corrected_green(&self, r: u8, g: u8, b: u8, alpha: u8) -> u8 {
        let spill = ((g as f32 - r.max(b) as f32) / 255.0).max(0.0);
        let amount = spill * self.strength * (1.0 - alpha as f32 / 255.0 * 0.5);
        (g as f32 - amount * 255.0).clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_key_green_reduced_under_transparent_matte() {
        let s = SpillSuppressor::new(0.65);
        // spill 102/255 = 0.4, amount 0.26, 171 - 66.3 = 104.7
        assert_eq!(s.corrected_green(0, 171, 69, 0), 104);
    }

    #[test]
    fn test_opaque_pixels_get_half_correction() {
        let s = SpillSuppressor::new(1.0);
        let transparent = 200 - s.corrected_green(100, 200, 100, 0);
        let opaque = 200 - s.corrected_green(100, 200, 100, 255);
        assert!(transparent > opaque);
        assert!((transparent as i32 - 2 * opaque as i32).abs() <= 2);
    }

    #[test]
    fn test_no_spill_when_green_not_dominant() {
        let s = SpillSuppressor::new(1.0);
        assert_eq!(s.corrected_green(255, 0, 0, 0), 0);
        assert_eq!(s.corrected_green(120, 120, 200, 0), 120);
        assert_eq!(s.corrected_green(200, 150, 10, 0), 150);
    }

    #[test]
    fn test_zero_strength_is_noop() {
        let mut data = vec![0, 171, 69, 10, 250, 10];
        let original = data.clone();
        let alpha = Array2::from_elem((1, 2), 0u8);
        SpillSuppressor::new(0.0).suppress(&mut data, 3, &alpha);
        assert_eq!(data, original);
    }

    #[test]
    fn test_only_green_channel_changes() {
        let mut data = vec![10, 250, 10, 128, 220, 40, 30, 200];
        let alpha = Array2::from_elem((1, 2), 128u8);
        SpillSuppressor::new(0.65).suppress(&mut data, 4, &alpha);
        assert_eq!(data[0], 10);
        assert_eq!(data[2], 10);
        assert_eq!(data[3], 128);
        assert!(data[1] < 250);
        // second pixel: green below red, no spill
        assert_eq!(&data[4..], &[220, 40, 30, 200]);
    }
}
