use ndarray::Array2;

use super::color_classifier::DistanceField;

/// 8-bit alpha plane indexed `[row, col]`; 0 is background, 255 foreground.
pub type AlphaMatte = Array2<u8>;

/// Maps distances to alpha with a linear ramp from `threshold` to
/// `threshold + smoothness`.
pub struct MatteGenerator {
    threshold: f32,
    smoothness: f32,
}

impl MatteGenerator {
    pub fn new(threshold: f32, smoothness: f32) -> Self {
        Self {
            threshold,
            smoothness,
        }
    }

    pub fn generate(&self, distance: &DistanceField) -> AlphaMatte {
        distance.mapv(|d| self.alpha_for(d))
    }

    pub fn alpha_for(&self, distance: f32) -> u8 {
        let a = ((distance - self.threshold) / self.smoothness).clamp(0.0, 1.0);
        (a * 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    fn generator() -> MatteGenerator {
        MatteGenerator::new(0.25, 0.12)
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(0.25, 0)]
    #[case(0.31, 127)]
    #[case(0.37, 255)]
    #[case(1.0, 255)]
    fn test_ramp(#[case] distance: f32, #[case] expected: u8) {
        let a = generator().alpha_for(distance);
        assert!(
            (a as i32 - expected as i32).abs() <= 1,
            "alpha {a} for distance {distance}"
        );
    }

    #[test]
    fn test_monotonic_over_unit_interval() {
        let g = generator();
        let mut prev = 0u8;
        for i in 0..=1000 {
            let a = g.alpha_for(i as f32 / 1000.0);
            assert!(a >= prev, "alpha decreased at step {i}");
            prev = a;
        }
    }

    #[test]
    fn test_generate_keeps_shape() {
        let field = array![[0.0f32, 1.0], [0.5, 0.1]];
        let alpha = generator().generate(&field);
        assert_eq!(alpha, array![[0u8, 255], [255, 0]]);
    }
}
