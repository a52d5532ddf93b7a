use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::compositing::domain::background_spec::{BackgroundSpec, FitMode, ResolvedBackground};

/// Produces a background of exactly `width` x `height` from a spec.
///
/// Called once per job; the result is shared read-only by every frame.
pub fn resolve(spec: &BackgroundSpec, width: u32, height: u32) -> ResolvedBackground {
    let image = match spec {
        BackgroundSpec::SolidColor(rgb) => RgbImage::from_pixel(width, height, Rgb(*rgb)),
        BackgroundSpec::Image(source, mode) => fit_image(source, *mode, width, height),
    };
    log::debug!(
        "Resolved background {}x{} from {}",
        image.width(),
        image.height(),
        describe(spec)
    );
    ResolvedBackground::new(image)
}

fn describe(spec: &BackgroundSpec) -> String {
    match spec {
        BackgroundSpec::SolidColor([r, g, b]) => format!("color ({r}, {g}, {b})"),
        BackgroundSpec::Image(image, mode) => {
            format!("{}x{} image ({mode})", image.width(), image.height())
        }
    }
}

fn fit_image(source: &RgbImage, mode: FitMode, width: u32, height: u32) -> RgbImage {
    if source.width() == 0 || source.height() == 0 {
        return RgbImage::new(width, height);
    }
    match mode {
        FitMode::Stretch => imageops::resize(source, width, height, FilterType::Triangle),
        FitMode::Fit => letterbox(source, width, height),
        FitMode::Fill => cover(source, width, height),
        FitMode::Tile => tile(source, width, height),
    }
}

fn letterbox(source: &RgbImage, width: u32, height: u32) -> RgbImage {
    let scale = f64::min(
        width as f64 / source.width() as f64,
        height as f64 / source.height() as f64,
    );
    let new_w = ((source.width() as f64 * scale) as u32).clamp(1, width.max(1));
    let new_h = ((source.height() as f64 * scale) as u32).clamp(1, height.max(1));
    let resized = imageops::resize(source, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::new(width, height);
    let x = (width.saturating_sub(new_w) / 2) as i64;
    let y = (height.saturating_sub(new_h) / 2) as i64;
    imageops::replace(&mut canvas, &resized, x, y);
    canvas
}

fn cover(source: &RgbImage, width: u32, height: u32) -> RgbImage {
    let scale = f64::max(
        width as f64 / source.width() as f64,
        height as f64 / source.height() as f64,
    );
    // Rounding down can land one pixel short of the target
    let new_w = ((source.width() as f64 * scale) as u32).max(width);
    let new_h = ((source.height() as f64 * scale) as u32).max(height);
    let resized = imageops::resize(source, new_w, new_h, FilterType::Triangle);

    let x = (new_w - width) / 2;
    let y = (new_h - height) / 2;
    imageops::crop_imm(&resized, x, y, width, height).to_image()
}

fn tile(source: &RgbImage, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    for y in (0..height).step_by(source.height() as usize) {
        for x in (0..width).step_by(source.width() as usize) {
            imageops::replace(&mut canvas, source, x as i64, y as i64);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Left half red, right half blue.
    fn two_tone(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    #[test]
    fn test_solid_color_fills_target() {
        let bg = resolve(&BackgroundSpec::SolidColor([40, 40, 40]), 5, 3);
        assert_eq!((bg.width(), bg.height()), (5, 3));
        assert!(bg.data().iter().all(|&v| v == 40));
    }

    #[rstest]
    #[case(FitMode::Stretch)]
    #[case(FitMode::Fit)]
    #[case(FitMode::Fill)]
    #[case(FitMode::Tile)]
    fn test_every_mode_matches_target_size(#[case] mode: FitMode) {
        for (w, h) in [(16, 9), (9, 16), (7, 7), (1, 1)] {
            let spec = BackgroundSpec::Image(two_tone(10, 6), mode);
            let bg = resolve(&spec, w, h);
            assert_eq!((bg.width(), bg.height()), (w, h), "{mode} at {w}x{h}");
        }
    }

    #[test]
    fn test_fit_pads_with_black_and_keeps_content() {
        // 4x2 source into 8x8: scaled to 8x4, centered vertically
        let source = RgbImage::from_pixel(4, 2, Rgb([200, 200, 200]));
        let bg = resolve(&BackgroundSpec::Image(source, FitMode::Fit), 8, 8);
        assert_eq!(bg.image().get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(bg.image().get_pixel(0, 7).0, [0, 0, 0]);
        assert_eq!(bg.image().get_pixel(4, 4).0, [200, 200, 200]);
        // full width is used, so no horizontal padding
        assert_eq!(bg.image().get_pixel(0, 3).0, [200, 200, 200]);
        assert_eq!(bg.image().get_pixel(7, 4).0, [200, 200, 200]);
    }

    #[test]
    fn test_fill_never_pads() {
        let source = RgbImage::from_pixel(4, 2, Rgb([90, 120, 150]));
        let bg = resolve(&BackgroundSpec::Image(source, FitMode::Fill), 8, 8);
        assert!(bg
            .image()
            .pixels()
            .all(|p| p.0 == [90, 120, 150]));
    }

    #[test]
    fn test_fill_crops_center() {
        // 12x4 two-tone into 4x4: scaled to 12x4, middle 4 columns kept
        let bg = resolve(&BackgroundSpec::Image(two_tone(12, 4), FitMode::Fill), 4, 4);
        assert_eq!(bg.image().get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(bg.image().get_pixel(3, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_stretch_distorts_to_exact_size() {
        let bg = resolve(&BackgroundSpec::Image(two_tone(2, 2), FitMode::Stretch), 8, 2);
        assert!(bg.image().get_pixel(0, 0).0[0] > 200);
        assert!(bg.image().get_pixel(7, 1).0[2] > 200);
    }

    #[test]
    fn test_tile_repeats_and_clips() {
        let mut source = RgbImage::from_pixel(3, 2, Rgb([10, 10, 10]));
        source.put_pixel(0, 0, Rgb([250, 0, 0]));
        let bg = resolve(&BackgroundSpec::Image(source, FitMode::Tile), 7, 5);
        for (x, y) in [(0, 0), (3, 0), (6, 0), (0, 2), (3, 4), (6, 4)] {
            assert_eq!(bg.image().get_pixel(x, y).0, [250, 0, 0], "tile origin at {x},{y}");
        }
        assert_eq!(bg.image().get_pixel(1, 1).0, [10, 10, 10]);
        assert_eq!(bg.image().get_pixel(6, 1).0, [10, 10, 10]);
    }
}
