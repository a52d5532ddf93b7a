use crate::compositing::domain::background_spec::ResolvedBackground;
use crate::shared::frame::Frame;

/// Alpha-blends keyed frames over a resolved background.
pub struct Compositor<'a> {
    background: &'a ResolvedBackground,
}

impl<'a> Compositor<'a> {
    pub fn new(background: &'a ResolvedBackground) -> Self {
        Self { background }
    }

    /// `out = fg * a + bg * (1 - a)` per channel.
    ///
    /// Fails when the frame size differs from the background. Frames without
    /// an alpha channel then pass through unchanged.
    pub fn composite(&self, frame: &Frame) -> Result<Frame, String> {
        if frame.dimensions() != (self.background.width(), self.background.height()) {
            return Err(format!(
                "frame {} is {}x{}, background is {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.background.width(),
                self.background.height()
            ));
        }
        if !frame.has_alpha() {
            return Ok(frame.clone());
        }

        let mut out = Vec::with_capacity(self.background.data().len());
        for (fg, bg) in frame
            .data()
            .chunks_exact(4)
            .zip(self.background.data().chunks_exact(3))
        {
            let a = fg[3] as f32 / 255.0;
            for c in 0..3 {
                let v = fg[c] as f32 * a + bg[c] as f32 * (1.0 - a);
                out.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
        Ok(Frame::new(out, frame.width(), frame.height(), 3, frame.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositing::domain::background_spec::BackgroundSpec;
    use crate::compositing::infrastructure::background_resolver::resolve;

    fn rgba(width: u32, height: u32, px: [u8; 4]) -> Frame {
        let data = px.iter().copied().cycle().take((width * height * 4) as usize).collect();
        Frame::new(data, width, height, 4, 7)
    }

    fn gray_bg(width: u32, height: u32) -> ResolvedBackground {
        resolve(&BackgroundSpec::SolidColor([40, 40, 40]), width, height)
    }

    #[test]
    fn test_transparent_pixels_show_background() {
        let bg = gray_bg(3, 3);
        let out = Compositor::new(&bg).composite(&rgba(3, 3, [0, 104, 69, 0])).unwrap();
        assert_eq!(out.channels(), 3);
        assert_eq!(out.index(), 7);
        assert!(out.data().iter().all(|&v| v == 40));
    }

    #[test]
    fn test_opaque_pixels_show_foreground() {
        let bg = gray_bg(2, 2);
        let out = Compositor::new(&bg).composite(&rgba(2, 2, [255, 0, 0, 255])).unwrap();
        for px in out.data().chunks_exact(3) {
            assert_eq!(px, &[255, 0, 0]);
        }
    }

    #[test]
    fn test_half_alpha_blends() {
        let bg = gray_bg(1, 1);
        let out = Compositor::new(&bg).composite(&rgba(1, 1, [240, 40, 40, 128])).unwrap();
        // 240 * 0.502 + 40 * 0.498 = 140.4
        assert_eq!(out.data()[0], 140);
        assert_eq!(out.data()[1], 40);
    }

    #[test]
    fn test_rgb_frame_passes_through() {
        let bg = gray_bg(2, 2);
        let frame = Frame::filled([1, 2, 3], 2, 2, 0);
        assert_eq!(Compositor::new(&bg).composite(&frame).unwrap(), frame);
    }

    #[test]
    fn test_size_mismatch_is_error() {
        let bg = gray_bg(4, 4);
        assert!(Compositor::new(&bg).composite(&rgba(2, 2, [0, 0, 0, 255])).is_err());
    }

    #[test]
    fn test_rgb_frame_of_other_size_is_error() {
        let bg = gray_bg(4, 4);
        let frame = Frame::filled([1, 2, 3], 8, 8, 5);
        let err = Compositor::new(&bg).composite(&frame).unwrap_err();
        assert!(err.contains("8x8"), "{err}");
    }
}
