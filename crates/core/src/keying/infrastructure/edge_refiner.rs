use std::cell::RefCell;

use crate::keying::domain::keying_config::KeyingConfig;

use super::gaussian;
use super::matte_generator::AlphaMatte;
use super::morphology;

/// Cleans up a raw matte: denoise → optional dilate → blur, always in that order.
pub struct EdgeRefiner {
    dilation_iterations: usize,
    kernel: Vec<f32>,
    blur_temp: RefCell<Vec<f32>>,
}

impl EdgeRefiner {
    pub fn new(config: &KeyingConfig) -> Self {
        let dilation_iterations = if config.edge_dilation {
            config.dilation_amount
        } else {
            0
        };
        Self {
            dilation_iterations,
            kernel: gaussian::gaussian_kernel_1d(config.edge_blur * 2 + 1),
            blur_temp: RefCell::new(Vec::new()),
        }
    }

    pub fn refine(&self, alpha: &AlphaMatte) -> AlphaMatte {
        let mut cleaned = morphology::close(&morphology::open(alpha));

        for _ in 0..self.dilation_iterations {
            cleaned = morphology::dilate(&cleaned);
        }

        // A one-tap kernel (edge_blur == 0) leaves the plane untouched
        let (h, w) = cleaned.dim();
        if let Some(data) = cleaned.as_slice_mut() {
            gaussian::blur_plane(data, w, h, &self.kernel, &mut self.blur_temp.borrow_mut());
        }
        cleaned
    }
}
