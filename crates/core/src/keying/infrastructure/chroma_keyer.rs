use crate::keying::domain::frame_keyer::FrameKeyer;
use crate::keying::domain::key_color::KeyColorSpec;
use crate::keying::domain::keying_config::KeyingConfig;
use crate::shared::frame::Frame;

use super::color_classifier::ColorClassifier;
use super::edge_refiner::EdgeRefiner;
use super::matte_generator::{AlphaMatte, MatteGenerator};
use super::spill_suppressor::SpillSuppressor;

/// Classify → matte → refine → de-spill, producing an RGBA frame.
pub struct ChromaKeyer {
    classifier: ColorClassifier,
    matte: MatteGenerator,
    refiner: EdgeRefiner,
    spill: SpillSuppressor,
}

impl ChromaKeyer {
    pub fn new(key: KeyColorSpec, config: &KeyingConfig) -> Self {
        Self {
            classifier: ColorClassifier::new(key, config),
            matte: MatteGenerator::new(config.threshold, config.smoothness),
            refiner: EdgeRefiner::new(config),
            spill: SpillSuppressor::new(config.spill_strength),
        }
    }

    /// The refined matte alone, before spill correction.
    pub fn alpha(&self, frame: &Frame) -> AlphaMatte {
        let distance = self.classifier.classify(frame);
        let raw = self.matte.generate(&distance);
        self.refiner.refine(&raw)
    }
}

impl FrameKeyer for ChromaKeyer {
    fn key(&self, frame: &Frame) -> Frame {
        let alpha = self.alpha(frame);

        let src_channels = frame.channels() as usize;
        let pixels = (frame.width() as usize) * (frame.height() as usize);
        let mut rgba = Vec::with_capacity(pixels * 4);
        for (px, &a) in frame.data().chunks_exact(src_channels).zip(alpha.iter()) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], a]);
        }
        self.spill.suppress(&mut rgba, 4, &alpha);

        Frame::new(rgba, frame.width(), frame.height(), 4, frame.index())
    }
}
