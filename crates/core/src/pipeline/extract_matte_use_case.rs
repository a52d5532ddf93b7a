use std::path::Path;
use std::time::Instant;

use crate::keying::domain::frame_keyer::FrameKeyer;
use crate::shared::error::ChromaKeyError;
use crate::video::domain::frame_sequence::MattedFrameSequence;
use crate::video::domain::video_reader::{FrameDecodeError, VideoReader};

use super::job_result::ExtractSummary;
use super::pipeline_logger::PipelineLogger;

/// Phase one of a job: decode the source, key every frame and append the
/// RGBA result to a [`MattedFrameSequence`] in source order.
///
/// Undecodable frames are skipped with a warning. A failure to store a keyed
/// frame ends the phase.
pub struct ExtractMatteUseCase {
    reader: Box<dyn VideoReader>,
    keyer: Box<dyn FrameKeyer>,
}

impl ExtractMatteUseCase {
    pub fn new(reader: Box<dyn VideoReader>, keyer: Box<dyn FrameKeyer>) -> Self {
        Self { reader, keyer }
    }

    pub fn execute(
        &mut self,
        source: &Path,
        sequence: &mut dyn MattedFrameSequence,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ExtractSummary, ChromaKeyError> {
        let metadata = self
            .reader
            .open(source)
            .map_err(|e| ChromaKeyError::SourceOpen {
                path: source.to_path_buf(),
                source: e,
            })?;
        logger.info(&format!(
            "Extracting {} ({}x{}, {:.2} fps, ~{} frames)",
            source.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        ));

        let outcome = self.key_all(sequence, metadata.total_frames, logger);
        self.reader.close();
        let (dimensions, skipped) = outcome?;

        let Some((width, height)) = dimensions else {
            return Err(ChromaKeyError::EmptySource(source.to_path_buf()));
        };

        let summary = ExtractSummary {
            frame_count: sequence.len(),
            fps: metadata.effective_fps(),
            width,
            height,
            skipped,
        };
        logger.info(&format!(
            "Extracted {} frames ({} skipped)",
            summary.frame_count, summary.skipped
        ));
        Ok(summary)
    }

    /// Returns the dimensions of the first decoded frame and the skip count.
    fn key_all(
        &mut self,
        sequence: &mut dyn MattedFrameSequence,
        total: usize,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(Option<(u32, u32)>, usize), ChromaKeyError> {
        let mut dimensions: Option<(u32, u32)> = None;
        let mut skipped = 0;

        for (position, result) in self.reader.frames().enumerate() {
            let frame = match result {
                Ok(frame) => frame,
                Err(e) => {
                    let (position, reason) = match e.downcast_ref::<FrameDecodeError>() {
                        Some(decode) => (decode.position, decode.message.clone()),
                        None => (position, e.to_string()),
                    };
                    logger.warn(&format!("Skipping undecodable frame {position}: {reason}"));
                    skipped += 1;
                    continue;
                }
            };

            // All frames of a job share the size of the first one
            match dimensions {
                None => dimensions = Some(frame.dimensions()),
                Some(dims) if dims != frame.dimensions() => {
                    logger.warn(&format!(
                        "Skipping frame {position}: {}x{} does not match {}x{}",
                        frame.width(),
                        frame.height(),
                        dims.0,
                        dims.1
                    ));
                    skipped += 1;
                    continue;
                }
                Some(_) => {}
            }

            let t0 = Instant::now();
            let keyed = self.keyer.key(&frame);
            logger.timing("key", t0.elapsed().as_secs_f64() * 1000.0);

            let t0 = Instant::now();
            sequence
                .push(keyed)
                .map_err(|e| ChromaKeyError::Storage(format!("frame {position}: {e}")))?;
            logger.timing("store", t0.elapsed().as_secs_f64() * 1000.0);

            logger.progress("extract", sequence.len(), total);
        }

        Ok((dimensions, skipped))
    }
}
