use std::path::Path;
use std::time::Instant;

use crate::compositing::domain::background_spec::BackgroundSpec;
use crate::compositing::infrastructure::background_resolver;
use crate::compositing::infrastructure::compositor::Compositor;
use crate::shared::constants::CODEC_PRIORITY;
use crate::shared::error::ChromaKeyError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_sequence::MattedFrameSequence;
use crate::video::domain::video_writer::VideoWriter;

use super::job_result::JobResult;
use super::pipeline_logger::PipelineLogger;

/// Phase two of a job: composite every matted frame over the background and
/// encode the result.
///
/// The background is resolved once, sized to the first matted frame. That
/// frame is produced before any encoder is opened, so a job that cannot
/// produce it leaves nothing on disk. Later frames that fail to read or
/// composite (including ones of a different size) are skipped with a warning.
/// Any terminal error removes the partially written output.
pub struct ComposeVideoUseCase {
    writer: Box<dyn VideoWriter>,
    codecs: Vec<String>,
}

impl ComposeVideoUseCase {
    pub fn new(writer: Box<dyn VideoWriter>) -> Self {
        Self {
            writer,
            codecs: CODEC_PRIORITY.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Overrides the codec preference list.
    pub fn with_codecs(mut self, codecs: Vec<String>) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn execute(
        &mut self,
        sequence: &dyn MattedFrameSequence,
        background: &BackgroundSpec,
        fps: f64,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<JobResult, ChromaKeyError> {
        if sequence.is_empty() {
            return Err(ChromaKeyError::EmptyResult("no matted frames to compose".into()));
        }
        let keyed_first = sequence
            .get(0)
            .map_err(|e| ChromaKeyError::EmptyResult(format!("could not read first frame: {e}")))?;
        let (width, height) = keyed_first.dimensions();

        let resolved = background_resolver::resolve(background, width, height);
        let compositor = Compositor::new(&resolved);

        let first = compositor
            .composite(&keyed_first)
            .map_err(ChromaKeyError::EmptyResult)?;
        drop(keyed_first);

        let produce = |position: usize| -> Result<Frame, String> {
            let keyed = sequence.get(position).map_err(|e| e.to_string())?;
            compositor.composite(&keyed)
        };

        let mut metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames: sequence.len(),
            codec: String::new(),
            source_path: None,
        };
        let codec = self.open_writer(output, &mut metadata, logger)?;

        let encode_err = |message: String| ChromaKeyError::Encode {
            codec: codec.clone(),
            message,
        };

        let mut written = 0;
        let result = (|| -> Result<(), ChromaKeyError> {
            self.writer
                .write(&first)
                .map_err(|e| encode_err(e.to_string()))?;
            written += 1;
            logger.progress("compose", 1, sequence.len());

            for position in 1..sequence.len() {
                let t0 = Instant::now();
                let frame = match produce(position) {
                    Ok(frame) => frame,
                    Err(e) => {
                        logger.warn(&format!("Skipping frame {position}: {e}"));
                        continue;
                    }
                };
                logger.timing("composite", t0.elapsed().as_secs_f64() * 1000.0);

                let t0 = Instant::now();
                self.writer
                    .write(&frame)
                    .map_err(|e| encode_err(e.to_string()))?;
                logger.timing("encode", t0.elapsed().as_secs_f64() * 1000.0);

                written += 1;
                logger.progress("compose", position + 1, sequence.len());
            }

            self.writer.close().map_err(|e| encode_err(e.to_string()))
        })();

        if let Err(e) = result {
            let _ = self.writer.close();
            remove_partial_output(output);
            return Err(e);
        }

        let output_bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        logger.info(&format!(
            "Wrote {written} frames to {} with {codec} ({:.2} MB, {:.1}s of video)",
            output.display(),
            output_bytes as f64 / (1024.0 * 1024.0),
            written as f64 / metadata.effective_fps()
        ));

        Ok(JobResult {
            frame_count: written,
            fps: metadata.effective_fps(),
            output_path: output.to_path_buf(),
            codec,
        })
    }

    /// Tries each codec in preference order; the first writer that opens wins.
    fn open_writer(
        &mut self,
        output: &Path,
        metadata: &mut VideoMetadata,
        logger: &mut dyn PipelineLogger,
    ) -> Result<String, ChromaKeyError> {
        for codec in &self.codecs {
            metadata.codec = codec.clone();
            match self.writer.open(output, metadata) {
                Ok(()) => {
                    logger.info(&format!("Using codec {codec}"));
                    return Ok(codec.clone());
                }
                Err(e) => {
                    log::debug!("Codec {codec} unavailable: {e}");
                    remove_partial_output(output);
                }
            }
        }
        Err(ChromaKeyError::NoCodecAvailable {
            tried: self.codecs.clone(),
        })
    }
}

fn remove_partial_output(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            log::warn!("Could not remove partial output {}: {e}", output.display());
        }
    }
}
