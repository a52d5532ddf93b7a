use std::path::Path;

use crate::compositing::domain::background_spec::BackgroundSpec;
use crate::keying::domain::frame_keyer::FrameKeyer;
use crate::shared::error::ChromaKeyError;
use crate::video::domain::frame_sequence::MattedFrameSequence;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::memory_frame_sequence::InMemoryFrameSequence;
use crate::video::infrastructure::png_frame_sequence::PngFrameSequence;

use super::compose_video_use_case::ComposeVideoUseCase;
use super::extract_matte_use_case::ExtractMatteUseCase;
use super::job_result::JobResult;
use super::pipeline_logger::PipelineLogger;

/// Where matted frames live between the two phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStorage {
    Memory,
    /// PNG files in a temp directory removed when the job ends.
    #[default]
    TempPng,
}

/// A full background replacement job: extract, then compose.
///
/// Single-use: the two phases run once, in order, and the intermediate
/// sequence is dropped on every exit path.
pub struct ReplaceBackgroundUseCase {
    extract: ExtractMatteUseCase,
    compose: ComposeVideoUseCase,
    storage: FrameStorage,
}

impl ReplaceBackgroundUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        keyer: Box<dyn FrameKeyer>,
    ) -> Self {
        Self {
            extract: ExtractMatteUseCase::new(reader, keyer),
            compose: ComposeVideoUseCase::new(writer),
            storage: FrameStorage::default(),
        }
    }

    pub fn with_storage(mut self, storage: FrameStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_codecs(mut self, codecs: Vec<String>) -> Self {
        self.compose = self.compose.with_codecs(codecs);
        self
    }

    pub fn execute(
        &mut self,
        source: &Path,
        output: &Path,
        background: &BackgroundSpec,
        logger: &mut dyn PipelineLogger,
    ) -> Result<JobResult, ChromaKeyError> {
        let mut sequence: Box<dyn MattedFrameSequence> = match self.storage {
            FrameStorage::Memory => Box::new(InMemoryFrameSequence::new()),
            FrameStorage::TempPng => Box::new(
                PngFrameSequence::temporary()
                    .map_err(|e| ChromaKeyError::Storage(e.to_string()))?,
            ),
        };

        let extracted = self.extract.execute(source, sequence.as_mut(), logger)?;
        let result = self
            .compose
            .execute(sequence.as_ref(), background, extracted.fps, output, logger)?;

        logger.summary();
        Ok(result)
    }
}
