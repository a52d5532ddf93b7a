//! Stub readers and writers shared by the pipeline tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{FrameDecodeError, VideoReader};
use crate::video::domain::video_writer::VideoWriter;

pub struct StubReader {
    frames: Vec<Result<Frame, String>>,
    fps: f64,
    pub closed: Arc<Mutex<bool>>,
}

impl StubReader {
    pub fn new(frames: Vec<Result<Frame, String>>, fps: f64) -> Self {
        Self {
            frames,
            fps,
            closed: Arc::new(Mutex::new(false)),
        }
    }

    pub fn solid(rgb: [u8; 3], count: usize, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|i| Ok(Frame::filled(rgb, width, height, i)))
            .collect();
        Self::new(frames, 30.0)
    }
}

impl VideoReader for StubReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, BoxError> {
        let (width, height) = self
            .frames
            .iter()
            .find_map(|f| f.as_ref().ok().map(Frame::dimensions))
            .unwrap_or((0, 0));
        Ok(VideoMetadata {
            width,
            height,
            fps: self.fps,
            total_frames: self.frames.len(),
            codec: "stub".into(),
            source_path: Some(path.to_path_buf()),
        })
    }

    /// Failures are reported at their position in the frame list.
    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, BoxError>> + '_> {
        Box::new(self.frames.drain(..).enumerate().map(|(position, f)| {
            f.map_err(|message| BoxError::from(FrameDecodeError { position, message }))
        }))
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

pub struct FailingReader;

impl VideoReader for FailingReader {
    fn open(&mut self, _path: &Path) -> Result<VideoMetadata, BoxError> {
        Err("No such file or directory".into())
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, BoxError>> + '_> {
        Box::new(std::iter::empty())
    }

    fn close(&mut self) {}
}

#[derive(Default)]
pub struct WriterLog {
    pub attempts: Vec<String>,
    pub opened: Option<(String, VideoMetadata)>,
    pub written: Vec<Frame>,
    pub closed: bool,
}

/// Writes a placeholder file on every `open`, like a real muxer does
/// before the encoder is known to work.
pub struct StubWriter {
    accepted: Vec<String>,
    fail_write_at: Option<usize>,
    pub log: Arc<Mutex<WriterLog>>,
}

impl StubWriter {
    pub fn accepting(codecs: &[&str]) -> Self {
        Self {
            accepted: codecs.iter().map(|c| c.to_string()).collect(),
            fail_write_at: None,
            log: Arc::new(Mutex::new(WriterLog::default())),
        }
    }

    pub fn failing_write_at(mut self, position: usize) -> Self {
        self.fail_write_at = Some(position);
        self
    }
}

impl VideoWriter for StubWriter {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), BoxError> {
        std::fs::write(path, b"header")?;
        let mut log = self.log.lock().unwrap();
        log.attempts.push(metadata.codec.clone());
        if !self.accepted.contains(&metadata.codec) {
            return Err(format!("codec {} unavailable", metadata.codec).into());
        }
        log.opened = Some((metadata.codec.clone(), metadata.clone()));
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), BoxError> {
        let mut log = self.log.lock().unwrap();
        if self.fail_write_at == Some(log.written.len()) {
            return Err("disk full".into());
        }
        log.written.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}
