use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage, RgbaImage};
use tempfile::TempDir;

use crate::shared::constants::FRAME_FILE_PREFIX;
use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_sequence::MattedFrameSequence;

enum Storage {
    /// Removed from disk when the sequence is dropped.
    Temporary(TempDir),
    Kept(PathBuf),
}

impl Storage {
    fn path(&self) -> &Path {
        match self {
            Storage::Temporary(dir) => dir.path(),
            Storage::Kept(path) => path,
        }
    }
}

/// Persists keyed frames as numbered PNG files (`frame_00001.png`, ...).
///
/// Memory stays flat regardless of clip length. RGBA frames are written with
/// their matte; RGB PNGs read from an existing folder come back as
/// 3-channel frames. Files are only decoded in `get`.
pub struct PngFrameSequence {
    storage: Storage,
    files: Vec<PathBuf>,
}

impl PngFrameSequence {
    /// A sequence backed by a fresh temp directory.
    pub fn temporary() -> Result<Self, BoxError> {
        let dir = tempfile::Builder::new().prefix("chromaswap-").tempdir()?;
        log::debug!("Matted frames stored in {}", dir.path().display());
        Ok(Self {
            storage: Storage::Temporary(dir),
            files: Vec::new(),
        })
    }

    /// A sequence written to `dir` and kept there.
    ///
    /// The folder is created by the first `push`, so a job that never keys a
    /// frame leaves nothing behind.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            storage: Storage::Kept(dir.to_path_buf()),
            files: Vec::new(),
        }
    }

    /// Opens a folder of previously extracted frames.
    ///
    /// Files named `frame_*.png` are used when present, otherwise every
    /// `*.png`; either way sorted by file name.
    pub fn open_existing(dir: &Path) -> Result<Self, BoxError> {
        let mut pngs: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        pngs.sort();

        let prefixed: Vec<PathBuf> = pngs
            .iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(FRAME_FILE_PREFIX))
            })
            .cloned()
            .collect();
        let files = if prefixed.is_empty() { pngs } else { prefixed };
        log::info!("Found {} frame images in {}", files.len(), dir.display());

        Ok(Self {
            storage: Storage::Kept(dir.to_path_buf()),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        self.storage.path()
    }

    fn next_file_name(&self) -> PathBuf {
        self.dir()
            .join(format!("{FRAME_FILE_PREFIX}{:05}.png", self.files.len() + 1))
    }
}

impl MattedFrameSequence for PngFrameSequence {
    fn push(&mut self, frame: Frame) -> Result<(), BoxError> {
        if self.files.is_empty() {
            fs::create_dir_all(self.dir())?;
        }
        let path = self.next_file_name();
        let (width, height) = frame.dimensions();
        let image = match frame.channels() {
            4 => DynamicImage::ImageRgba8(
                RgbaImage::from_raw(width, height, frame.into_data())
                    .ok_or("RGBA frame data does not match its dimensions")?,
            ),
            3 => DynamicImage::ImageRgb8(
                RgbImage::from_raw(width, height, frame.into_data())
                    .ok_or("RGB frame data does not match its dimensions")?,
            ),
            n => return Err(format!("unsupported channel count {n}").into()),
        };
        image.save(&path)?;
        self.files.push(path);
        Ok(())
    }

    fn get(&self, position: usize) -> Result<Frame, BoxError> {
        let path = self
            .files
            .get(position)
            .ok_or_else(|| format!("no frame at position {position}"))?;
        let image = image::open(path)?;
        let (width, height) = (image.width(), image.height());

        let frame = if image.color().has_alpha() {
            Frame::new(image.to_rgba8().into_raw(), width, height, 4, position)
        } else {
            Frame::new(image.to_rgb8().into_raw(), width, height, 3, position)
        };
        Ok(frame)
    }

    fn len(&self) -> usize {
        self.files.len()
    }
}
