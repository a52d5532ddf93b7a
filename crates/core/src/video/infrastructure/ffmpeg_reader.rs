use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{FrameDecodeError, VideoReader};

/// Decodes source video through ffmpeg-next into RGB24 [`Frame`]s.
///
/// The decoder is built once in `open`. The RGB converter is built from the
/// first decoded picture and rebuilt if a later one changes size or pixel
/// format, so such frames reach the caller at their real size.
pub struct FfmpegReader {
    session: Option<DecodeSession>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, BoxError> {
        ffmpeg_next::init()?;
        self.session = None;

        let input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps: frame_rate(stream.avg_frame_rate())
                .or_else(|| frame_rate(stream.rate()))
                .unwrap_or(0.0),
            total_frames: stream.frames().max(0) as usize,
            codec: decoder.id().name().to_string(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {}: {}x{} @ {:.2} fps, {} (stream {stream_index})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.codec
        );

        self.session = Some(DecodeSession {
            input,
            stream_index,
            decoder,
            converter: None,
            position: 0,
            state: DecodeState::Reading,
        });
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, BoxError>> + '_> {
        match self.session.as_mut() {
            Some(session) => Box::new(std::iter::from_fn(move || session.next_frame())),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.session = None;
    }
}

/// Frames per second from a stream rational, if it is usable.
fn frame_rate(rate: ffmpeg_next::Rational) -> Option<f64> {
    (rate.numerator() > 0 && rate.denominator() > 0)
        .then(|| rate.numerator() as f64 / rate.denominator() as f64)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Reading,
    /// EOF sent; the decoder is handing back what it still holds.
    Draining,
    Finished,
}

struct DecodeSession {
    input: Input,
    stream_index: usize,
    decoder: ffmpeg_next::decoder::Video,
    converter: Option<RgbConverter>,
    /// Decode-order position of the next frame or failure.
    position: usize,
    state: DecodeState,
}

impl DecodeSession {
    /// Pulls packets until the decoder yields a picture, then converts it.
    fn next_frame(&mut self) -> Option<Result<Frame, BoxError>> {
        loop {
            let mut decoded = Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Some(self.to_frame(&decoded));
            }

            match self.state {
                DecodeState::Finished => return None,
                DecodeState::Draining => {
                    self.state = DecodeState::Finished;
                    return None;
                }
                DecodeState::Reading => {}
            }

            match self.next_packet() {
                Some(packet) => {
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        return Some(Err(self.failure(e.to_string())));
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.state = DecodeState::Draining;
                }
            }
        }
    }

    fn next_packet(&mut self) -> Option<ffmpeg_next::Packet> {
        let stream_index = self.stream_index;
        self.input
            .packets()
            .find(|(stream, _)| stream.index() == stream_index)
            .map(|(_, packet)| packet)
    }

    fn to_frame(&mut self, decoded: &Video) -> Result<Frame, BoxError> {
        let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());

        let converter = match self.converter.take() {
            Some(converter) if converter.matches(format, width, height) => converter,
            _ => match RgbConverter::new(format, width, height) {
                Ok(converter) => converter,
                Err(e) => return Err(self.failure(e.to_string())),
            },
        };
        let converter = self.converter.insert(converter);

        match converter.convert(decoded) {
            Ok(pixels) => {
                let frame = Frame::new(pixels, width, height, 3, self.position);
                self.position += 1;
                Ok(frame)
            }
            Err(e) => Err(self.failure(e.to_string())),
        }
    }

    /// Consumes a position for a frame that could not be produced.
    fn failure(&mut self, message: String) -> BoxError {
        let position = self.position;
        self.position += 1;
        log::debug!("Decode failure at frame {position}: {message}");
        Box::new(FrameDecodeError { position, message })
    }
}

/// Converts decoded pictures of one format and size to packed RGB24.
struct RgbConverter {
    scaler: scaling::Context,
    format: Pixel,
    width: u32,
    height: u32,
}

impl RgbConverter {
    fn new(format: Pixel, width: u32, height: u32) -> Result<Self, ffmpeg_next::Error> {
        let scaler = scaling::Context::get(
            format,
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )?;
        Ok(Self {
            scaler,
            format,
            width,
            height,
        })
    }

    fn matches(&self, format: Pixel, width: u32, height: u32) -> bool {
        self.format == format && self.width == width && self.height == height
    }

    fn convert(&mut self, decoded: &Video) -> Result<Vec<u8>, ffmpeg_next::Error> {
        let mut rgb = Video::empty();
        self.scaler.run(decoded, &mut rgb)?;
        Ok(packed_rows(
            rgb.data(0),
            rgb.stride(0),
            self.width as usize * 3,
            self.height as usize,
        ))
    }
}

/// Drops the per-row padding ffmpeg leaves after `row_len` bytes.
fn packed_rows(data: &[u8], stride: usize, row_len: usize, rows: usize) -> Vec<u8> {
    data.chunks(stride)
        .take(rows)
        .flat_map(|row| &row[..row_len])
        .copied()
        .collect()
}
