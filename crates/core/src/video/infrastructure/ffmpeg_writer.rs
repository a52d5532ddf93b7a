use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames via ffmpeg-next into the container implied by the
/// output extension.
///
/// The codec comes from `metadata.codec` as a fourcc. H.264 fourccs prefer
/// libx264 and fall back to any registered H.264 encoder; `mp4v` maps to the
/// MPEG-4 Part 2 encoder. The fourcc is also written as the stream tag, so a
/// container that cannot carry it fails in `open`.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps_i: i32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            fps_i: 0,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Sends a frame (or EOF when `None`) and writes every packet the
    /// encoder hands back.
    fn drain(&mut self, frame: Option<&ffmpeg_next::util::frame::video::Video>) -> Result<(), BoxError> {
        let encoder = self.encoder.as_mut().ok_or("FfmpegWriter: not opened")?;
        let octx = self.octx.as_mut().ok_or("FfmpegWriter: not opened")?;

        match frame {
            Some(frame) => encoder.send_frame(frame)?,
            None => encoder.send_eof()?,
        }

        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps_i), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Packs a four-character code into the little-endian tag ffmpeg stores.
fn fourcc_tag(fourcc: &str) -> Result<u32, BoxError> {
    let bytes: [u8; 4] = fourcc
        .as_bytes()
        .try_into()
        .map_err(|_| format!("'{fourcc}' is not a four-character code"))?;
    Ok(u32::from_le_bytes(bytes))
}

fn find_encoder(fourcc: &str) -> Result<ffmpeg_next::Codec, BoxError> {
    let codec = match fourcc.to_ascii_lowercase().as_str() {
        "avc1" | "h264" | "x264" => ffmpeg_next::encoder::find_by_name("libx264")
            .or_else(|| ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::H264)),
        "mp4v" => ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4),
        _ => None,
    };
    codec.ok_or_else(|| format!("no encoder available for '{fourcc}'").into())
}

impl VideoWriter for FfmpegWriter {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), BoxError> {
        ffmpeg_next::init()?;

        let codec = find_encoder(&metadata.codec)?;
        let tag = fourcc_tag(&metadata.codec)?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.fps_i = (metadata.effective_fps().round() as i32).max(1);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, self.fps_i));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(self.fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        unsafe {
            (*ost.parameters().as_mut_ptr()).codec_tag = tag;
        }

        self.video_stream_index = 0;

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoder {} opened for {} at {} fps",
            codec.name(),
            path.display(),
            self.fps_i
        );

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), BoxError> {
        if frame.channels() != 3 {
            return Err(format!("expected an RGB frame, got {} channels", frame.channels()).into());
        }
        if frame.dimensions() != (self.width, self.height) {
            return Err(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }
        let scaler = self.scaler.as_mut().ok_or("FfmpegWriter: not opened")?;

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_len = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_len).enumerate() {
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len].copy_from_slice(src);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        self.drain(Some(&yuv_frame))?;
        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoxError> {
        let result = if self.encoder.is_some() {
            self.drain(None).and_then(|()| match self.octx.as_mut() {
                Some(octx) => octx.write_trailer().map_err(BoxError::from),
                None => Ok(()),
            })
        } else {
            Ok(())
        };

        // Released even when flushing failed, so a second close is a no-op
        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        result
    }
}
