pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod memory_frame_sequence;
pub mod png_frame_sequence;
