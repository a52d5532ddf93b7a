pub mod frame_sequence;
pub mod video_reader;
pub mod video_writer;
