pub mod constants;
pub mod error;
pub mod frame;
pub mod remote_fetch;
pub mod video_metadata;
