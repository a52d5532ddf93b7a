//! Chroma-key background replacement for video.
//!
//! A job runs in two phases. Extract decodes the source and keys every frame
//! into an RGBA matte sequence. Compose blends that sequence over a
//! background and encodes the result.

pub mod compositing;
pub mod keying;
pub mod pipeline;
pub mod shared;
pub mod video;
