use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by the reader/writer/storage seams.
pub type BoxError = Box<dyn std::error::Error>;

/// Terminal failures of a background replacement job.
///
/// None of these are retried; the caller decides how to surface them.
#[derive(Error, Debug)]
pub enum ChromaKeyError {
    #[error("cannot open source video {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("source video {0} contains no decodable frames")]
    EmptySource(PathBuf),
    #[error("failed to load background image: {0}")]
    BackgroundLoad(String),
    #[error("no output encoder could be opened (tried {})", .tried.join(", "))]
    NoCodecAvailable { tried: Vec<String> },
    #[error("first output frame could not be produced: {0}")]
    EmptyResult(String),
    #[error("invalid keying configuration: {0}")]
    InvalidConfig(String),
    #[error("matted frame storage failed: {0}")]
    Storage(String),
    #[error("encoding with {codec} failed: {message}")]
    Encode { codec: String, message: String },
    #[error("download failed for {url}: {message}")]
    Fetch { url: String, message: String },
}
