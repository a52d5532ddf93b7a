/// Default chroma key: the studio green the keying defaults are tuned for.
pub const DEFAULT_KEY_COLOR: [u8; 3] = [0, 171, 69];

/// Background used when neither a color nor an image is supplied.
pub const DEFAULT_BACKGROUND_COLOR: [u8; 3] = [40, 40, 40];

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.25;
pub const DEFAULT_SMOOTHNESS: f32 = 0.12;
/// In 8-bit hue units (0..180, half degrees).
pub const DEFAULT_HUE_TOLERANCE: f32 = 18.0;
pub const DEFAULT_MIN_SATURATION: f32 = 0.15;
pub const DEFAULT_SPILL_STRENGTH: f32 = 0.65;
pub const DEFAULT_EDGE_BLUR: usize = 2;
pub const DEFAULT_DILATION_AMOUNT: usize = 1;

/// Full circle in 8-bit hue units.
pub const HUE_RANGE: f32 = 180.0;

/// Normalized hue distance above which a pixel is always kept.
pub const HUE_OVERRIDE_DISTANCE: f32 = 0.3;

/// Output encoders in preference order; the first one that opens wins.
pub const CODEC_PRIORITY: &[&str] = &["avc1", "h264", "H264", "X264", "mp4v"];

pub const FALLBACK_FPS: f64 = 30.0;

/// Progress is reported every this many frames.
pub const PROGRESS_INTERVAL: usize = 30;

pub const FRAME_FILE_PREFIX: &str = "frame_";

pub const CONFIG_DIR_NAME: &str = "chromaswap";
pub const CONFIG_FILE_NAME: &str = "keying.json";
