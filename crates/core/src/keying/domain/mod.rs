pub mod frame_keyer;
pub mod hsv;
pub mod key_color;
pub mod keying_config;
