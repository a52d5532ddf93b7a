use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::RgbImage;

use crate::shared::error::ChromaKeyError;

/// Loads a background image from a file path or a base64 `data:` URL.
pub fn load(source: &str) -> Result<RgbImage, ChromaKeyError> {
    if source.starts_with("data:") {
        from_data_url(source)
    } else {
        from_path(Path::new(source))
    }
}

/// The format is sniffed from the file contents, so downloaded files without
/// an extension still decode.
pub fn from_path(path: &Path) -> Result<RgbImage, ChromaKeyError> {
    let bytes = fs::read(path)
        .map_err(|e| ChromaKeyError::BackgroundLoad(format!("{}: {e}", path.display())))?;
    from_bytes(&bytes).map_err(|e| match e {
        ChromaKeyError::BackgroundLoad(message) => {
            ChromaKeyError::BackgroundLoad(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Decodes an encoded image (PNG, JPEG, ...) held in memory.
pub fn from_bytes(bytes: &[u8]) -> Result<RgbImage, ChromaKeyError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ChromaKeyError::BackgroundLoad(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Accepts `data:image/png;base64,...` as well as a bare base64 payload.
pub fn from_data_url(url: &str) -> Result<RgbImage, ChromaKeyError> {
    let payload = match url.split_once(',') {
        Some((_, payload)) => payload,
        None => url,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ChromaKeyError::BackgroundLoad(format!("invalid base64 payload: {e}")))?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let image = from_bytes(&png_bytes(3, 2, [10, 20, 30])).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let encoded = STANDARD.encode(png_bytes(2, 2, [200, 0, 0]));
        let url = format!("data:image/png;base64,{encoded}");
        let image = load(&url).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [200, 0, 0]);
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        std::fs::write(&path, png_bytes(4, 4, [0, 0, 255])).unwrap();
        let image = load(path.to_str().unwrap()).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn test_extensionless_file_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("background");
        std::fs::write(&path, png_bytes(2, 3, [5, 6, 7])).unwrap();
        assert_eq!(from_path(&path).unwrap().dimensions(), (2, 3));
    }

    #[test]
    fn test_missing_file_is_background_error() {
        let err = load("/nonexistent/bg.png").unwrap_err();
        assert!(matches!(err, ChromaKeyError::BackgroundLoad(_)));
    }

    #[test]
    fn test_garbage_bytes_are_background_error() {
        let err = from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, ChromaKeyError::BackgroundLoad(_)));
    }

    #[test]
    fn test_bad_base64_is_background_error() {
        let err = from_data_url("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, ChromaKeyError::BackgroundLoad(_)));
    }
}
