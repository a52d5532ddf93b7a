use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::shared::error::ChromaKeyError;

/// Returns true for inputs that must be downloaded before a job can read them.
pub fn is_remote(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves an input argument to a local path.
///
/// Local paths are returned unchanged. URLs are downloaded into `dest_dir`
/// under `file_name`; the caller owns `dest_dir` and its cleanup.
pub fn resolve_input(
    input: &str,
    dest_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ChromaKeyError> {
    if !is_remote(input) {
        return Ok(PathBuf::from(input));
    }
    let dest = dest_dir.join(file_name);
    download(input, &dest)?;
    Ok(dest)
}

fn download(url: &str, dest: &Path) -> Result<(), ChromaKeyError> {
    let fetch_err = |message: String| ChromaKeyError::Fetch {
        url: url.to_string(),
        message,
    };

    log::info!("Downloading {url}");
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| fetch_err(e.to_string()))?;
    let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;

    // Write next to the destination, then rename so readers never see a partial file
    let temp_path = dest.with_extension("part");
    let result = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.flush()
        })
        .and_then(|()| fs::rename(&temp_path, dest));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(fetch_err(format!("writing {}: {e}", dest.display())));
    }

    log::info!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}
