//! User-chosen icon files.

use std::path::Path;

use crate::{Error, Result};

use super::raster::data_url;

/// Largest accepted icon upload (100 KiB).
pub const MAX_ICON_FILE_BYTES: u64 = 100 * 1024;

/// Validate an icon file by name and size, then embed its bytes as a data URL.
///
/// The bytes are embedded as-is; no re-encoding takes place.
pub fn encode_icon_upload(file_name: &str, bytes: &[u8]) -> Result<String> {
    let mime_type = image_mime_type(file_name)?;
    check_size(bytes.len() as u64)?;
    Ok(data_url(&mime_type, bytes))
}

/// Read an icon file from disk, rejecting oversized files before reading them.
pub fn load_icon_file(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::validation(format!("invalid icon path: {}", path.display())))?;
    let mime_type = image_mime_type(file_name)?;
    check_size(std::fs::metadata(path)?.len())?;

    let bytes = std::fs::read(path)?;
    Ok(data_url(&mime_type, &bytes))
}

fn image_mime_type(file_name: &str) -> Result<String> {
    mime_guess::from_path(file_name)
        .first_raw()
        .filter(|mime_type| mime_type.starts_with("image/"))
        .map(ToString::to_string)
        .ok_or_else(|| Error::validation("please choose a valid image file"))
}

fn check_size(len: u64) -> Result<()> {
    if len > MAX_ICON_FILE_BYTES {
        return Err(Error::validation(
            "image file is too large, please choose one under 100KB",
        ));
    }
    Ok(())
}
