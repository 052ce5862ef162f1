//! Raster conversion of fetched icons into embeddable data URLs.

use std::io::Cursor;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use image::{GenericImageView, ImageFormat};

use crate::{Error, Result};

/// Encode raw bytes as a `data:` URL with the given MIME type.
#[must_use]
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

/// Decode any supported image (ICO, PNG, JPEG, GIF, ...) and re-encode it as
/// a PNG data URL at its natural size.
pub fn rasterize_to_data_url(source_bytes: &[u8]) -> Result<String> {
    if source_bytes.is_empty() {
        return Err(Error::validation("icon source bytes cannot be empty"));
    }

    let source = image::load_from_memory(source_bytes)
        .map_err(|error| Error::validation(format!("failed to decode icon image: {error}")))?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::validation("icon image has no pixels"));
    }

    let mut cursor = Cursor::new(Vec::new());
    source
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|error| Error::validation(format!("failed to encode icon as PNG: {error}")))?;

    Ok(data_url("image/png", &cursor.into_inner()))
}
