//! Image payload resolution: embedded base64 data URIs and external files.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::document::Document;
use crate::error::ImageError;

/// Scheme prefix marking an embedded payload.
const DATA_URI_PREFIX: &str = "data:image";

/// Fetch the raw encoded bytes for `images[image_index]`.
///
/// `data:image/...;base64,` URIs are decoded in place; any other URI is
/// treated as a path relative to `model_dir` and read from disk. Failure
/// here only costs the one texture attachment, never the mesh load.
pub fn resolve_image(
    doc: &Document,
    image_index: usize,
    model_dir: Option<&Path>,
) -> Result<Vec<u8>, ImageError> {
    let image = doc
        .images
        .get(image_index)
        .ok_or_else(|| ImageError::DecodeFailed {
            reason: format!("image index {image_index} out of range"),
        })?;
    let uri = image.uri.as_deref().ok_or_else(|| ImageError::DecodeFailed {
        reason: format!("image {image_index} has no uri"),
    })?;

    if uri.starts_with(DATA_URI_PREFIX) {
        let (_, payload) = uri.split_once(',').ok_or_else(|| ImageError::DecodeFailed {
            reason: "data uri has no payload".to_string(),
        })?;
        return STANDARD
            .decode(payload)
            .map_err(|e| ImageError::DecodeFailed {
                reason: e.to_string(),
            });
    }

    let path = match model_dir {
        Some(dir) => dir.join(uri),
        None => PathBuf::from(uri),
    };
    fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ImageError::NotFound {
            uri: path.display().to_string(),
        },
        _ => ImageError::DecodeFailed {
            reason: e.to_string(),
        },
    })
}
