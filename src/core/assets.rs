//! Resolves resource paths to their contents.
//!
//! Everything here is synchronous: resources are read when an object is
//! constructed, on the render thread.
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("could not read resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("resource {0} is empty")]
    Empty(PathBuf),
    #[error("could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn string_from_path(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if text.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(text)
}

pub fn bytes_from_path(path: impl AsRef<Path>) -> Result<Vec<u8>, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(AssetError::Empty(path.to_path_buf()));
    }
    Ok(bytes)
}

/// Decode an image file into tightly packed RGBA8 pixels
pub fn image_from_path(path: impl AsRef<Path>) -> Result<RgbaImage, AssetError> {
    let path = path.as_ref();
    let bytes = bytes_from_path(path)?;

    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}
