//! File-system adapters: image selection and artifact download.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use stego_core::protocol::contract::{safe_file_name, DEFAULT_ARTIFACT_NAME};
use stego_core::{AssetError, ImageAsset};

#[derive(Debug, Error)]
pub enum FileInputError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot use {path} as an image: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
}

/// Reads the file at `path` into an [`ImageAsset`].
///
/// The content type is inferred from the extension; the bytes are not
/// inspected.
///
/// # Errors
///
/// Returns [`FileInputError::Io`] if the file cannot be read and
/// [`FileInputError::Asset`] if it is empty or has no file name.
pub async fn load_image(path: &Path) -> Result<ImageAsset, FileInputError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FileInputError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    debug!(path = %path.display(), bytes = bytes.len(), "image file read");
    ImageAsset::from_named_bytes(file_name, bytes).map_err(|source| FileInputError::Asset {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`FileInputError::Io`] on any file-system failure.
pub async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), FileInputError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| FileInputError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| FileInputError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Where to save an artifact: the explicit destination if given, otherwise
/// `file_name` inside `output_dir`.
///
/// `file_name` comes from the service and is reduced to its last component;
/// a name with none falls back to [`DEFAULT_ARTIFACT_NAME`].  The result is
/// always directly inside `output_dir`.
pub fn artifact_destination(
    destination: Option<&Path>,
    output_dir: &Path,
    file_name: &str,
) -> PathBuf {
    match destination {
        Some(path) => path.to_path_buf(),
        None => {
            let name = safe_file_name(file_name).unwrap_or_else(|| {
                warn!(suggested = file_name, "unusable artifact file name, using default");
                DEFAULT_ARTIFACT_NAME.to_string()
            });
            output_dir.join(name)
        }
    }
}
