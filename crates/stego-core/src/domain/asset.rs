//! User-supplied inputs: the cover image and the secret message.
//!
//! Both types enforce their "non-empty" invariant at construction time so
//! that every `ImageAsset` and `MessageText` in the program is known to be
//! submittable.  Neither is ever mutated; a new selection replaces the old
//! value wholesale.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// Content type used when the file extension is not a known image type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors raised when constructing an input value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// The image payload contained zero bytes.
    #[error("image '{0}' is empty")]
    EmptyImage(String),
    /// The image has no usable file name.
    #[error("image file name must not be empty")]
    MissingFileName,
    /// The message text was empty.
    #[error("message must not be empty")]
    EmptyMessage,
}

/// An opaque binary image payload plus its file name and MIME type.
///
/// The bytes are held behind an `Arc` so that handing a copy to an in-flight
/// request does not duplicate the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    file_name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImageAsset {
    /// Creates an asset from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::MissingFileName`] for a blank name and
    /// [`AssetError::EmptyImage`] for an empty payload.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, AssetError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AssetError::MissingFileName);
        }
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AssetError::EmptyImage(file_name));
        }
        Ok(Self {
            file_name,
            content_type: content_type.into(),
            bytes,
        })
    }

    /// Creates an asset whose content type is inferred from `file_name`.
    ///
    /// # Errors
    ///
    /// Same as [`ImageAsset::new`].
    pub fn from_named_bytes(
        file_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, AssetError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self::new(file_name, content_type, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty (never true for a constructed asset).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Text to hide inside an image.
///
/// Only emptiness is checked.  Capacity limits belong to the remote service,
/// which reports them as an ordinary error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// # Errors
    ///
    /// Returns [`AssetError::EmptyMessage`] when `text` is empty.
    pub fn new(text: impl Into<String>) -> Result<Self, AssetError> {
        let text = text.into();
        if text.is_empty() {
            return Err(AssetError::EmptyMessage);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Display for MessageText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Infers an image MIME type from the extension of `file_name`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_asset_new_accepts_non_empty_payload() {
        let asset = ImageAsset::new("photo.png", "image/png", vec![1u8, 2, 3]).unwrap();
        assert_eq!(asset.file_name(), "photo.png");
        assert_eq!(asset.content_type(), "image/png");
        assert_eq!(asset.len(), 3);
        assert!(!asset.is_empty());
    }

    #[test]
    fn test_image_asset_new_rejects_empty_payload() {
        let result = ImageAsset::new("photo.png", "image/png", Vec::<u8>::new());
        assert_eq!(result, Err(AssetError::EmptyImage("photo.png".to_string())));
    }

    #[test]
    fn test_image_asset_new_rejects_blank_file_name() {
        let result = ImageAsset::new("  ", "image/png", vec![1u8]);
        assert_eq!(result, Err(AssetError::MissingFileName));
    }

    #[test]
    fn test_image_asset_clones_share_the_buffer() {
        let a = ImageAsset::from_named_bytes("a.png", vec![9u8; 16]).unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert!(std::ptr::eq(a.bytes().as_ptr(), b.bytes().as_ptr()));
    }

    #[test]
    fn test_message_text_rejects_empty_string() {
        assert_eq!(MessageText::new(""), Err(AssetError::EmptyMessage));
    }

    #[test]
    fn test_message_text_accepts_whitespace() {
        // Only emptiness is validated; whitespace is a legitimate payload.
        let msg = MessageText::new(" ").unwrap();
        assert_eq!(msg.as_str(), " ");
    }

    #[test]
    fn test_message_text_char_count_counts_characters_not_bytes() {
        let msg = MessageText::new("olá").unwrap();
        assert_eq!(msg.char_count(), 3);
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("x.PNG"), "image/png");
        assert_eq!(content_type_for("x.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("dir/x.jpg"), "image/jpeg");
        assert_eq!(content_type_for("x.tiff"), "image/tiff");
    }

    #[test]
    fn test_content_type_for_unknown_extension_falls_back() {
        assert_eq!(content_type_for("notes.txt"), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for("no_extension"), FALLBACK_CONTENT_TYPE);
    }
}
