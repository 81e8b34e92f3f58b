//! Scoped, revocable handles over binary buffers.
//!
//! A successful encode returns a binary image that the user views or
//! downloads.  A browser would hand out an object URL for it; here the same
//! idea is an [`ArtifactStore`] that hands out [`ArtifactHandle`]s.
//!
//! # Release obligation
//!
//! Every handle releases its buffer when it is dropped (or revoked
//! explicitly).  Because the handle lives inside the controller's
//! `OperationState::Succeeded`, replacing that state with a new submission,
//! a new file selection, or tearing the controller down releases the buffer
//! automatically.
//!
//! ```rust
//! use stego_core::ArtifactStore;
//!
//! let store = ArtifactStore::new();
//! let handle = store.acquire(vec![1, 2, 3], "image/png", "encoded_image.png");
//! assert!(store.resolve(handle.url()).is_some());
//!
//! drop(handle);
//! assert_eq!(store.live_count(), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

/// URL scheme prefix of every artifact reference.
pub const ARTIFACT_URL_PREFIX: &str = "blob:stego/";

/// Registry of live artifact buffers.
///
/// Cloning the store shares the registry.
#[derive(Clone, Default)]
pub struct ArtifactStore {
    entries: Arc<Mutex<HashMap<Uuid, Arc<[u8]>>>>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("live", &self.live_count())
            .finish()
    }
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` and returns the handle that owns them.
    pub fn acquire(
        &self,
        bytes: impl Into<Arc<[u8]>>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> ArtifactHandle {
        let id = Uuid::new_v4();
        let bytes = bytes.into();
        let size = bytes.len();
        self.lock().insert(id, bytes);
        debug!(%id, size, "artifact acquired");

        ArtifactHandle {
            id,
            url: format!("{ARTIFACT_URL_PREFIX}{id}"),
            content_type: content_type.into(),
            file_name: file_name.into(),
            size,
            store: self.clone(),
        }
    }

    /// Looks up the buffer behind an artifact URL.  Revoked URLs resolve to
    /// `None`.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url
            .strip_prefix(ARTIFACT_URL_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.lock().get(&id).cloned()
    }

    /// Number of buffers that have been acquired and not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            debug!(%id, "artifact released");
        }
        removed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<[u8]>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owning reference to one registered buffer.
///
/// Not `Clone`: exactly one owner is responsible for the release.
#[derive(Debug)]
pub struct ArtifactHandle {
    id: Uuid,
    url: String,
    content_type: String,
    file_name: String,
    size: usize,
    store: ArtifactStore,
}

impl ArtifactHandle {
    /// The reference a renderer uses to display or download the artifact.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Suggested download name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the buffer, or `None` once the handle has been revoked.
    pub fn contents(&self) -> Option<Arc<[u8]>> {
        self.store.lock().get(&self.id).cloned()
    }

    /// Releases the buffer now instead of waiting for the drop.
    pub fn revoke(self) {
        // Drop does the work.
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_registers_buffer_and_builds_url() {
        // Arrange
        let store = ArtifactStore::new();

        // Act
        let handle = store.acquire(vec![7u8; 4], "image/png", "encoded_image.png");

        // Assert
        assert!(handle.url().starts_with(ARTIFACT_URL_PREFIX));
        assert_eq!(handle.size(), 4);
        assert_eq!(handle.file_name(), "encoded_image.png");
        assert_eq!(handle.content_type(), "image/png");
        assert_eq!(store.live_count(), 1);
        assert_eq!(&*handle.contents().unwrap(), &[7u8; 4]);
    }

    #[test]
    fn test_drop_releases_buffer() {
        let store = ArtifactStore::new();
        let handle = store.acquire(vec![1u8], "image/png", "a.png");
        let url = handle.url().to_string();

        drop(handle);

        assert_eq!(store.live_count(), 0);
        assert!(store.resolve(&url).is_none());
    }

    #[test]
    fn test_revoke_releases_buffer() {
        let store = ArtifactStore::new();
        let handle = store.acquire(vec![1u8], "image/png", "a.png");

        handle.revoke();

        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_releasing_one_handle_keeps_others_alive() {
        let store = ArtifactStore::new();
        let first = store.acquire(vec![1u8], "image/png", "first.png");
        let second = store.acquire(vec![2u8], "image/png", "second.png");

        drop(first);

        assert_eq!(store.live_count(), 1);
        assert_eq!(&*store.resolve(second.url()).unwrap(), &[2u8]);
    }

    #[test]
    fn test_resolve_rejects_foreign_urls() {
        let store = ArtifactStore::new();
        assert!(store.resolve("https://example.com/x.png").is_none());
        assert!(store.resolve("blob:stego/not-a-uuid").is_none());
    }
}
