//! The Transport Adapter seam.
//!
//! [`StegoTransport`] turns a domain-level request into a call to the remote
//! service and the response into either a domain value or a
//! [`TransportError`].  It never touches shared state.

use async_trait::async_trait;
use stego_core::{ImageAsset, MessageText, OperationError};
use thiserror::Error;

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built (bad base URL, bad content type).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service could not be reached.
    #[error("could not reach the steganography service: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    ///
    /// `message` is already resolved to user-facing text (see
    /// `stego_core::protocol::contract::resolve_error_message`).
    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    /// The service answered with a success status but the body was unusable.
    #[error("unexpected response from the steganography service: {0}")]
    MalformedResponse(String),
}

impl From<TransportError> for OperationError {
    fn from(err: TransportError) -> Self {
        let message = err.to_string();
        match err {
            TransportError::InvalidRequest(_) | TransportError::Network(_) => {
                OperationError::transport(message)
            }
            TransportError::ServerRejected { .. } => OperationError::service(message),
            TransportError::MalformedResponse(_) => OperationError::response_format(message),
        }
    }
}

/// Binary body of a successful encode plus the metadata the service sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Remote steganography operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StegoTransport: Send + Sync {
    /// Hides `message` inside `image`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connectivity problems, non-success
    /// statuses, or an empty success body.
    async fn encode(
        &self,
        image: &ImageAsset,
        message: &MessageText,
    ) -> Result<EncodedImage, TransportError>;

    /// Reveals the message hidden in `image`.
    ///
    /// `Ok(None)` means the service answered successfully but its body had no
    /// `message` field; callers decide whether that is a failure.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on connectivity problems, non-success
    /// statuses, or a success body that is not JSON.
    async fn decode(&self, image: &ImageAsset) -> Result<Option<String>, TransportError>;
}
