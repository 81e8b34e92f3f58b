//! OperationController: the request lifecycle of one operation.
//!
//! One controller exists per operation kind (encode, decode).  Both share the
//! same shape:
//!
//! ```text
//! select_file(f)  -> record f, clear result/error, info notification
//! set_message(m)  -> record m (encode only)
//! submit()        -> validate locally
//!                      ├─ missing input  -> warning notification, no request
//!                      └─ ok             -> Submitting
//!                                           └─ transport call (no lock held)
//!                                               ├─ Ok  -> Succeeded + success notification
//!                                               └─ Err -> Failed    + error notification
//! ```
//!
//! # Concurrency (for beginners)
//!
//! The controller is shared behind an `Arc` and its session lives in a
//! `tokio::sync::Mutex`.  The lock is held only while reading or changing the
//! session, never across the network call, so the UI can keep polling
//! [`OperationController::snapshot`] while a request is pending.  The
//! `Submitting` state, not the lock, is what prevents a second request: both
//! `submit` and `select_file` are rejected with [`ControllerError::Busy`]
//! until the pending request completes.
//!
//! A `submit` future that is dropped mid-request (a timeout, an aborted task,
//! a panicking transport) still leaves `Submitting`: an in-flight guard moves
//! the controller to `Failed` with [`REQUEST_CANCELLED`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use stego_core::{
    ArtifactStore, ImageAsset, LifecycleEvent, MessageText, NotificationRelay, OperationError,
    OperationKind, OperationResult, OperationState, OperationStatus, Severity, TransitionError,
};

use super::transport::StegoTransport;

pub const ENCODE_MISSING_INPUT: &str = "Please select an image and enter a message.";
pub const DECODE_MISSING_INPUT: &str = "Please select the encoded image.";
pub const ENCODE_SUCCEEDED: &str = "Encoding complete! Download the encoded image.";
pub const DECODE_SUCCEEDED: &str = "Message decoded successfully!";
pub const REQUEST_IN_PROGRESS: &str =
    "A request is already in progress. Wait for it to finish before changing the input.";
pub const MISSING_REVEALED_MESSAGE: &str =
    "The service response did not contain a hidden message.";
pub const REQUEST_CANCELLED: &str = "The request was cancelled before it completed.";

/// Errors returned by controller commands.
///
/// Every variant has already been reported through the notification relay
/// by the time the caller sees it.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Required local input is missing; nothing was sent.
    #[error("{0}")]
    Validation(OperationError),

    /// A request is in flight for this controller.
    #[error("a {0} request is already in progress")]
    Busy(OperationKind),

    /// `set_message` was called on a controller that takes no message.
    #[error("the {0} operation does not take a message")]
    MessageNotAccepted(OperationKind),

    /// The lifecycle rejected a transition that the controller expected to
    /// be valid.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] TransitionError),
}

/// Serializable view of a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultView {
    EncodedArtifact {
        url: String,
        file_name: String,
        content_type: String,
        size: usize,
    },
    RevealedMessage {
        message: String,
    },
}

/// Plain snapshot of a controller, safe to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub kind: OperationKind,
    pub status: OperationStatus,
    /// Name of the selected image, if any.
    pub file_name: Option<String>,
    /// Character count of the message draft (encode only).
    pub message_chars: Option<usize>,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

/// Bytes and metadata of an encoded artifact, for saving to disk.
#[derive(Debug, Clone)]
pub struct ArtifactDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Default)]
struct Session {
    image: Option<ImageAsset>,
    message: String,
    state: OperationState,
}

enum PendingRequest {
    Encode {
        image: ImageAsset,
        message: MessageText,
    },
    Decode {
        image: ImageAsset,
    },
}

/// The request-lifecycle controller for one operation kind.
pub struct OperationController {
    kind: OperationKind,
    transport: Arc<dyn StegoTransport>,
    relay: NotificationRelay,
    artifacts: ArtifactStore,
    session: Arc<Mutex<Session>>,
}

impl OperationController {
    pub fn new(
        kind: OperationKind,
        transport: Arc<dyn StegoTransport>,
        relay: NotificationRelay,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            kind,
            transport,
            relay,
            artifacts,
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Creates an encode controller.
    pub fn encode(
        transport: Arc<dyn StegoTransport>,
        relay: NotificationRelay,
        artifacts: ArtifactStore,
    ) -> Self {
        Self::new(OperationKind::Encode, transport, relay, artifacts)
    }

    /// Creates a decode controller.
    pub fn decode(
        transport: Arc<dyn StegoTransport>,
        relay: NotificationRelay,
        artifacts: ArtifactStore,
    ) -> Self {
        Self::new(OperationKind::Decode, transport, relay, artifacts)
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Replaces the selected image and clears any previous result or error.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] while a request is in flight; the
    /// previous selection is kept.
    pub async fn select_file(&self, image: ImageAsset) -> Result<(), ControllerError> {
        let mut session = self.session.lock().await;

        if let Err(err) = session.state.apply(self.kind, LifecycleEvent::FileSelected) {
            drop(session);
            return Err(self.reject_transition(err));
        }

        let notice = format!("Selected file: {}", image.file_name());
        debug!(operation = %self.kind, file = image.file_name(), bytes = image.len(), "file selected");
        session.image = Some(image);
        drop(session);

        self.relay.show(notice, Severity::Info);
        Ok(())
    }

    /// Records the message draft.  Does not clear a previous result.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::MessageNotAccepted`] on a decode controller.
    pub async fn set_message(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        if self.kind != OperationKind::Encode {
            return Err(ControllerError::MessageNotAccepted(self.kind));
        }
        self.session.lock().await.message = text.into();
        Ok(())
    }

    /// Validates the inputs and, if they are complete, runs the request.
    ///
    /// Returns the final status (`Succeeded` or `Failed`) once the request
    /// has completed.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Validation`] when a required input is missing.
    /// - [`ControllerError::Busy`] when a request is already in flight.
    pub async fn submit(&self) -> Result<OperationStatus, ControllerError> {
        let request = {
            let mut session = self.session.lock().await;

            if session.state.is_submitting() {
                drop(session);
                return Err(self.reject_transition(TransitionError::Busy(self.kind)));
            }

            let request = match self.prepare(&session) {
                Ok(request) => request,
                Err(err) => {
                    drop(session);
                    warn!(operation = %self.kind, "submission rejected: {err}");
                    self.relay.show(err.message.clone(), err.severity());
                    return Err(ControllerError::Validation(err));
                }
            };

            session.state.apply(self.kind, LifecycleEvent::SubmitStarted)?;
            request
        };

        let guard = InFlightGuard {
            kind: self.kind,
            session: Arc::clone(&self.session),
            relay: self.relay.clone(),
            armed: true,
        };
        let outcome = self.perform(request).await;
        guard.disarm();

        let (notice, severity) = match &outcome {
            Ok(_) => {
                info!(operation = %self.kind, "request succeeded");
                (self.success_message().to_string(), Severity::Success)
            }
            Err(err) => {
                warn!(operation = %self.kind, kind = ?err.kind, "request failed: {err}");
                (err.message.clone(), err.severity())
            }
        };

        let status = {
            let mut session = self.session.lock().await;
            session
                .state
                .apply(self.kind, LifecycleEvent::Completed(outcome))?;
            session.state.status()
        };

        self.relay.show(notice, severity);
        Ok(status)
    }

    pub async fn status(&self) -> OperationStatus {
        self.session.lock().await.state.status()
    }

    /// Returns a serializable copy of the controller state.
    pub async fn snapshot(&self) -> OperationSnapshot {
        let session = self.session.lock().await;

        let result = session.state.result().map(|result| match result {
            OperationResult::EncodedArtifact(handle) => ResultView::EncodedArtifact {
                url: handle.url().to_string(),
                file_name: handle.file_name().to_string(),
                content_type: handle.content_type().to_string(),
                size: handle.size(),
            },
            OperationResult::RevealedMessage(message) => ResultView::RevealedMessage {
                message: message.clone(),
            },
        });

        OperationSnapshot {
            kind: self.kind,
            status: session.state.status(),
            file_name: session.image.as_ref().map(|i| i.file_name().to_string()),
            message_chars: (self.kind == OperationKind::Encode)
                .then(|| session.message.chars().count()),
            result,
            error: session.state.error().map(|e| e.message.clone()),
        }
    }

    /// The revealed message of a successful decode.
    pub async fn revealed_message(&self) -> Option<String> {
        match self.session.lock().await.state.result() {
            Some(OperationResult::RevealedMessage(message)) => Some(message.clone()),
            _ => None,
        }
    }

    /// The encoded artifact of a successful encode, if it is still live.
    pub async fn artifact(&self) -> Option<ArtifactDownload> {
        match self.session.lock().await.state.result() {
            Some(OperationResult::EncodedArtifact(handle)) => {
                handle.contents().map(|bytes| ArtifactDownload {
                    file_name: handle.file_name().to_string(),
                    content_type: handle.content_type().to_string(),
                    bytes,
                })
            }
            _ => None,
        }
    }

    /// The error of a failed request.
    pub async fn last_error(&self) -> Option<OperationError> {
        self.session.lock().await.state.error().cloned()
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn prepare(&self, session: &Session) -> Result<PendingRequest, OperationError> {
        match self.kind {
            OperationKind::Encode => {
                let message = MessageText::new(session.message.as_str()).ok();
                match (session.image.clone(), message) {
                    (Some(image), Some(message)) => Ok(PendingRequest::Encode { image, message }),
                    _ => Err(OperationError::validation(ENCODE_MISSING_INPUT)),
                }
            }
            OperationKind::Decode => session
                .image
                .clone()
                .map(|image| PendingRequest::Decode { image })
                .ok_or_else(|| OperationError::validation(DECODE_MISSING_INPUT)),
        }
    }

    async fn perform(&self, request: PendingRequest) -> Result<OperationResult, OperationError> {
        match request {
            PendingRequest::Encode { image, message } => {
                info!(
                    operation = %self.kind,
                    file = image.file_name(),
                    bytes = image.len(),
                    message_chars = message.char_count(),
                    "submitting request"
                );
                let encoded = self.transport.encode(&image, &message).await?;
                let handle =
                    self.artifacts
                        .acquire(encoded.bytes, encoded.content_type, encoded.file_name);
                Ok(OperationResult::EncodedArtifact(handle))
            }
            PendingRequest::Decode { image } => {
                info!(
                    operation = %self.kind,
                    file = image.file_name(),
                    bytes = image.len(),
                    "submitting request"
                );
                match self.transport.decode(&image).await? {
                    Some(message) => Ok(OperationResult::RevealedMessage(message)),
                    None => Err(OperationError::response_format(MISSING_REVEALED_MESSAGE)),
                }
            }
        }
    }

    fn reject_transition(&self, err: TransitionError) -> ControllerError {
        match err {
            TransitionError::Busy(kind) => {
                warn!(operation = %kind, "rejected: request in progress");
                self.relay.show(REQUEST_IN_PROGRESS, Severity::Warning);
                ControllerError::Busy(kind)
            }
            other => ControllerError::Lifecycle(other),
        }
    }

    fn success_message(&self) -> &'static str {
        match self.kind {
            OperationKind::Encode => ENCODE_SUCCEEDED,
            OperationKind::Decode => DECODE_SUCCEEDED,
        }
    }
}

/// Fails the request if the `submit` future is dropped while it is in flight.
struct InFlightGuard {
    kind: OperationKind,
    session: Arc<Mutex<Session>>,
    relay: NotificationRelay,
    armed: bool,
}

impl InFlightGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

fn cancelled() -> LifecycleEvent {
    LifecycleEvent::Completed(Err(OperationError::transport(REQUEST_CANCELLED)))
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!(operation = %self.kind, "request dropped before completion");

        match self.session.try_lock() {
            Ok(mut session) => {
                let _ = session.state.apply(self.kind, cancelled());
            }
            // Someone is reading the session right now; finish the reset
            // once they release it.
            Err(_) => match Handle::try_current() {
                Ok(handle) => {
                    let session = Arc::clone(&self.session);
                    let kind = self.kind;
                    handle.spawn(async move {
                        let _ = session.lock().await.state.apply(kind, cancelled());
                    });
                }
                Err(_) => {
                    warn!(operation = %self.kind, "no runtime to reset the dropped request");
                }
            },
        }
        self.relay.show(REQUEST_CANCELLED, Severity::Error);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
