//! Request lifecycle of one operation (encode or decode).
//!
//! # States
//!
//! ```text
//!             SubmitStarted               Completed(Ok)
//!   Idle ───────────────────> Submitting ───────────────> Succeeded(result)
//!    ^                            │
//!    │ FileSelected               │ Completed(Err)
//!    │                            v
//!    └────────────────────── Failed(error)
//! ```
//!
//! `Succeeded` and `Failed` also accept `SubmitStarted` (re-submission) and
//! `FileSelected` (which returns to `Idle`).  `Submitting` rejects both: a
//! controller has at most one request in flight and its inputs are frozen
//! until that request completes.
//!
//! Because the state is a single enum, "result and error both set" or
//! "submitting with a stale result" cannot be represented.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::artifact::ArtifactHandle;
use super::notification::Severity;

/// Which remote operation a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Encode,
    Decode,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Encode => f.write_str("encode"),
            OperationKind::Decode => f.write_str("decode"),
        }
    }
}

/// Classification of a failure, used to pick the notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required local input (file or message) is missing.  Never reaches
    /// the network.
    Validation,
    /// The request could not complete (connectivity, request construction).
    Transport,
    /// The service answered with a non-success status.
    Service,
    /// The service answered with a success status but an unusable body.
    ResponseFormat,
}

/// A single human-readable failure message plus its classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    pub fn response_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseFormat, message)
    }

    /// Validation problems are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self.kind {
            ErrorKind::Validation => Severity::Warning,
            ErrorKind::Transport | ErrorKind::Service | ErrorKind::ResponseFormat => {
                Severity::Error
            }
        }
    }
}

/// Artifact of a successful request.
#[derive(Debug)]
pub enum OperationResult {
    /// Encode: the image with the hidden message, behind a revocable handle.
    EncodedArtifact(ArtifactHandle),
    /// Decode: the message revealed from the image.
    RevealedMessage(String),
}

impl OperationResult {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationResult::EncodedArtifact(_) => OperationKind::Encode,
            OperationResult::RevealedMessage(_) => OperationKind::Decode,
        }
    }
}

/// Discrete lifecycle label, without payload.  Used by snapshots and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Inputs to [`OperationState::apply`].
#[derive(Debug)]
pub enum LifecycleEvent {
    /// The user picked a new image.
    FileSelected,
    /// A validated request is about to be sent.
    SubmitStarted,
    /// The in-flight request finished.
    Completed(Result<OperationResult, OperationError>),
}

/// Rejected transitions.  The state is left untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// A request is in flight; inputs are frozen and no second request may
    /// start.
    #[error("a {0} request is already in progress")]
    Busy(OperationKind),
    /// A completion arrived while no request was in flight.
    #[error("received a completion while no request was in progress")]
    NotSubmitting,
}

/// The state of one operation controller.
#[derive(Debug, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Submitting,
    Succeeded(OperationResult),
    Failed(OperationError),
}

impl OperationState {
    pub fn status(&self) -> OperationStatus {
        match self {
            OperationState::Idle => OperationStatus::Idle,
            OperationState::Submitting => OperationStatus::Submitting,
            OperationState::Succeeded(_) => OperationStatus::Succeeded,
            OperationState::Failed(_) => OperationStatus::Failed,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, OperationState::Submitting)
    }

    pub fn result(&self) -> Option<&OperationResult> {
        match self {
            OperationState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            OperationState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Applies `event` for an operation of kind `kind`.
    ///
    /// Any previous result is dropped on a successful transition, which
    /// releases an encoded artifact's buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Busy`] for `FileSelected`/`SubmitStarted`
    /// while `Submitting`, and [`TransitionError::NotSubmitting`] for a
    /// `Completed` event outside `Submitting`.
    pub fn apply(
        &mut self,
        kind: OperationKind,
        event: LifecycleEvent,
    ) -> Result<(), TransitionError> {
        let next = match (&*self, event) {
            (OperationState::Submitting, LifecycleEvent::FileSelected)
            | (OperationState::Submitting, LifecycleEvent::SubmitStarted) => {
                return Err(TransitionError::Busy(kind));
            }
            (
                OperationState::Idle | OperationState::Succeeded(_) | OperationState::Failed(_),
                LifecycleEvent::FileSelected,
            ) => OperationState::Idle,
            (
                OperationState::Idle | OperationState::Succeeded(_) | OperationState::Failed(_),
                LifecycleEvent::SubmitStarted,
            ) => OperationState::Submitting,
            (OperationState::Submitting, LifecycleEvent::Completed(Ok(result))) => {
                OperationState::Succeeded(result)
            }
            (OperationState::Submitting, LifecycleEvent::Completed(Err(error))) => {
                OperationState::Failed(error)
            }
            (
                OperationState::Idle | OperationState::Succeeded(_) | OperationState::Failed(_),
                LifecycleEvent::Completed(_),
            ) => return Err(TransitionError::NotSubmitting),
        };
        *self = next;
        Ok(())
    }
}
