//! # stego-core
//!
//! Shared library for the steganography client containing the domain types,
//! the request-lifecycle state machine and the remote service contract.
//!
//! The crate has zero dependencies on network sockets, async runtimes or UI
//! frameworks.  Everything that talks to the outside world lives in
//! `stego-client`.
//!
//! # Architecture overview (for beginners)
//!
//! The client hides a text message inside an image (*encode*) or reveals a
//! previously hidden message (*decode*).  The steganography itself happens on
//! a remote HTTP service; the client only collects input, submits it, and
//! presents the outcome.
//!
//! - **`domain`** – Pure business logic.  The most important piece is the
//!   [`OperationState`] machine: `Idle → Submitting → Succeeded | Failed`,
//!   with an exhaustive transition function so contradictory combinations
//!   (a result *and* an error at the same time) cannot be represented.
//!
//! - **`protocol`** – What the remote service expects and returns: endpoint
//!   paths, multipart field names, and the rules for turning an error body
//!   into a user-facing message.

pub mod domain;
pub mod protocol;

pub use domain::artifact::{ArtifactHandle, ArtifactStore};
pub use domain::asset::{AssetError, ImageAsset, MessageText};
pub use domain::lifecycle::{
    ErrorKind, LifecycleEvent, OperationError, OperationKind, OperationResult, OperationState,
    OperationStatus, TransitionError,
};
pub use domain::notification::{NotificationRelay, NotificationState, Severity};
pub use protocol::contract::ParsedServerError;
