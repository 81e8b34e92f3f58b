//! stego-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does stego-client do? (for beginners)
//!
//! The client lets a user hide a text message inside an image (*encode*) or
//! extract a previously hidden message (*decode*).  The steganography itself
//! runs on a remote HTTP service; the client:
//!
//! 1. Collects the user's input (an image file, and for encode a message).
//! 2. Validates that the required inputs are present.
//! 3. Uploads them as a multipart form to `<base>/encode/` or `<base>/decode/`.
//! 4. Interprets the response: a binary image, a revealed message, or a
//!    structured error.
//! 5. Reports the outcome through a single shared status banner.
//!
//! One [`application::controller::OperationController`] exists per
//! operation.  Each owns its own lifecycle state and allows at most one
//! request in flight.

/// Application layer: the transport seam and the operation controllers.
pub mod application;

/// Infrastructure layer: HTTP transport, file I/O, configuration, UI bridge.
pub mod infrastructure;
