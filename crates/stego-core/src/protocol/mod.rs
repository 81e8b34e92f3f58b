//! Contract of the remote steganography service.
//!
//! The service is consumed, not owned, by this client.  Everything the client
//! assumes about it (paths, multipart field names, body shapes, and how an
//! error body becomes a user-facing message) is collected in [`contract`] so
//! the HTTP adapter and the tests agree on a single definition.

pub mod contract;
