//! Domain entities for the steganography client.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.
//!
//! # What lives here?
//!
//! - **`asset`** – The user's inputs: the selected image and the message text.
//! - **`artifact`** – Scoped, revocable handles over the binary image that a
//!   successful encode returns.  Dropping a handle releases its buffer.
//! - **`lifecycle`** – The per-operation state machine and its error type.
//! - **`notification`** – The single-slot, last-write-wins status banner that
//!   both operations write to.
//!
//! Code in outer layers (application, infrastructure, CLI) depends on the
//! domain, but the domain never depends on them.

pub mod artifact;
pub mod asset;
pub mod lifecycle;
pub mod notification;
