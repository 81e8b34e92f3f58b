//! Infrastructure layer for the client.
//!
//! Contains the adapters that touch the outside world: the HTTP transport,
//! file-system input/output, configuration persistence, and the command
//! bridge used by the presentation shell.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `stego_core`, but MUST NOT be imported by the `application` layer or by
//! `stego_core`.
//!
//! # Sub-modules
//!
//! - **`http`** – `HttpTransport`, the reqwest implementation of
//!   `StegoTransport`.  Builds the multipart payloads and interprets the
//!   service's responses.
//!
//! - **`mock`** – `ScriptedTransport`, an in-memory transport that replays
//!   queued replies and records every call.  Used by the integration tests and
//!   handy for demos without a running service.
//!
//! - **`file_input`** – Reads image files into `ImageAsset`s and writes
//!   encoded artifacts back to disk.
//!
//! - **`storage`** – TOML configuration file.
//!
//! - **`ui_bridge`** – Command handlers that expose both controllers and the
//!   notification banner to a presentation shell (the CLI in `main.rs`).

pub mod file_input;
pub mod http;
pub mod mock;
pub mod storage;
pub mod ui_bridge;
