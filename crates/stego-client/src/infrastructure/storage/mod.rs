//! Persistent storage for the client.
//!
//! The client keeps no history between sessions; the only thing on disk is
//! the TOML configuration file.

pub mod config;
