//! Application layer use cases for the client.
//!
//! # What use cases does the client have?
//!
//! - **`transport`** – The [`transport::StegoTransport`] trait: "send this
//!   image (and message) to the service and give me back the result".  The
//!   real HTTP implementation lives in the infrastructure layer and is injected
//!   at construction time, so the controllers can be tested without a network.
//!
//! - **`controller`** – The request-lifecycle controller.  It records the
//!   user's selections, validates them, drives the lifecycle state machine
//!   from `stego-core`, and publishes every outcome to the notification relay.

pub mod controller;
pub mod transport;
