//! Scripted in-memory transport for tests and demos.
//!
//! Replaces the network with two queues of canned replies (one per
//! operation) and records every call, without requiring a running
//! steganography service.
//!
//! # Gating
//!
//! [`ScriptedTransport::gated`] returns a transport whose calls block on a
//! semaphore with zero permits.  A test can then observe the controller in
//! `Submitting`, try to re-submit, and finally release the request with
//! `gate.add_permits(1)`.
//!
//! ```ignore
//! let (transport, gate) = ScriptedTransport::gated();
//! transport.push_decode(Ok(Some("hello".into())));
//! // ... spawn controller.submit(), observe Submitting ...
//! gate.add_permits(1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use stego_core::{ImageAsset, MessageText};

use crate::application::transport::{EncodedImage, StegoTransport, TransportError};

/// One call observed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Encode {
        file_name: String,
        bytes: Vec<u8>,
        message: String,
    },
    Decode {
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// A transport that replays queued replies.
///
/// When a queue is empty the call fails with [`TransportError::Network`].
#[derive(Default)]
pub struct ScriptedTransport {
    encode_replies: Mutex<VecDeque<Result<EncodedImage, TransportError>>>,
    decode_replies: Mutex<VecDeque<Result<Option<String>, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose calls wait for a permit on the returned
    /// semaphore before replying.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (transport, gate)
    }

    pub fn push_encode(&self, reply: Result<EncodedImage, TransportError>) {
        self.encode_replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    pub fn push_decode(&self, reply: Result<Option<String>, TransportError>) {
        self.decode_replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            // A closed semaphore simply lets the call through.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

fn no_reply() -> TransportError {
    TransportError::Network("no scripted reply queued".to_string())
}

#[async_trait]
impl StegoTransport for ScriptedTransport {
    async fn encode(
        &self,
        image: &ImageAsset,
        message: &MessageText,
    ) -> Result<EncodedImage, TransportError> {
        self.record(RecordedCall::Encode {
            file_name: image.file_name().to_string(),
            bytes: image.bytes().to_vec(),
            message: message.as_str().to_string(),
        });
        self.wait_for_gate().await;
        self.encode_replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(no_reply()))
    }

    async fn decode(&self, image: &ImageAsset) -> Result<Option<String>, TransportError> {
        self.record(RecordedCall::Decode {
            file_name: image.file_name().to_string(),
            bytes: image.bytes().to_vec(),
        });
        self.wait_for_gate().await;
        self.decode_replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(no_reply()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageAsset {
        ImageAsset::from_named_bytes("photo.png", vec![1u8, 2, 3]).unwrap()
    }

    #[tokio::test]
    async fn test_replies_are_returned_in_order() {
        let transport = ScriptedTransport::new();
        transport.push_decode(Ok(Some("first".into())));
        transport.push_decode(Ok(None));

        assert_eq!(transport.decode(&image()).await.unwrap().as_deref(), Some("first"));
        assert_eq!(transport.decode(&image()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_queue_fails_with_network_error() {
        let transport = ScriptedTransport::new();
        let message = MessageText::new("hello").unwrap();

        let result = transport.encode(&image(), &message).await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let transport = ScriptedTransport::new();
        let message = MessageText::new("hello").unwrap();

        let _ = transport.encode(&image(), &message).await;

        assert_eq!(
            transport.calls(),
            vec![RecordedCall::Encode {
                file_name: "photo.png".into(),
                bytes: vec![1, 2, 3],
                message: "hello".into(),
            }]
        );
    }
}
