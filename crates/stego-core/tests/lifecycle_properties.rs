//! Property-style tests for the operation lifecycle and the notification slot.
//!
//! These tests walk every (state, event) pair through the public API and
//! check the invariants the controllers rely on:
//!
//! - a rejected transition never changes the state;
//! - no state carries both a result and an error;
//! - an encoded artifact's buffer is released as soon as its state is left.

use stego_core::{
    ArtifactStore, LifecycleEvent, NotificationRelay, OperationError, OperationKind,
    OperationResult, OperationState, OperationStatus, Severity, TransitionError,
};

fn all_states(store: &ArtifactStore) -> Vec<OperationState> {
    vec![
        OperationState::Idle,
        OperationState::Submitting,
        OperationState::Succeeded(OperationResult::EncodedArtifact(store.acquire(
            vec![1u8, 2, 3],
            "image/png",
            "encoded_image.png",
        ))),
        OperationState::Failed(OperationError::transport("offline")),
    ]
}

fn all_events(store: &ArtifactStore) -> Vec<LifecycleEvent> {
    vec![
        LifecycleEvent::FileSelected,
        LifecycleEvent::SubmitStarted,
        LifecycleEvent::Completed(Ok(OperationResult::EncodedArtifact(store.acquire(
            vec![4u8, 5],
            "image/png",
            "encoded_image.png",
        )))),
        LifecycleEvent::Completed(Err(OperationError::service("Message too long"))),
    ]
}

#[test]
fn test_every_transition_is_either_applied_or_leaves_state_unchanged() {
    let store = ArtifactStore::new();

    for state_index in 0..4 {
        for event_index in 0..4 {
            // Arrange: fresh state and event for each pair.
            let mut state = all_states(&store).swap_remove(state_index);
            let event = all_events(&store).swap_remove(event_index);
            let before = state.status();

            // Act
            let outcome = state.apply(OperationKind::Encode, event);

            // Assert
            match outcome {
                Ok(()) => {}
                Err(TransitionError::Busy(kind)) => {
                    assert_eq!(kind, OperationKind::Encode);
                    assert_eq!(before, OperationStatus::Submitting);
                    assert_eq!(state.status(), before);
                }
                Err(TransitionError::NotSubmitting) => {
                    assert_ne!(before, OperationStatus::Submitting);
                    assert_eq!(state.status(), before);
                }
            }
            assert!(
                !(state.result().is_some() && state.error().is_some()),
                "result and error must never coexist"
            );
        }
    }

    // Every temporary state and event has been dropped by now.
    assert_eq!(store.live_count(), 0, "all artifact buffers must be released");
}

#[test]
fn test_full_cycle_submit_fail_resubmit_succeed() {
    let store = ArtifactStore::new();
    let mut state = OperationState::default();

    state
        .apply(OperationKind::Encode, LifecycleEvent::SubmitStarted)
        .unwrap();
    state
        .apply(
            OperationKind::Encode,
            LifecycleEvent::Completed(Err(OperationError::service("Message too long"))),
        )
        .unwrap();
    assert_eq!(state.status(), OperationStatus::Failed);

    state
        .apply(OperationKind::Encode, LifecycleEvent::SubmitStarted)
        .unwrap();
    assert!(state.error().is_none(), "resubmission clears the old error");

    let handle = store.acquire(vec![9u8; 8], "image/png", "encoded_image.png");
    state
        .apply(
            OperationKind::Encode,
            LifecycleEvent::Completed(Ok(OperationResult::EncodedArtifact(handle))),
        )
        .unwrap();

    match state.result() {
        Some(OperationResult::EncodedArtifact(handle)) => {
            assert_eq!(handle.size(), 8);
            assert!(store.resolve(handle.url()).is_some());
        }
        other => panic!("expected an encoded artifact, got {other:?}"),
    }

    drop(state);
    assert_eq!(store.live_count(), 0);
}

#[test]
fn test_rapid_notifications_keep_only_the_last() {
    let relay = NotificationRelay::new();

    relay.show("Selected file: photo.png", Severity::Info);
    relay.show("Encoding complete! Download the encoded image.", Severity::Success);

    let state = relay.current();
    assert!(state.visible);
    assert_eq!(state.message, "Encoding complete! Download the encoded image.");
    assert_eq!(state.severity, Severity::Success);
}
