//! Command bridge between the presentation shell and the controllers.
//!
//! The shell (a terminal CLI today, a desktop or web front end tomorrow) never
//! touches the controllers directly.  It calls the async command functions in
//! this module and renders the DTOs they return.
//!
//! ```text
//! Shell                         ui_bridge                     application
//! ──────────────────────────────────────────────────────────────────────────
//! select_file(Encode, path) ──> load_image(path) ──────────> encode.select_file()
//! set_message("hello")      ──────────────────────────────> encode.set_message()
//! submit(Encode)            ──────────────────────────────> encode.submit()
//! get_app_status()          <── AppStatusDto { notification, encode, decode }
//! ```
//!
//! # `CommandResult<T>`
//!
//! All commands return `CommandResult<T>`, a unified envelope:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```
//!
//! # Tabs and the banner
//!
//! The shell shows one operation at a time.  [`switch_tab`] changes the active
//! tab and dismisses the notification banner, so a message about the encode
//! tab is never shown on the decode tab.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use stego_core::{ArtifactStore, NotificationRelay, NotificationState, OperationStatus, Severity};

use crate::application::controller::{OperationController, OperationSnapshot};
use crate::application::transport::StegoTransport;
use crate::infrastructure::file_input::{artifact_destination, load_image, write_artifact};

// ── Shared application state ──────────────────────────────────────────────────

/// The operation currently shown by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Encode,
    Decode,
}

/// Runtime state shared between commands.
///
/// Both controllers receive clones of the same `relay` (one banner for the
/// whole app) and the same `artifacts` store.
pub struct StegoAppState {
    pub relay: NotificationRelay,
    pub artifacts: ArtifactStore,
    pub encode: OperationController,
    pub decode: OperationController,
    pub active_tab: Mutex<Tab>,
}

impl StegoAppState {
    /// Creates the state with both controllers wired to `transport`.
    pub fn new(transport: Arc<dyn StegoTransport>) -> Arc<Self> {
        let relay = NotificationRelay::new();
        let artifacts = ArtifactStore::new();
        Arc::new(Self {
            encode: OperationController::encode(
                Arc::clone(&transport),
                relay.clone(),
                artifacts.clone(),
            ),
            decode: OperationController::decode(transport, relay.clone(), artifacts.clone()),
            relay,
            artifacts,
            active_tab: Mutex::new(Tab::Encode),
        })
    }

    pub fn controller(&self, tab: Tab) -> &OperationController {
        match tab {
            Tab::Encode => &self.encode,
            Tab::Decode => &self.decode,
        }
    }
}

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Full status snapshot returned to the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStatusDto {
    pub active_tab: Tab,
    pub notification: NotificationState,
    pub encode: OperationSnapshot,
    pub decode: OperationSnapshot,
}

/// Unified response wrapper for commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    /// `true` if the command completed successfully; `false` on error.
    pub success: bool,
    /// The command's return value, present only when `success` is `true`.
    pub data: Option<T>,
    /// A human-readable error message, present only when `success` is `false`.
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the banner plus a snapshot of both controllers.
pub async fn get_app_status(state: Arc<StegoAppState>) -> CommandResult<AppStatusDto> {
    let active_tab = *state.active_tab.lock().await;
    CommandResult::ok(AppStatusDto {
        active_tab,
        notification: state.relay.current(),
        encode: state.encode.snapshot().await,
        decode: state.decode.snapshot().await,
    })
}

/// Makes `tab` the active tab and dismisses the banner.
pub async fn switch_tab(state: Arc<StegoAppState>, tab: Tab) -> CommandResult<Tab> {
    *state.active_tab.lock().await = tab;
    state.relay.dismiss();
    CommandResult::ok(tab)
}

/// Hides the banner.
pub async fn dismiss_notification(state: Arc<StegoAppState>) -> CommandResult<NotificationState> {
    state.relay.dismiss();
    CommandResult::ok(state.relay.current())
}

/// Reads the image at `path` and selects it on the `tab` controller.
///
/// A file that cannot be read is reported on the banner; the previous
/// selection is kept.
pub async fn select_file(
    state: Arc<StegoAppState>,
    tab: Tab,
    path: PathBuf,
) -> CommandResult<OperationSnapshot> {
    let image = match load_image(&path).await {
        Ok(image) => image,
        Err(e) => {
            warn!("file selection failed: {e}");
            state.relay.show(e.to_string(), Severity::Error);
            return CommandResult::err(e.to_string());
        }
    };

    let controller = state.controller(tab);
    match controller.select_file(image).await {
        Ok(()) => CommandResult::ok(controller.snapshot().await),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Updates the encode message draft.
pub async fn set_message(state: Arc<StegoAppState>, text: String) -> CommandResult<OperationSnapshot> {
    match state.encode.set_message(text).await {
        Ok(()) => CommandResult::ok(state.encode.snapshot().await),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Submits the `tab` controller and waits for the request to complete.
///
/// `success` is `true` only when the operation succeeded; a failed operation
/// carries the same message that was put on the banner.
pub async fn submit(state: Arc<StegoAppState>, tab: Tab) -> CommandResult<OperationSnapshot> {
    let controller = state.controller(tab);
    match controller.submit().await {
        Ok(OperationStatus::Succeeded) => CommandResult::ok(controller.snapshot().await),
        Ok(_) => {
            let message = controller
                .last_error()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|| state.relay.current().message);
            CommandResult::err(message)
        }
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Saves the encoded artifact to `destination`, or to its suggested file
/// name inside `output_dir`.  Returns the path written.
pub async fn save_artifact(
    state: Arc<StegoAppState>,
    destination: Option<PathBuf>,
    output_dir: &Path,
) -> CommandResult<PathBuf> {
    let Some(download) = state.encode.artifact().await else {
        return CommandResult::err("there is no encoded image to save");
    };

    let path = artifact_destination(destination.as_deref(), output_dir, &download.file_name);
    match write_artifact(&path, &download.bytes).await {
        Ok(()) => CommandResult::ok(path),
        Err(e) => {
            state.relay.show(e.to_string(), Severity::Error);
            CommandResult::err(e.to_string())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::EncodedImage;
    use crate::infrastructure::mock::ScriptedTransport;

    fn make_state(transport: ScriptedTransport) -> Arc<StegoAppState> {
        StegoAppState::new(Arc::new(transport))
    }

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, [0x89u8, b'P', b'N', b'G']).unwrap();
        path
    }

    #[tokio::test]
    async fn test_initial_status_is_idle_on_encode_tab() {
        let state = make_state(ScriptedTransport::new());

        let status = get_app_status(state).await.data.unwrap();

        assert_eq!(status.active_tab, Tab::Encode);
        assert!(!status.notification.visible);
        assert_eq!(status.encode.status, OperationStatus::Idle);
        assert_eq!(status.decode.status, OperationStatus::Idle);
    }

    #[tokio::test]
    async fn test_switch_tab_dismisses_notification() {
        // Arrange
        let state = make_state(ScriptedTransport::new());
        state.relay.show("Selected file: photo.png", Severity::Info);

        // Act
        let result = switch_tab(Arc::clone(&state), Tab::Decode).await;

        // Assert
        assert!(result.success);
        assert_eq!(*state.active_tab.lock().await, Tab::Decode);
        assert!(!state.relay.is_visible());
    }

    #[tokio::test]
    async fn test_select_missing_file_reports_error_on_banner() {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(ScriptedTransport::new());

        let result = select_file(Arc::clone(&state), Tab::Decode, dir.path().join("nope.png")).await;

        assert!(!result.success);
        assert_eq!(state.relay.current().severity, Severity::Error);
        assert!(state.decode.snapshot().await.file_name.is_none());
    }

    #[tokio::test]
    async fn test_encode_flow_saves_artifact_to_output_dir() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new();
        transport.push_encode(Ok(EncodedImage {
            bytes: vec![7, 7, 7],
            content_type: "image/png".into(),
            file_name: "encoded_image.png".into(),
        }));
        let state = make_state(transport);
        let image = write_image(dir.path(), "photo.png");

        // Act
        assert!(select_file(Arc::clone(&state), Tab::Encode, image).await.success);
        assert!(set_message(Arc::clone(&state), "hello".into()).await.success);
        let submitted = submit(Arc::clone(&state), Tab::Encode).await;
        let saved = save_artifact(Arc::clone(&state), None, dir.path()).await;

        // Assert
        assert!(submitted.success);
        let path = saved.data.unwrap();
        assert_eq!(path, dir.path().join("encoded_image.png"));
        assert_eq!(std::fs::read(path).unwrap(), vec![7, 7, 7]);
    }

    #[tokio::test]
    async fn test_save_artifact_ignores_directories_in_server_file_name() {
        // Arrange: the service suggests a name that climbs out of the output dir.
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let transport = ScriptedTransport::new();
        transport.push_encode(Ok(EncodedImage {
            bytes: vec![1, 2, 3],
            content_type: "image/png".into(),
            file_name: "../escaped.png".into(),
        }));
        let state = make_state(transport);
        let image = write_image(dir.path(), "photo.png");
        select_file(Arc::clone(&state), Tab::Encode, image).await;
        set_message(Arc::clone(&state), "hello".into()).await;
        assert!(submit(Arc::clone(&state), Tab::Encode).await.success);

        // Act
        let saved = save_artifact(Arc::clone(&state), None, &out).await;

        // Assert
        assert_eq!(saved.data.unwrap(), out.join("escaped.png"));
        assert!(out.join("escaped.png").exists());
        assert!(!dir.path().join("escaped.png").exists());
    }

    #[tokio::test]
    async fn test_failed_submit_returns_banner_message() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new();
        transport.push_decode(Err(
            crate::application::transport::TransportError::ServerRejected {
                status: 500,
                message: "Internal error while decoding".into(),
            },
        ));
        let state = make_state(transport);
        let image = write_image(dir.path(), "encoded.png");
        select_file(Arc::clone(&state), Tab::Decode, image).await;

        let result = submit(Arc::clone(&state), Tab::Decode).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Internal error while decoding"));
        assert_eq!(state.relay.current().message, "Internal error while decoding");
    }

    #[tokio::test]
    async fn test_save_artifact_without_result_fails() {
        let state = make_state(ScriptedTransport::new());
        let result = save_artifact(state, None, Path::new(".")).await;
        assert!(!result.success);
    }

    #[test]
    fn test_command_result_ok_sets_success_true() {
        let r: CommandResult<u32> = CommandResult::ok(99);
        assert!(r.success);
        assert_eq!(r.data.unwrap(), 99);
        assert!(r.error.is_none());
    }

    #[test]
    fn test_command_result_err_sets_success_false() {
        let r: CommandResult<u32> = CommandResult::err("oops");
        assert!(!r.success);
        assert!(r.data.is_none());
        assert_eq!(r.error.unwrap(), "oops");
    }
}
