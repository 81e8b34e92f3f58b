//! Wire contract: endpoints, field names and response interpretation.
//!
//! ```text
//! POST <base>encode/   multipart { image: <file>, message: <text> }
//!   2xx  -> binary image body
//!   else -> JSON { "error": "<string>" }   (if parseable)
//!
//! POST <base>decode/   multipart { image: <file> }
//!   2xx  -> JSON { "message": "<string>" }
//!   else -> JSON { "error": "<string>" }   (if parseable)
//! ```
//!
//! # Error message resolution
//!
//! A failed response becomes exactly one user-facing string:
//!
//! 1. The body is JSON with a usable `error` field: use it.  Strings are
//!    taken as-is; numbers, `true`, arrays and objects are shown as JSON text.
//! 2. The body is not JSON at all: [`UNEXPECTED_SERVER_ERROR`].
//! 3. The body is JSON without a usable `error`: the HTTP reason phrase, or
//!    `"Error <status>"` when there is none.

use std::path::{Component, Path};

use serde::Deserialize;
use serde_json::Value;

use crate::domain::lifecycle::OperationKind;

/// Default base path; a deployment proxy maps it to the service origin.
pub const DEFAULT_API_PREFIX: &str = "/api/";

pub const ENCODE_PATH: &str = "encode/";
pub const DECODE_PATH: &str = "decode/";

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the message text (encode only).
pub const MESSAGE_FIELD: &str = "message";

/// Download name used when the service does not suggest one.
pub const DEFAULT_ARTIFACT_NAME: &str = "encoded_image.png";
/// Content type assumed when an encode response does not declare one.
pub const DEFAULT_ARTIFACT_TYPE: &str = "image/png";

/// Message used when an error body cannot be parsed as JSON.
pub const UNEXPECTED_SERVER_ERROR: &str = "Unexpected server error (non-JSON response).";

/// Relative endpoint path for `kind`, to be joined onto the base URL.
pub fn endpoint_path(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Encode => ENCODE_PATH,
        OperationKind::Decode => DECODE_PATH,
    }
}

/// Typed view of a service error body.
///
/// `message` is `None` when the JSON has no `error` field, or when the field
/// is `null`, `false`, `0` or an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedServerError {
    pub message: Option<String>,
}

impl ParsedServerError {
    /// Parses an error body.  Returns `None` when `body` is not JSON.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let message = value.get("error").and_then(error_text);
        Some(Self { message })
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Turns a failed response into the message shown to the user.
///
/// `reason` is the HTTP reason phrase for `status`, if known.
pub fn resolve_error_message(status: u16, reason: Option<&str>, body: &[u8]) -> String {
    match ParsedServerError::parse(body) {
        None => UNEXPECTED_SERVER_ERROR.to_string(),
        Some(ParsedServerError {
            message: Some(message),
        }) => message,
        Some(ParsedServerError { message: None }) => match reason {
            Some(reason) if !reason.is_empty() => reason.to_string(),
            _ => format!("Error {status}"),
        },
    }
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Extracts `message` from a successful decode body.
///
/// # Errors
///
/// Returns the JSON error when `body` is not a JSON object.  A missing or
/// `null` `message` field is `Ok(None)`.
pub fn parse_decode_response(body: &[u8]) -> Result<Option<String>, serde_json::Error> {
    let parsed: DecodeResponse = serde_json::from_slice(body)?;
    Ok(parsed.message)
}

/// Extracts the `filename` parameter of a `Content-Disposition` header,
/// reduced to a bare file name by [`safe_file_name`].
pub fn attachment_filename(content_disposition: &str) -> Option<String> {
    content_disposition
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            safe_file_name(value.trim().trim_matches('"'))
        })
}

/// Reduces a suggested name to its last path component.
///
/// Returns `None` for names that have no normal final component (empty,
/// `.`, `..`, a bare root).  Both `/` and `\` count as separators, so the
/// result never leaves the directory it is joined onto.
pub fn safe_file_name(suggested: &str) -> Option<String> {
    let last = suggested.rsplit(['/', '\\']).next()?.trim();
    match Path::new(last).components().next_back() {
        Some(Component::Normal(name)) if Path::new(name) == Path::new(last) => {
            Some(last.to_string())
        }
        _ => None,
    }
}
