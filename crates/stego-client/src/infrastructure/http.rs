//! HTTP implementation of the Transport Adapter.
//!
//! Every request is a `multipart/form-data` POST to `<base_url><operation>/`:
//!
//! ```text
//! encode:  image=<file bytes; filename; content type>  message=<text>
//! decode:  image=<file bytes; filename; content type>
//! ```
//!
//! The base URL is the single prefix that a deployment proxy maps to the
//! real service origin (for example `http://127.0.0.1:8000/api/`).
//!
//! No timeout is configured: a request runs until the service answers or
//! the connection fails.

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::debug;

use stego_core::protocol::contract::{
    attachment_filename, endpoint_path, parse_decode_response, resolve_error_message,
    DEFAULT_ARTIFACT_NAME, DEFAULT_ARTIFACT_TYPE, IMAGE_FIELD, MESSAGE_FIELD,
};
use stego_core::{ImageAsset, MessageText, OperationKind};

use crate::application::transport::{EncodedImage, StegoTransport, TransportError};

/// `StegoTransport` over HTTP, backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `base_url` is not an
    /// absolute URL or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, base_url)
    }

    /// Creates a transport that reuses an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `base_url` is invalid.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of the endpoint for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the path cannot be joined.
    pub fn endpoint(&self, kind: OperationKind) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint_path(kind))
            .map_err(|e| TransportError::InvalidRequest(format!("invalid endpoint URL: {e}")))
    }

    async fn post(&self, kind: OperationKind, form: Form) -> Result<Response, TransportError> {
        let url = self.endpoint(kind)?;
        debug!(operation = %kind, %url, "sending multipart request");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!(operation = %kind, status = status.as_u16(), "response received");
        if status.is_success() {
            return Ok(response);
        }

        // An unreadable error body is treated like a non-JSON one.
        let body = response.bytes().await.unwrap_or_default();
        let message = resolve_error_message(status.as_u16(), status.canonical_reason(), &body);
        Err(TransportError::ServerRejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl StegoTransport for HttpTransport {
    async fn encode(
        &self,
        image: &ImageAsset,
        message: &MessageText,
    ) -> Result<EncodedImage, TransportError> {
        let form = Form::new()
            .part(IMAGE_FIELD, image_part(image)?)
            .text(MESSAGE_FIELD, message.as_str().to_string());

        let response = self.post(OperationKind::Encode, form).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| DEFAULT_ARTIFACT_TYPE.to_string());
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("could not read image body: {e}")))?;
        if bytes.is_empty() {
            return Err(TransportError::MalformedResponse(
                "the encoded image body was empty".to_string(),
            ));
        }

        Ok(EncodedImage {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        })
    }

    async fn decode(&self, image: &ImageAsset) -> Result<Option<String>, TransportError> {
        let form = Form::new().part(IMAGE_FIELD, image_part(image)?);

        let response = self.post(OperationKind::Decode, form).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("could not read body: {e}")))?;
        parse_decode_response(&body)
            .map_err(|e| TransportError::MalformedResponse(format!("invalid JSON body: {e}")))
    }
}

/// Builds the `image` multipart part with the asset's name and content type.
fn image_part(image: &ImageAsset) -> Result<Part, TransportError> {
    Part::bytes(image.bytes().to_vec())
        .file_name(image.file_name().to_string())
        .mime_str(image.content_type())
        .map_err(|e| {
            TransportError::InvalidRequest(format!(
                "invalid content type '{}': {e}",
                image.content_type()
            ))
        })
}

/// Parses `raw` and guarantees a trailing slash so that relative joins keep
/// the whole prefix (`/api` + `encode/` must give `/api/encode/`).
fn normalize_base_url(raw: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| TransportError::InvalidRequest(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(TransportError::InvalidRequest(format!(
            "base URL '{raw}' cannot carry a path"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
