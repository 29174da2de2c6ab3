//! HTTP transport for rendering backends.
//!
//! Sends a DOT document to a single backend and returns the raw image
//! bytes. The fallback loop across backends lives in [`crate::service`].

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use ureq::Agent;

use crate::backend::{HttpMethod, RenderBackend};

/// Characters left unescaped in query and form values: A-Z a-z 0-9 - . _ ~
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query or form value per RFC 3986.
fn encode_value(input: &str) -> String {
    percent_encode(input.as_bytes(), VALUE_ENCODE_SET).to_string()
}

/// Single render attempt error.
#[derive(Debug, thiserror::Error)]
#[error("backend {backend}: {kind}")]
pub(crate) struct RenderError {
    pub backend: String,
    pub kind: RenderErrorKind,
}

/// Kind of render attempt error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RenderErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("empty response body")]
    EmptyBody,
}

/// Create HTTP agent with the specified timeout.
///
/// Non-success statuses are returned as regular responses so the caller
/// can fall through to the next backend.
pub(crate) fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Build the urlencoded parameter string for a backend request.
///
/// Used as the query string for GET backends and as the form body for
/// POST backends.
fn encode_params(backend: &RenderBackend, document: &str, format: &str) -> String {
    format!(
        "{}={}&format={}",
        encode_value(&backend.document_param),
        encode_value(document),
        encode_value(format)
    )
}

/// Send a document to a single backend and return the response body bytes.
///
/// Handles HTTP errors by reading the response body for error details.
/// An empty body on a success status is an error: the destination file is
/// only ever written from a complete, non-empty response.
pub(crate) fn send_render_request(
    agent: &Agent,
    backend: &RenderBackend,
    document: &str,
    format: &str,
) -> Result<Vec<u8>, RenderError> {
    let params = encode_params(backend, document, format);

    let result = match backend.method {
        HttpMethod::Get => {
            let url = format!("{}?{}", backend.endpoint, params);
            agent.get(&url).call()
        }
        HttpMethod::Post => agent
            .post(&backend.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send(params.as_bytes()),
    };

    let response = result.map_err(|e| RenderError {
        backend: backend.name.clone(),
        kind: RenderErrorKind::Http(e.to_string()),
    })?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(RenderError {
            backend: backend.name.clone(),
            kind: RenderErrorKind::Http(format!("HTTP {status}: {error_body}")),
        });
    }

    let data = body.read_to_vec().map_err(|e| RenderError {
        backend: backend.name.clone(),
        kind: RenderErrorKind::Io(e.to_string()),
    })?;

    if data.is_empty() {
        return Err(RenderError {
            backend: backend.name.clone(),
            kind: RenderErrorKind::EmptyBody,
        });
    }

    Ok(data)
}
