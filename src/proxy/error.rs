//! Error taxonomy for the forwarding core.
//!
//! Every failure path maps to exactly one variant, and every variant knows
//! its client-facing status and body shape. Validator errors are clean 4xx
//! responses produced before any network I/O; engine errors are clean 5xx
//! only while no response bytes have reached the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Terminal per-request failure. Once raised, no further forwarding is
/// attempted for that request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The `url` query parameter was absent or empty.
    #[error("Missing `url` parameter")]
    MissingTarget,

    /// The target did not parse as an absolute URL.
    #[error("Malformed URL.")]
    MalformedTarget,

    /// The target parsed but its scheme is not `http` or `https`.
    #[error("Invalid URL scheme.")]
    DisallowedScheme,

    /// The target host is a literal internal address and the
    /// `deny_loopback_targets` knob is on.
    #[error("Target address not allowed.")]
    DeniedTarget,

    /// The upstream could not be reached (connection refused, DNS or TLS
    /// failure).
    #[error("upstream unreachable: {source}")]
    UpstreamUnreachable {
        #[source]
        source: reqwest::Error,
    },

    /// The upstream exchange exceeded the configured deadline.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// The upstream was reached but the transfer failed before completion.
    #[error("transfer failed: {source}")]
    TransferFailed {
        #[source]
        source: reqwest::Error,
    },

    /// Buffered mode refused to materialize a body over the configured cap.
    #[error("upstream response exceeds buffer limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl ProxyError {
    /// Client-facing status code for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingTarget
            | ProxyError::MalformedTarget
            | ProxyError::DisallowedScheme
            | ProxyError::DeniedTarget => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnreachable { .. }
            | ProxyError::UpstreamTimeout
            | ProxyError::TransferFailed { .. }
            | ProxyError::BodyTooLarge { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a reqwest send/read failure.
    pub(crate) fn from_upstream(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProxyError::UpstreamTimeout
        } else if source.is_connect() {
            ProxyError::UpstreamUnreachable { source }
        } else {
            ProxyError::TransferFailed { source }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Malformed-target rejections are plain text, matching the
            // listener-facing contract; the missing-parameter case and all
            // engine failures report as {"error": ...} JSON.
            ProxyError::MalformedTarget
            | ProxyError::DisallowedScheme
            | ProxyError::DeniedTarget => (status, self.to_string()).into_response(),
            _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}
