//! The request-forwarding engine.
//!
//! Builds the outbound request (method, filtered headers, body), issues it to
//! the upstream exactly once, and hands back the status, filtered headers and
//! body as an explicit [`UpstreamResult`]. No retries: idempotency of the
//! original method is unknown to the proxy, so failures surface immediately.
//!
//! Cancellation contract: the streaming body is a plain byte-chunk stream
//! owned by the caller's response. When the caller disconnects, the response
//! body is dropped, which drops the upstream stream and releases the upstream
//! connection.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use url::Url;

use crate::config::{ForwardingConfig, RelayMode};
use crate::proxy::error::ProxyError;
use crate::proxy::headers;

/// One inbound call, already validated. Never outlives its request.
pub struct ProxyRequest {
    /// Inbound method, mirrored verbatim on the outbound call.
    pub method: Method,
    /// Validated absolute target URL (scheme is http or https).
    pub target: Url,
    /// Inbound headers, before policy filtering.
    pub headers: HeaderMap,
    /// Inbound body. Dropped for GET/HEAD regardless of presence.
    pub body: Option<reqwest::Body>,
}

/// The upstream body in the form the configured relay mode produced.
pub enum RelayBody {
    /// Fully materialized (buffered mode).
    Buffered(Bytes),
    /// Incremental chunks (streaming mode). A mid-stream error after the
    /// response has been committed aborts the connection; it cannot be
    /// converted into a clean error response.
    Stream(BoxStream<'static, Result<Bytes, reqwest::Error>>),
}

/// What the engine relays back to the caller. Consumed exactly once.
pub struct UpstreamResult {
    /// Upstream status, copied verbatim.
    pub status: StatusCode,
    /// Upstream headers after response-direction policy filtering.
    pub headers: HeaderMap,
    /// Upstream body per the configured relay mode.
    pub body: RelayBody,
}

/// Single-attempt relay to arbitrary http/https upstreams.
pub struct ForwardingEngine {
    client: reqwest::Client,
    config: ForwardingConfig,
}

impl ForwardingEngine {
    /// Build the engine and its HTTP client from config. The upstream
    /// deadline, when set, is installed at the client level and bounds the
    /// whole exchange including the body read.
    pub fn new(config: ForwardingConfig) -> Result<Self, reqwest::Error> {
        // Redirects are relayed verbatim, never followed on the caller's
        // behalf.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if config.upstream_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.upstream_timeout_secs));
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Forward one request and produce the relayable result.
    pub async fn forward(&self, request: ProxyRequest) -> Result<UpstreamResult, ProxyError> {
        let outbound_headers =
            headers::filter_request_headers(self.config.request_headers, &request.headers);

        let mut outbound = self
            .client
            .request(request.method.clone(), request.target.clone())
            .headers(outbound_headers);

        // GET and HEAD are bodiless on the wire no matter what arrived.
        if request.method != Method::GET && request.method != Method::HEAD {
            if let Some(body) = request.body {
                outbound = outbound.body(body);
            }
        }

        let response = outbound.send().await.map_err(ProxyError::from_upstream)?;

        let status = response.status();
        let relayed_headers =
            headers::filter_response_headers(self.config.cors_override, response.headers());

        let body = match self.config.relay_mode {
            RelayMode::Streaming => RelayBody::Stream(response.bytes_stream().boxed()),
            RelayMode::Buffered => {
                let bytes = self.read_buffered(response).await?;
                tracing::debug!(bytes = bytes.len(), "buffered upstream body");
                RelayBody::Buffered(bytes)
            }
        };

        Ok(UpstreamResult {
            status,
            headers: relayed_headers,
            body,
        })
    }

    /// Materialize the whole upstream body, enforcing the configured cap both
    /// up front (from Content-Length) and while accumulating.
    async fn read_buffered(&self, response: reqwest::Response) -> Result<Bytes, ProxyError> {
        let limit = self.config.max_buffered_body_bytes;

        if limit > 0 {
            if let Some(declared) = response.content_length() {
                if declared > limit as u64 {
                    return Err(ProxyError::BodyTooLarge { limit });
                }
            }
        }

        let mut buf: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ProxyError::from_upstream)?;
            if limit > 0 && buf.len() + chunk.len() > limit {
                return Err(ProxyError::BodyTooLarge { limit });
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(buf))
    }
}
