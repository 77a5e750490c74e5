//! Header inclusion/exclusion policy.
//!
//! Pure per-header decisions for both directions. The request path controls
//! what the upstream learns about the caller; the response path keeps the
//! proxy's own transport framing independent of the upstream's and, when CORS
//! override is on, forces permissive CORS headers so proxied content renders
//! under the caller's origin.

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY,
    TRANSFER_ENCODING, USER_AGENT,
};

use crate::config::RequestHeaderMode;

/// Value forced into `access-control-allow-origin` under CORS override.
pub const CORS_ALLOW_ORIGIN: &str = "*";
/// The proxy's own supported method list.
pub const CORS_ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
/// Fixed request-header allow-list advertised to browsers.
pub const CORS_ALLOW_HEADERS: &str =
    "Origin, X-Requested-With, Content-Type, Accept, Authorization";

/// The CORS header set written under override mode, shared by the response
/// policy and the local preflight answer.
pub fn cors_override_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ),
        (
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ),
    ]
}

/// Headers never forwarded upstream in passthrough mode: `cookie` (privacy),
/// `host` (the client sets it per target), hop-by-hop headers,
/// `content-length` (recomputed for the outbound framing) and
/// `accept-encoding` (the proxy does not transcode; the upstream negotiates
/// with the client library directly).
const REQUEST_DROPPED: &[&str] = &[
    "cookie",
    "host",
    "connection",
    "proxy-connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "content-length",
    "accept-encoding",
];

fn request_header_dropped(name: &HeaderName) -> bool {
    REQUEST_DROPPED.contains(&name.as_str())
}

/// Apply the request-direction policy to the inbound header set.
pub fn filter_request_headers(mode: RequestHeaderMode, inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::new();
    match mode {
        RequestHeaderMode::Minimal => {
            // Only user-agent crosses, substituting empty when absent.
            let user_agent = inbound
                .get(USER_AGENT)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(""));
            outbound.insert(USER_AGENT, user_agent);
        }
        RequestHeaderMode::Passthrough => {
            for (name, value) in inbound.iter() {
                if request_header_dropped(name) {
                    continue;
                }
                outbound.append(name.clone(), value.clone());
            }
        }
    }
    outbound
}

/// Apply the response-direction policy to the upstream header set.
///
/// `transfer-encoding` is dropped unconditionally: the proxy's own transport
/// recomputes framing. Under CORS override the three `access-control-allow-*`
/// headers are force-set and `content-security-policy` is deleted.
pub fn filter_response_headers(cors_override: bool, upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::new();
    for (name, value) in upstream.iter() {
        if *name == TRANSFER_ENCODING {
            continue;
        }
        if cors_override
            && (*name == ACCESS_CONTROL_ALLOW_ORIGIN
                || *name == ACCESS_CONTROL_ALLOW_METHODS
                || *name == ACCESS_CONTROL_ALLOW_HEADERS
                || *name == CONTENT_SECURITY_POLICY)
        {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }
    if cors_override {
        for (name, value) in cors_override_headers() {
            relayed.insert(name, value);
        }
    }
    relayed
}
