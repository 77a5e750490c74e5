//! Baseline security response headers.
//!
//! Applied outside the forwarding core; the core relays upstream headers and
//! must not disturb this set, so the middleware only fills in headers the
//! response does not already carry. The baseline deliberately excludes
//! `content-security-policy` and `x-frame-options`, which would block
//! rendering of proxied content under the caller's origin.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const BASELINE: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
];

/// Middleware adding the security-header baseline to every response.
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in BASELINE.iter().copied() {
        if !headers.contains_key(name) {
            headers.insert(
                axum::http::header::HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }
    response
}
