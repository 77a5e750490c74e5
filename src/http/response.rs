//! Response relay to the caller.
//!
//! Turns an [`UpstreamResult`] into the caller-facing response: status copied
//! verbatim, policy-filtered headers installed wholesale, body either written
//! in one piece (buffered) or forwarded chunk by chunk (streaming). Once a
//! streaming body has started, a mid-stream failure terminates the connection
//! as a truncated transfer; it is never downgraded to a clean status.

use axum::body::Body;
use axum::response::Response;

use crate::proxy::{RelayBody, UpstreamResult};

/// Write an upstream result as the caller's response.
pub fn relay_response(result: UpstreamResult) -> Response {
    let mut response = match result.body {
        RelayBody::Buffered(bytes) => Response::new(Body::from(bytes)),
        RelayBody::Stream(stream) => Response::new(Body::from_stream(stream)),
    };
    *response.status_mut() = result.status;
    *response.headers_mut() = result.headers;
    response
}
