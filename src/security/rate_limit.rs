//! Rate limiting middleware.
//!
//! Fixed window per caller IP: up to `max_requests` within `window_secs`,
//! then 429 until the window rolls over. The forwarding core is never
//! invoked for a rejected caller; this middleware is the accept/reject
//! collaborator the core consults implicitly by running behind it.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::RateLimitConfig;

struct Window {
    started: Instant,
    count: u32,
}

/// State for the fixed-window rate limiter.
pub struct RateLimiterState {
    windows: Mutex<HashMap<IpAddr, Window>>,
    config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Record one request for `key` and decide accept/reject.
    pub fn check(&self, key: IpAddr) -> bool {
        if !self.config.enabled {
            return true;
        }
        let window = Duration::from_secs(self.config.window_secs);
        let now = Instant::now();

        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        // Opportunistic pruning keeps the map from accumulating one entry
        // per client ever seen.
        if windows.len() > 1024 {
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < self.config.max_requests {
            entry.count += 1;
            true
        } else {
            false
        }
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.check(addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %addr.ip(), "rate limit exceeded");
        let mut response = Response::new(Body::from(
            "Too many requests, please try again later.",
        ));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}
