//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Forwarding engine settings (relay mode, header policy, limits).
    pub forwarding: ForwardingConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Static frontend serving.
    pub static_files: StaticFilesConfig,

    /// Search redirect settings.
    pub search: SearchConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// How the upstream response body is relayed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// Forward bytes to the caller as they arrive from upstream. A failure
    /// after the first byte has been sent can only abort the connection.
    #[default]
    Streaming,

    /// Read the full upstream body into memory before sending anything.
    /// Allows clean error reporting at the cost of memory and latency.
    Buffered,
}

/// Which inbound request headers are forwarded to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestHeaderMode {
    /// Forward everything except `cookie`, `host`, and hop-by-hop headers.
    #[default]
    Passthrough,

    /// Forward only `user-agent` (empty string when absent). Isolation mode:
    /// `authorization`, `accept`, and everything else stay with the caller.
    Minimal,
}

/// Forwarding engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Body relay strategy.
    pub relay_mode: RelayMode,

    /// Request header forwarding policy.
    pub request_headers: RequestHeaderMode,

    /// Overwrite CORS response headers with permissive values and drop
    /// `content-security-policy` so proxied content renders under the
    /// caller's origin. Also answers `OPTIONS` preflight locally.
    pub cors_override: bool,

    /// Deadline for the whole upstream exchange in seconds. 0 disables.
    pub upstream_timeout_secs: u64,

    /// Maximum upstream body size accepted in buffered mode, in bytes.
    /// 0 means unlimited.
    pub max_buffered_body_bytes: usize,

    /// Reject targets whose host is a literal loopback/private IP or
    /// `localhost`. Hostnames resolving to internal addresses are NOT
    /// caught: validation never touches DNS.
    pub deny_loopback_targets: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            relay_mode: RelayMode::default(),
            request_headers: RequestHeaderMode::default(),
            cors_override: true,
            upstream_timeout_secs: 30,
            max_buffered_body_bytes: 10 * 1024 * 1024,
            deny_loopback_targets: false,
        }
    }
}

/// Rate limiting configuration (fixed window per caller IP).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per caller within one window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// Static frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve static files for paths no route claims.
    pub enabled: bool,

    /// Directory to serve from.
    pub dir: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "public".to_string(),
        }
    }
}

/// Search redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search engine endpoint the query is appended to as `q`.
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add baseline security headers to every response.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
