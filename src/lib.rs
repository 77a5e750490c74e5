//! URL-rewriting forward proxy library.
//!
//! Accepts requests naming an arbitrary upstream URL, forwards a sanitized
//! version to the upstream, and relays the response back with a header
//! rewriting policy applied. See the `proxy` module for the core and `http`
//! for the server wiring around it.

pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use proxy::ProxyError;
