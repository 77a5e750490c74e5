//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router (`/proxy`, `/search`, static fallback)
//! - Wire up middleware (tracing, security headers, rate limiting)
//! - Dispatch `/proxy` calls through validator and forwarding engine
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::schema::SearchConfig;
use crate::config::{ForwardingConfig, ProxyConfig};
use crate::http::response::relay_response;
use crate::http::search::search_redirect;
use crate::proxy::{headers, validate, ForwardingEngine, ProxyRequest};
use crate::security::headers::security_headers_middleware;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) engine: Arc<ForwardingEngine>,
    pub(crate) forwarding: ForwardingConfig,
    pub(crate) search: SearchConfig,
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let engine = Arc::new(ForwardingEngine::new(config.forwarding.clone())?);
        let limiter = Arc::new(RateLimiterState::new(config.rate_limit.clone()));

        let state = AppState {
            engine,
            forwarding: config.forwarding.clone(),
            search: config.search.clone(),
        };

        let router = Self::build_router(&config, state, limiter);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &ProxyConfig,
        state: AppState,
        limiter: Arc<RateLimiterState>,
    ) -> Router {
        let mut router = Router::new()
            .route("/proxy", any(proxy_handler))
            .route("/search", get(search_redirect))
            .with_state(state);

        if config.static_files.enabled {
            router = router.fallback_service(ServeDir::new(&config.static_files.dir));
        }

        // Rejections from the limiter short-circuit before the handler, so
        // the forwarding core never runs for rate-limited callers.
        router = router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));

        if config.security.enable_headers {
            router = router.layer(middleware::from_fn(security_headers_middleware));
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server until ctrl-c, accepting connections on the listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_with_shutdown(listener, shutdown_signal()).await
    }

    /// Run the server until the given future resolves.
    pub async fn run_with_shutdown(
        self,
        listener: TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

#[derive(Deserialize)]
pub(crate) struct ProxyParams {
    url: Option<String>,
}

/// Main proxy handler: validate the target, forward, relay.
async fn proxy_handler(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();

    // Preflight is answered locally under CORS override; it never reaches
    // the upstream.
    if state.forwarding.cors_override && method == Method::OPTIONS {
        return preflight_response();
    }

    let target = match validate(
        params.url.as_deref(),
        state.forwarding.deny_loopback_targets,
    ) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "rejected proxy target");
            return e.into_response();
        }
    };

    tracing::debug!(method = %method, target = %target, "proxying request");

    let (parts, body) = request.into_parts();
    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        // Forwarded opaquely, without materializing it here.
        Some(reqwest::Body::wrap_stream(body.into_data_stream()))
    };

    let proxy_request = ProxyRequest {
        method,
        target,
        headers: parts.headers,
        body,
    };

    match state.engine.forward(proxy_request).await {
        Ok(result) => relay_response(result),
        Err(e) => {
            tracing::error!(error = %e, "proxy request failed");
            e.into_response()
        }
    }
}

/// Local answer to an `OPTIONS` preflight: 204 with the override header set.
fn preflight_response() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let response_headers = response.headers_mut();
    for (name, value) in headers::cors_override_headers() {
        response_headers.insert(name, value);
    }
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
