//! Convenience search redirect.
//!
//! Pure string construction around the proxy path: builds a search-engine URL
//! from the free-text query and redirects to `/proxy` with that URL encoded
//! as the `url` parameter. No core logic lives here.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use url::form_urlencoded;
use url::Url;

use crate::http::server::AppState;

#[derive(Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
}

/// Build the search-engine URL for a free-text query.
pub fn build_search_url(base_url: &str, query: &str) -> Option<String> {
    let mut url = Url::parse(base_url).ok()?;
    url.query_pairs_mut().append_pair("q", query);
    Some(url.to_string())
}

/// Build the proxy-path redirect target carrying the search URL.
pub fn build_redirect_target(search_url: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(search_url.as_bytes()).collect();
    format!("/proxy?url={}", encoded)
}

pub(crate) async fn search_redirect(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let target = match params.q.as_deref() {
        Some(q) if !q.is_empty() => match build_search_url(&state.search.base_url, q) {
            Some(search_url) => build_redirect_target(&search_url),
            None => "/".to_string(),
        },
        _ => "/".to_string(),
    };

    tracing::debug!(target = %target, "search redirect");
    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}
