//! Target URL validation.
//!
//! Pure, synchronous checks on the caller-supplied target before any network
//! call. No DNS resolution and no connection attempt happen here; reachability
//! is the engine's problem.

use url::{Host, Url};

use crate::proxy::error::ProxyError;

/// Validate the raw `url` parameter into an absolute target URL.
///
/// Absence and emptiness are reported as [`ProxyError::MissingTarget`],
/// unparseable input as [`ProxyError::MalformedTarget`], and any scheme other
/// than `http`/`https` as [`ProxyError::DisallowedScheme`]. With
/// `deny_loopback` set, literal loopback/private addresses and `localhost`
/// are rejected as [`ProxyError::DeniedTarget`].
pub fn validate(raw: Option<&str>, deny_loopback: bool) -> Result<Url, ProxyError> {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return Err(ProxyError::MissingTarget),
    };

    let url = Url::parse(raw).map_err(|_| ProxyError::MalformedTarget)?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(ProxyError::DisallowedScheme),
    }

    if deny_loopback && is_internal_host(url.host()) {
        return Err(ProxyError::DeniedTarget);
    }

    Ok(url)
}

/// Literal-address check only; hostnames other than `localhost` pass even if
/// they resolve to internal addresses.
fn is_internal_host(host: Option<Host<&str>>) -> bool {
    match host {
        Some(Host::Ipv4(ip)) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
        }
        Some(Host::Ipv6(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Some(Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
        None => false,
    }
}
