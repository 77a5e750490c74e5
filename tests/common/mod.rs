//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use relay_proxy::config::ProxyConfig;
use relay_proxy::HttpServer;

/// One request as the upstream saw it on the wire.
pub struct CapturedRequest {
    /// Request line and headers, up to the blank line.
    pub head: String,
    /// Raw bytes after the head (chunked framing included, if any).
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl CapturedRequest {
    /// Case-insensitive header lookup in the captured head.
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head.lines().skip(1).find_map(|line| {
            line.to_ascii_lowercase()
                .starts_with(&prefix)
                .then(|| line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string())
        })
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn body_contains(&self, needle: &[u8]) -> bool {
        self.body
            .windows(needle.len().max(1))
            .any(|window| window == needle)
    }
}

/// A scripted upstream: counts hits, records requests, answers with a fixed
/// response.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicU32>,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    let head_end = loop {
        match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => {
                if buf.is_empty() {
                    return None;
                }
                break buf.len();
            }
            Ok(n) => {
                buf.extend_from_slice(&tmp[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos;
                }
            }
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut body: Vec<u8> = buf.get(head_end + 4..).unwrap_or(&[]).to_vec();

    let content_length: usize = head
        .lines()
        .skip(1)
        .find_map(|line| {
            let lower = line.to_ascii_lowercase();
            lower
                .strip_prefix("content-length:")
                .and_then(|v| v.trim().parse().ok())
        })
        .unwrap_or(0);
    let chunked = head.to_ascii_lowercase().contains("transfer-encoding: chunked");

    if chunked {
        // Read until the terminating zero-size chunk; keep framing raw.
        while !body.windows(5).any(|w| w == b"0\r\n\r\n") {
            match socket.read(&mut tmp).await {
                Ok(0) | Err(_) => break,
                Ok(n) => body.extend_from_slice(&tmp[..n]),
            }
        }
    } else {
        while body.len() < content_length {
            match socket.read(&mut tmp).await {
                Ok(0) | Err(_) => break,
                Ok(n) => body.extend_from_slice(&tmp[..n]),
            }
        }
    }

    Some(CapturedRequest { head, body })
}

/// Start a recording upstream that answers every request with the given
/// status, extra headers and body.
pub async fn start_upstream(
    status: u16,
    headers: &'static [(&'static str, &'static str)],
    body: &'static [u8],
) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let hits_counter = hits.clone();
    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    hits_counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            recorded.lock().unwrap().push(request);
                        }
                        let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason(status));
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        ));
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream {
        addr,
        hits,
        requests,
    }
}

/// Start an upstream that answers with a chunked-encoded body.
#[allow(dead_code)]
pub async fn start_chunked_upstream(body: &'static [u8]) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let hits_counter = hits.clone();
    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    hits_counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            recorded.lock().unwrap().push(request);
                        }
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(body).await;
                        let _ = socket.write_all(b"\r\n0\r\n\r\n").await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream {
        addr,
        hits,
        requests,
    }
}

/// Start an upstream that accepts connections and drops them without
/// answering.
#[allow(dead_code)]
pub async fn start_resetting_upstream() -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));

    let hits_counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    hits_counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    drop(socket);
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}

/// Start an upstream that accepts, reads the request, then stalls forever.
#[allow(dead_code)]
pub async fn start_stalling_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        std::future::pending::<()>().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Reserve an address with nothing listening on it.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A config suitable for focused tests: collaborators that would interfere
/// (rate limiting, static serving) are off unless a test opts back in.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.rate_limit.enabled = false;
    config.static_files.enabled = false;
    config
}

/// Spawn the proxy on an ephemeral port and return its address.
pub async fn spawn_proxy(config: ProxyConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(server.run_with_shutdown(listener, std::future::pending()));
    addr
}

/// A client that talks to the proxy directly: no env proxies, no redirect
/// following, no connection reuse between tests.
#[allow(dead_code)]
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
