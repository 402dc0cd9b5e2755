//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use insult_service::config::{EndpointConfig, ServiceConfig};
use insult_service::http::HttpServer;
use insult_service::lifecycle::Shutdown;
use insult_service::service::InsultService;

/// Start a programmable mock backend. `f` decides status and body per request.
pub async fn start_programmable_backend<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        let (status, body) = f().await;
                        write_response(&mut socket, status_line(status), &body).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock backend that forwards every request body to the returned channel.
pub async fn start_recording_backend(addr: SocketAddr, status: u16) -> mpsc::UnboundedReceiver<String> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let body = read_request(&mut socket).await;
                        let _ = tx.send(body);
                        write_response(&mut socket, status_line(status), "").await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}

/// Start a mock backend answering every request with a fixed status line,
/// e.g. `"503 Down For Maintenance"`.
pub async fn start_status_line_backend(addr: SocketAddr, status_line: &'static str, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                write_response(&mut socket, status_line, body).await;
            });
        }
    });
}

/// Run the service on `addr` against the given config. Trigger the returned
/// handle to stop it.
pub async fn start_service(addr: SocketAddr, mut config: ServiceConfig) -> Shutdown {
    config.listener.bind_address = addr.to_string();
    let service = InsultService::from_config(&config).unwrap();
    let server = HttpServer::new(config, service);
    let listener = TcpListener::bind(addr).await.unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

/// Config pointing both dependencies at local mock backends.
pub fn local_config(noun: SocketAddr, adjective: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.noun = EndpointConfig::new("127.0.0.1", noun.port());
    config.adjective = EndpointConfig::new("127.0.0.1", adjective.port());
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::new(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let end = buf.len().min(header_end + content_length);
    String::from_utf8_lossy(&buf[header_end..end]).into_owned()
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        202 => "202 Accepted",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

async fn write_response(socket: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
