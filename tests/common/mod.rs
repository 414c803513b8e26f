//! Shared utilities for transport integration tests.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use openstack_transport::transport::BoxError;
use openstack_transport::{Logger, RoundTripper};

/// Start a mock backend that answers every connection with a fixed response.
#[allow(dead_code)]
pub async fn start_mock_backend(content_type: &'static str, response: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (200, content_type, response.to_string()) }).await
}

/// Start a programmable mock backend; returns its bound address.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, &'static str, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 64 * 1024];
                        let _ = socket.read(&mut buf).await;

                        let (status, content_type, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: {}\r\nX-Subject-Token: gAAAAsecret\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            content_type,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A logger that records every line.
#[allow(dead_code)]
pub fn capture_logger() -> (Arc<dyn Logger>, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let logger: Arc<dyn Logger> =
        Arc::new(move |args: fmt::Arguments<'_>| sink.lock().unwrap().push(args.to_string()));
    (logger, lines)
}

/// What a [`Scripted`] transport received on one attempt.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Seen {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Fails the first `failures` attempts with no response, then answers with `respond`.
#[allow(dead_code)]
pub struct Scripted {
    failures: usize,
    respond: Box<dyn Fn() -> Response<Body> + Send + Sync>,
    attempts: AtomicUsize,
    seen: Mutex<Vec<Seen>>,
}

#[allow(dead_code)]
impl Scripted {
    pub fn new<F>(failures: usize, respond: F) -> Arc<Self>
    where
        F: Fn() -> Response<Body> + Send + Sync + 'static,
    {
        Arc::new(Self {
            failures,
            respond: Box::new(respond),
            attempts: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(0, || Response::new(Body::empty()))
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

impl Scripted {
    async fn answer(&self, request: Request<Body>) -> Result<Response<Body>, BoxError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;
        self.seen.lock().unwrap().push(Seen {
            headers: parts.headers,
            body,
        });

        if attempt < self.failures {
            return Err(format!("connection refused (attempt {})", attempt + 1).into());
        }
        Ok((self.respond)())
    }
}

impl RoundTripper for Scripted {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, BoxError>> {
        self.answer(request).boxed()
    }
}
