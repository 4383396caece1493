//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use storage_request_log::{LogSink, Severity};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Which channel a record was emitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Filtered,
    Forced,
}

#[derive(Debug, Clone)]
pub struct Record {
    pub channel: Channel,
    pub severity: Severity,
    pub message: String,
}

/// `LogSink` that keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// `None` rejects every severity on the filtered channel.
    min_severity: Option<Severity>,
    records: Mutex<Vec<Record>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn accepting(min_severity: Severity) -> Arc<Self> {
        Arc::new(Self {
            min_severity: Some(min_severity),
            records: Mutex::new(Vec::new()),
        })
    }

    pub fn rejecting_all() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn on(&self, channel: Channel) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.channel == channel)
            .collect()
    }

    fn push(&self, channel: Channel, severity: Severity, message: &str) {
        self.records.lock().unwrap().push(Record {
            channel,
            severity,
            message: message.to_string(),
        });
    }
}

impl LogSink for RecordingSink {
    fn should_log(&self, severity: Severity) -> bool {
        self.min_severity.map(|min| severity >= min).unwrap_or(false)
    }

    fn log(&self, severity: Severity, message: &str) {
        self.push(Channel::Filtered, severity, message);
    }

    fn force_log(&self, severity: Severity, message: &str) {
        self.push(Channel::Forced, severity, message);
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is called once per connection and returns the status code and body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                // Read the request head before answering.
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    403 => "403 Forbidden",
                    409 => "409 Conflict",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response_str = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response_str.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
