//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use netpulse::observability::MetricsSink;
use netpulse::{FailureReason, ProbeOutcome, Target};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is called once per connection and returns the status to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = u16> + Send + 'static,
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
                        let mut buf = [0u8; 2048];
                        let _ = socket.read(&mut buf).await;
                        let status = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend answering `status` after `delay`.
pub async fn start_delayed_backend(status: u16, delay: Duration) -> SocketAddr {
    start_programmable_backend(move || async move {
        tokio::time::sleep(delay).await;
        status
    })
    .await
}

pub fn target(url: &str, interval: Duration) -> Target {
    Target::parse(url, interval).unwrap()
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub in_flight: i64,
    pub peak_in_flight: i64,
    pub requests: HashMap<String, u64>,
    pub errors: HashMap<FailureReason, u64>,
    pub outcomes: Vec<ProbeOutcome>,
    pub peak_per_target: HashMap<String, i64>,
    active_per_target: HashMap<String, i64>,
}

impl Recorded {
    pub fn total_requests(&self) -> u64 {
        self.requests.values().sum()
    }
}

/// In-memory [`MetricsSink`] that also tracks concurrency peaks.
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<Recorded>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

impl MetricsSink for RecordingSink {
    fn inc_in_flight(&self) {
        let mut state = self.state.lock().unwrap();
        state.in_flight += 1;
        state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
    }

    fn dec_in_flight(&self) {
        self.state.lock().unwrap().in_flight -= 1;
    }

    fn record_request(&self, target: &Target) {
        let mut state = self.state.lock().unwrap();
        let label = target.label().to_string();
        *state.requests.entry(label.clone()).or_default() += 1;

        let active = state.active_per_target.entry(label.clone()).or_default();
        *active += 1;
        let active = *active;
        let peak = state.peak_per_target.entry(label).or_default();
        *peak = (*peak).max(active);
    }

    fn observe(&self, outcome: &ProbeOutcome) {
        let mut state = self.state.lock().unwrap();
        if let Some(active) = state.active_per_target.get_mut(outcome.target()) {
            *active -= 1;
        }
        if !outcome.is_success() {
            *state.errors.entry(outcome.reason()).or_default() += 1;
        }
        state.outcomes.push(outcome.clone());
    }
}
