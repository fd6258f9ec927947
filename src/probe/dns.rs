//! Name resolution for probes.
//!
//! reqwest resolves through [`SystemResolver`] so that lookup failures reach
//! the classifier as a typed [`DnsError`] instead of an opaque message.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use thiserror::Error;
use tokio::time;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsErrorKind {
    NotFound,
    Timeout,
    Other,
}

impl std::fmt::Display for DnsErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DnsErrorKind::NotFound => f.write_str("no such host"),
            DnsErrorKind::Timeout => f.write_str("lookup timed out"),
            DnsErrorKind::Other => f.write_str("lookup failed"),
        }
    }
}

/// A failed lookup of `host`.
#[derive(Debug, Error)]
#[error("dns lookup for {host}: {kind}")]
pub struct DnsError {
    host: String,
    kind: DnsErrorKind,
    #[source]
    source: Option<io::Error>,
}

impl DnsError {
    pub fn new(host: impl Into<String>, kind: DnsErrorKind) -> Self {
        Self {
            host: host.into(),
            kind,
            source: None,
        }
    }

    /// Classify a resolver error by its kind, then by the getaddrinfo message.
    pub fn from_io(host: impl Into<String>, err: io::Error) -> Self {
        let kind = if err.kind() == io::ErrorKind::TimedOut {
            DnsErrorKind::Timeout
        } else {
            let msg = err.to_string().to_ascii_lowercase();
            if NOT_FOUND_MESSAGES.iter().any(|m| msg.contains(m)) {
                DnsErrorKind::NotFound
            } else if TIMEOUT_MESSAGES.iter().any(|m| msg.contains(m)) {
                DnsErrorKind::Timeout
            } else {
                DnsErrorKind::Other
            }
        };
        Self {
            host: host.into(),
            kind,
            source: Some(err),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn kind(&self) -> DnsErrorKind {
        self.kind
    }
}

// EAI_NONAME / EAI_NODATA on glibc, musl, macOS and Windows.
const NOT_FOUND_MESSAGES: &[&str] = &[
    "name or service not known",
    "nodename nor servname provided",
    "no address associated with hostname",
    "no such host is known",
    "name does not resolve",
];

// EAI_AGAIN: the resolver gave up waiting for an answer.
const TIMEOUT_MESSAGES: &[&str] = &["temporary failure in name resolution"];

/// Resolver backed by the operating system, bounded by a deadline.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn lookup(&self, host: &str) -> Result<Vec<SocketAddr>, DnsError> {
        lookup_within(host, self.timeout, tokio::net::lookup_host((host, 0))).await
    }
}

/// Await `lookup` for at most `timeout`, mapping its result onto [`DnsError`].
///
/// An expired deadline is [`DnsErrorKind::Timeout`] and an empty answer is
/// [`DnsErrorKind::NotFound`].
pub async fn lookup_within<F, I>(host: &str, timeout: Duration, lookup: F) -> Result<Vec<SocketAddr>, DnsError>
where
    F: Future<Output = io::Result<I>>,
    I: Iterator<Item = SocketAddr>,
{
    match time::timeout(timeout, lookup).await {
        Err(_) => Err(DnsError::new(host, DnsErrorKind::Timeout)),
        Ok(Err(e)) => Err(DnsError::from_io(host, e)),
        Ok(Ok(addrs)) => {
            let addrs: Vec<SocketAddr> = addrs.collect();
            if addrs.is_empty() {
                Err(DnsError::new(host, DnsErrorKind::NotFound))
            } else {
                Ok(addrs)
            }
        }
    }
}

impl Resolve for SystemResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs = resolver.lookup(name.as_str()).await?;
            tracing::trace!(host = name.as_str(), count = addrs.len(), "Resolved");
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<_, BoxError>(addrs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_not_found() {
        let err = io::Error::new(
            io::ErrorKind::Other,
            "failed to lookup address information: Name or service not known",
        );
        assert_eq!(DnsError::from_io("nope.invalid", err).kind(), DnsErrorKind::NotFound);
    }

    #[test]
    fn test_from_io_timeout() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        assert_eq!(DnsError::from_io("slow.example", err).kind(), DnsErrorKind::Timeout);

        let err = io::Error::new(
            io::ErrorKind::Other,
            "failed to lookup address information: Temporary failure in name resolution",
        );
        assert_eq!(DnsError::from_io("slow.example", err).kind(), DnsErrorKind::Timeout);
    }

    #[test]
    fn test_from_io_other() {
        let err = io::Error::new(io::ErrorKind::Other, "servfail");
        let dns = DnsError::from_io("broken.example", err);
        assert_eq!(dns.kind(), DnsErrorKind::Other);
        assert_eq!(dns.host(), "broken.example");
        assert_eq!(dns.to_string(), "dns lookup for broken.example: lookup failed");
    }

    #[test]
    fn test_from_io_retry_wording_is_not_timeout() {
        let err = io::Error::new(io::ErrorKind::Other, "upstream said: please try again later");
        assert_eq!(DnsError::from_io("flaky.example", err).kind(), DnsErrorKind::Other);
    }

    #[tokio::test]
    async fn test_lookup_within_deadline() {
        let stalled = async {
            time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::<SocketAddr>::new().into_iter())
        };
        let err = lookup_within("stalled.example", Duration::from_millis(50), stalled)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_lookup_within_empty_answer() {
        let empty = async { Ok(Vec::<SocketAddr>::new().into_iter()) };
        let err = lookup_within("empty.example", Duration::from_secs(1), empty)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_ip_literal() {
        let resolver = SystemResolver::new(Duration::from_secs(2));
        let addrs = resolver.lookup("127.0.0.1").await.unwrap();
        assert_eq!(addrs[0].ip().to_string(), "127.0.0.1");
    }
}
