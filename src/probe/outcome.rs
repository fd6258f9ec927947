//! Probe results and the closed failure taxonomy.

use std::sync::Arc;
use std::time::Duration;

/// Coarse result category of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    Success,
    TransportError,
    HttpError,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Success => "success",
            ProbeStatus::TransportError => "transport_error",
            ProbeStatus::HttpError => "http_error",
        }
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason code attached to every outcome. `None` is reserved for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    None,
    ContextCanceled,
    ContextDeadline,
    DnsNotFound,
    DnsTimeout,
    DnsError,
    TlsHostnameMismatch,
    TlsUntrustedCa,
    TlsCertInvalid,
    Timeout,
    ConnectionRefused,
    NetworkError,
    Http4xx,
    Http5xx,
    Unknown,
}

impl FailureReason {
    pub const ALL: [FailureReason; 15] = [
        FailureReason::None,
        FailureReason::ContextCanceled,
        FailureReason::ContextDeadline,
        FailureReason::DnsNotFound,
        FailureReason::DnsTimeout,
        FailureReason::DnsError,
        FailureReason::TlsHostnameMismatch,
        FailureReason::TlsUntrustedCa,
        FailureReason::TlsCertInvalid,
        FailureReason::Timeout,
        FailureReason::ConnectionRefused,
        FailureReason::NetworkError,
        FailureReason::Http4xx,
        FailureReason::Http5xx,
        FailureReason::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::None => "none",
            FailureReason::ContextCanceled => "context_canceled",
            FailureReason::ContextDeadline => "context_deadline",
            FailureReason::DnsNotFound => "dns_not_found",
            FailureReason::DnsTimeout => "dns_timeout",
            FailureReason::DnsError => "dns_error",
            FailureReason::TlsHostnameMismatch => "tls_hostname_mismatch",
            FailureReason::TlsUntrustedCa => "tls_untrusted_ca",
            FailureReason::TlsCertInvalid => "tls_cert_invalid",
            FailureReason::Timeout => "timeout",
            FailureReason::ConnectionRefused => "connection_refused",
            FailureReason::NetworkError => "network_error",
            FailureReason::Http4xx => "http_4xx",
            FailureReason::Http5xx => "http_5xx",
            FailureReason::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one executed probe.
///
/// Built only through [`ProbeOutcome::from_response`] and
/// [`ProbeOutcome::from_transport_error`], which keep the status and reason
/// consistent: `FailureReason::None` if and only if `ProbeStatus::Success`.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    target: Arc<str>,
    status: ProbeStatus,
    reason: FailureReason,
    duration: Duration,
    http_status: Option<u16>,
    error: Option<String>,
}

impl ProbeOutcome {
    /// Outcome for a probe that received an HTTP response.
    pub fn from_response(target: &str, http_status: u16, duration: Duration) -> Self {
        let reason = super::classifier::classify_status(http_status);
        let status = if reason == FailureReason::None {
            ProbeStatus::Success
        } else {
            ProbeStatus::HttpError
        };
        Self {
            target: Arc::from(target),
            status,
            reason,
            duration,
            http_status: Some(http_status),
            error: None,
        }
    }

    /// Outcome for a probe that failed before a response arrived.
    pub fn from_transport_error(
        target: &str,
        error: &(dyn std::error::Error + 'static),
        duration: Duration,
    ) -> Self {
        Self {
            target: Arc::from(target),
            status: ProbeStatus::TransportError,
            reason: super::classifier::classify_transport(error),
            duration,
            http_status: None,
            error: Some(render_chain(error)),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Success
    }
}

/// `outer: inner: innermost`, skipping messages repeated by transparent wrappers.
fn render_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        let msg = cause.to_string();
        if !rendered.ends_with(&msg) {
            rendered.push_str(": ");
            rendered.push_str(&msg);
        }
        current = cause.source();
    }
    rendered
}
