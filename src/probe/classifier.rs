//! Failure classification.
//!
//! Maps one probe attempt to exactly one [`FailureReason`]. Transport errors
//! are matched against a fixed precedence list; each rule searches the whole
//! cause chain, so a specific cause buried under a generic wrapper still wins
//! over a generic rule that matches nearer the top.
//!
//! | Order | Cause anywhere in the chain          | Reason                  |
//! |-------|--------------------------------------|-------------------------|
//! | 1     | `ProbeError::Canceled`               | `context_canceled`      |
//! | 2     | deadline exceeded                    | `context_deadline`      |
//! | 3-5   | `DnsError` (not found/timeout/other) | `dns_*`                 |
//! | 6-8   | rustls invalid certificate           | `tls_*`                 |
//! | 9     | io `TimedOut`, reqwest timeout       | `timeout`               |
//! | 10    | io `ConnectionRefused`               | `connection_refused`    |
//! | 11    | other io, hyper or connect error     | `network_error`         |
//! | 12    | anything else                        | `unknown`               |

use std::error::Error;
use std::io;

use rustls::{CertificateError, OtherError};

use crate::probe::dns::{DnsError, DnsErrorKind};
use crate::probe::error::ProbeError;
use crate::probe::outcome::FailureReason;

type Rule = fn(&(dyn Error + 'static)) -> Option<FailureReason>;

const TRANSPORT_RULES: &[Rule] = &[
    canceled,
    deadline,
    dns,
    tls,
    timeout,
    connection_refused,
    network,
];

/// Classify a failure that happened before any HTTP response arrived.
pub fn classify_transport(err: &(dyn Error + 'static)) -> FailureReason {
    TRANSPORT_RULES
        .iter()
        .find_map(|rule| rule(err))
        .unwrap_or(FailureReason::Unknown)
}

/// Classify a received HTTP status code.
pub fn classify_status(status: u16) -> FailureReason {
    match status {
        400..=499 => FailureReason::Http4xx,
        500.. => FailureReason::Http5xx,
        _ => FailureReason::None,
    }
}

/// Walk `err` and its causes. `io::Error` hides its payload from `source()`,
/// so the payload is visited explicitly.
fn causes<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| next_cause(e))
}

fn next_cause<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
    match err.downcast_ref::<io::Error>().and_then(|io| io.get_ref()) {
        Some(inner) => Some(inner as &(dyn Error + 'static)),
        None => err.source(),
    }
}

fn find<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    causes(err).find_map(|e| e.downcast_ref::<T>())
}

fn io_kind(err: &(dyn Error + 'static), kind: io::ErrorKind) -> bool {
    causes(err)
        .filter_map(|e| e.downcast_ref::<io::Error>())
        .any(|e| e.kind() == kind)
}

fn canceled(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    causes(err)
        .any(|e| matches!(e.downcast_ref::<ProbeError>(), Some(ProbeError::Canceled)))
        .then_some(FailureReason::ContextCanceled)
}

fn deadline(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    causes(err)
        .any(|e| {
            matches!(e.downcast_ref::<ProbeError>(), Some(ProbeError::DeadlineExceeded(_)))
                || e.is::<tokio::time::error::Elapsed>()
        })
        .then_some(FailureReason::ContextDeadline)
}

fn dns(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    find::<DnsError>(err).map(|dns| match dns.kind() {
        DnsErrorKind::NotFound => FailureReason::DnsNotFound,
        DnsErrorKind::Timeout => FailureReason::DnsTimeout,
        DnsErrorKind::Other => FailureReason::DnsError,
    })
}

fn tls(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    causes(err).find_map(|e| match e.downcast_ref::<rustls::Error>()? {
        rustls::Error::InvalidCertificate(cert) => Some(match cert {
            CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. } => {
                FailureReason::TlsHostnameMismatch
            }
            CertificateError::UnknownIssuer => FailureReason::TlsUntrustedCa,
            CertificateError::Other(other) if is_self_signed_ca(other) => FailureReason::TlsUntrustedCa,
            _ => FailureReason::TlsCertInvalid,
        }),
        _ => None,
    })
}

// A self-signed CA certificate served as the leaf never chains to a trusted
// root; webpki reports it before looking at issuers.
fn is_self_signed_ca(other: &OtherError) -> bool {
    matches!(
        other.0.downcast_ref::<webpki::Error>(),
        Some(webpki::Error::CaUsedAsEndEntity)
    )
}

fn timeout(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    let reqwest_timeout = find::<reqwest::Error>(err).is_some_and(|e| e.is_timeout());
    (reqwest_timeout || io_kind(err, io::ErrorKind::TimedOut)).then_some(FailureReason::Timeout)
}

fn connection_refused(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    io_kind(err, io::ErrorKind::ConnectionRefused).then_some(FailureReason::ConnectionRefused)
}

fn network(err: &(dyn Error + 'static)) -> Option<FailureReason> {
    causes(err)
        .any(|e| {
            e.is::<io::Error>()
                || e.is::<hyper::Error>()
                || e.downcast_ref::<reqwest::Error>().is_some_and(|r| r.is_connect())
        })
        .then_some(FailureReason::NetworkError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Generic wrapper standing in for library error layers.
    #[derive(Debug, thiserror::Error)]
    #[error("{msg}")]
    struct Wrapped {
        msg: &'static str,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    }

    fn wrap(msg: &'static str, source: impl Error + Send + Sync + 'static) -> Wrapped {
        Wrapped {
            msg,
            source: Some(Box::new(source)),
        }
    }

    fn leaf(msg: &'static str) -> Wrapped {
        Wrapped { msg, source: None }
    }

    fn cert(err: CertificateError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, rustls::Error::InvalidCertificate(err))
    }

    #[test]
    fn test_http_status_boundaries() {
        assert_eq!(classify_status(200), FailureReason::None);
        assert_eq!(classify_status(301), FailureReason::None);
        assert_eq!(classify_status(399), FailureReason::None);
        assert_eq!(classify_status(400), FailureReason::Http4xx);
        assert_eq!(classify_status(499), FailureReason::Http4xx);
        assert_eq!(classify_status(500), FailureReason::Http5xx);
        assert_eq!(classify_status(599), FailureReason::Http5xx);
    }

    #[test]
    fn test_canceled_and_deadline() {
        assert_eq!(classify_transport(&ProbeError::Canceled), FailureReason::ContextCanceled);
        assert_eq!(
            classify_transport(&ProbeError::DeadlineExceeded(Duration::from_secs(5))),
            FailureReason::ContextDeadline
        );
    }

    #[test]
    fn test_cancellation_beats_everything_below_it() {
        let err = wrap("outer", wrap("canceled", ProbeError::Canceled));
        assert_eq!(classify_transport(&err), FailureReason::ContextCanceled);
    }

    #[test]
    fn test_dns_kinds() {
        let cases = [
            (DnsErrorKind::NotFound, FailureReason::DnsNotFound),
            (DnsErrorKind::Timeout, FailureReason::DnsTimeout),
            (DnsErrorKind::Other, FailureReason::DnsError),
        ];
        for (kind, expected) in cases {
            let err = wrap("dns error", DnsError::new("example.invalid", kind));
            assert_eq!(classify_transport(&err), expected, "{:?}", kind);
        }
    }

    #[test]
    fn test_dns_timeout_is_not_generic_timeout() {
        let io = io::Error::new(io::ErrorKind::TimedOut, "lookup timed out");
        let err = wrap("dns error", DnsError::from_io("slow.example", io));
        assert_eq!(classify_transport(&err), FailureReason::DnsTimeout);
    }

    #[test]
    fn test_tls_certificate_errors_inside_io_error() {
        let mismatch = wrap("connect", cert(CertificateError::NotValidForName));
        assert_eq!(classify_transport(&mismatch), FailureReason::TlsHostnameMismatch);

        let untrusted = wrap("connect", cert(CertificateError::UnknownIssuer));
        assert_eq!(classify_transport(&untrusted), FailureReason::TlsUntrustedCa);

        let expired = wrap("connect", cert(CertificateError::Expired));
        assert_eq!(classify_transport(&expired), FailureReason::TlsCertInvalid);

        let usage = wrap("connect", cert(CertificateError::InvalidPurpose));
        assert_eq!(classify_transport(&usage), FailureReason::TlsCertInvalid);
    }

    #[test]
    fn test_ca_certificate_as_leaf_is_untrusted() {
        let ca_leaf = CertificateError::Other(OtherError(std::sync::Arc::new(
            webpki::Error::CaUsedAsEndEntity,
        )));
        assert_eq!(
            classify_transport(&wrap("connect", cert(ca_leaf))),
            FailureReason::TlsUntrustedCa
        );

        let other = CertificateError::Other(OtherError(std::sync::Arc::new(
            webpki::Error::UnsupportedCriticalExtension,
        )));
        assert_eq!(
            classify_transport(&wrap("connect", cert(other))),
            FailureReason::TlsCertInvalid
        );
    }

    #[test]
    fn test_other_tls_errors_are_network_errors() {
        let io = io::Error::new(io::ErrorKind::InvalidData, rustls::Error::DecryptError);
        assert_eq!(classify_transport(&wrap("connect", io)), FailureReason::NetworkError);
    }

    #[test]
    fn test_network_level_errors() {
        let timed_out = wrap("connect", io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        assert_eq!(classify_transport(&timed_out), FailureReason::Timeout);

        let refused = wrap("tcp connect error", io::Error::from(io::ErrorKind::ConnectionRefused));
        assert_eq!(classify_transport(&refused), FailureReason::ConnectionRefused);

        let reset = wrap("read", io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(classify_transport(&reset), FailureReason::NetworkError);
    }

    #[test]
    fn test_deadline_beats_network_timeout() {
        let err = wrap(
            "deadline",
            wrap(
                "elapsed",
                ProbeError::DeadlineExceeded(Duration::from_secs(5)),
            ),
        );
        assert_eq!(classify_transport(&err), FailureReason::ContextDeadline);
    }

    #[test]
    fn test_unknown_fallback() {
        assert_eq!(classify_transport(&leaf("mystery")), FailureReason::Unknown);
        assert_eq!(
            classify_transport(&wrap("outer", leaf("inner"))),
            FailureReason::Unknown
        );
    }

    #[test]
    fn test_every_transport_reason_is_a_failure() {
        let inputs: Vec<Box<dyn Error + Send + Sync>> = vec![
            Box::new(ProbeError::Canceled),
            Box::new(DnsError::new("h", DnsErrorKind::Other)),
            Box::new(cert(CertificateError::BadEncoding)),
            Box::new(io::Error::from(io::ErrorKind::BrokenPipe)),
            Box::new(leaf("x")),
        ];
        for input in &inputs {
            let reason = classify_transport(input.as_ref());
            assert_ne!(reason, FailureReason::None);
            assert_ne!(reason, FailureReason::Http4xx);
            assert_ne!(reason, FailureReason::Http5xx);
        }
    }
}
