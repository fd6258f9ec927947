//! TLS client configuration for probes.
//!
//! Certificates are checked by webpki against the configured roots. When that
//! check fails, the server name is tested on its own and a mismatch is
//! reported ahead of whatever chain error webpki found, so a self-signed
//! certificate for the wrong host reads as `tls_hostname_mismatch`.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::{verify_server_name, VerifierBuilderError, WebPkiServerVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TlsConfigError {
    #[error("failed to build certificate verifier: {0}")]
    Verifier(#[from] VerifierBuilderError),

    #[error("failed to build tls config: {0}")]
    Config(#[from] rustls::Error),
}

/// Mozilla's root set, as shipped in `webpki-roots`.
pub fn default_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

/// Client config trusting `roots`, verified through [`NameFirstVerifier`].
pub fn client_config(roots: RootCertStore) -> Result<ClientConfig, TlsConfigError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = NameFirstVerifier::new(roots, provider.clone())?;

    let mut config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(config)
}

/// webpki verification with the server name checked first on failure.
#[derive(Debug)]
pub struct NameFirstVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl NameFirstVerifier {
    pub fn new(roots: RootCertStore, provider: Arc<CryptoProvider>) -> Result<Self, VerifierBuilderError> {
        let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider).build()?;
        Ok(Self { inner })
    }
}

impl ServerCertVerifier for NameFirstVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
            .map_err(|err| match err {
                rustls::Error::InvalidCertificate(_) if !name_matches(end_entity, server_name) => {
                    CertificateError::NotValidForName.into()
                }
                other => other,
            })
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

// An unparseable certificate keeps webpki's own error.
fn name_matches(end_entity: &CertificateDer<'_>, server_name: &ServerName<'_>) -> bool {
    match ParsedCertificate::try_from(end_entity) {
        Ok(cert) => verify_server_name(&cert, server_name).is_ok(),
        Err(_) => true,
    }
}
