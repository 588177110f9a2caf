use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::{Result, WxPayError};

/// Content type for form, query and XML bodies.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded;charset=utf-8";

/// Content type for JSON document bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";

/// HTTP verb of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Parameters travel in the query string.
    Get,
    /// Parameters travel in the body.
    Post,
}

impl HttpMethod {
    /// Upper-case verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client certificate and key presented during the TLS handshake.
#[derive(Clone)]
pub struct ClientIdentity(pub(crate) reqwest::Identity);

impl ClientIdentity {
    /// Parse a PEM certificate chain and its PEM private key.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        if cert_pem.is_empty() || key_pem.is_empty() {
            return Err(WxPayError::CertificateNotLoaded);
        }
        let mut bundle = Vec::with_capacity(cert_pem.len() + key_pem.len() + 1);
        bundle.extend_from_slice(cert_pem);
        bundle.push(b'\n');
        bundle.extend_from_slice(key_pem);
        reqwest::Identity::from_pem(&bundle)
            .map(Self)
            .map_err(|e| WxPayError::InvalidCertificate(e.to_string()))
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientIdentity(<redacted>)")
    }
}

/// A fully built outgoing call.
///
/// The value is immutable once built; the client identity, when present,
/// applies to this call only.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: String,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
    /// Client identity for mutual TLS.
    pub identity: Option<ClientIdentity>,
    /// Per-call timeout overriding the transport default.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// URL without its query string, safe to log.
    pub fn endpoint(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

/// Raw reply of a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes built HTTP calls.
///
/// Implementations perform exactly one attempt per call and never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the raw reply.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
