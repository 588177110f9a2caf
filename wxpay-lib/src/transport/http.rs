//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use super::traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::{Result, WxPayError};

/// Default transport over `reqwest`.
///
/// Calls without a client identity share one connection pool. Calls that
/// carry an identity get a client built for that call alone, so concurrent
/// calls with and without certificates never observe each other's TLS
/// configuration.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with a default request timeout.
    ///
    /// A zero timeout leaves requests unbounded.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Self::builder(timeout)
            .build()
            .map_err(|e| WxPayError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    /// Default request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn builder(timeout: Duration) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder();
        if timeout.is_zero() {
            builder
        } else {
            builder.timeout(timeout)
        }
    }

    fn scoped_client(&self, request: &HttpRequest) -> Result<reqwest::Client> {
        match &request.identity {
            None => Ok(self.client.clone()),
            Some(identity) => Self::builder(self.timeout)
                .identity(identity.0.clone())
                .build()
                .map_err(|e| WxPayError::InvalidCertificate(e.to_string())),
        }
    }

    fn map_reqwest_error(&self, request: &HttpRequest, e: reqwest::Error) -> WxPayError {
        let endpoint = request.endpoint();
        // reqwest echoes the full URL, query string included.
        let e = e.without_url();
        if e.is_timeout() {
            WxPayError::Timeout {
                operation: format!("{} {}", request.method, endpoint),
                timeout_ms: request.timeout.unwrap_or(self.timeout).as_millis() as u64,
            }
        } else if e.is_connect() {
            WxPayError::ConnectionFailed {
                target: endpoint.to_string(),
                reason: e.to_string(),
            }
        } else {
            WxPayError::Transport(format!("{} {} failed: {}", request.method, endpoint, e))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let client = self.scoped_client(&request)?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url),
        };
        builder = builder.header(CONTENT_TYPE, request.content_type);
        if let Some(body) = request.body.clone() {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&request, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(&request, e))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::transport::ClientIdentity;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(Duration::from_secs(7)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_scoped_client_without_identity() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://api.weixin.qq.com/cgi-bin/token".to_string(),
            content_type: crate::transport::CONTENT_TYPE_FORM,
            body: None,
            identity: None,
            timeout: None,
        };
        assert!(transport.scoped_client(&request).is_ok());
    }

    #[test]
    fn test_scoped_client_with_identity() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        let identity = ClientIdentity::from_pem(
            fixtures::CLIENT_CERT_PEM.as_bytes(),
            fixtures::CLIENT_KEY_PEM.as_bytes(),
        )
        .unwrap();
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: "https://api.mch.weixin.qq.com/secapi/pay/refund".to_string(),
            content_type: crate::transport::CONTENT_TYPE_FORM,
            body: Some(b"<xml></xml>".to_vec()),
            identity: Some(identity),
            timeout: None,
        };
        assert!(transport.scoped_client(&request).is_ok());
    }

    #[test]
    fn test_zero_timeout_builds() {
        let transport = ReqwestTransport::new(Duration::ZERO).unwrap();
        assert!(transport.timeout().is_zero());
    }

    #[test]
    fn test_identity_rejects_garbage() {
        let err = ClientIdentity::from_pem(b"not a certificate", b"not a key").unwrap_err();
        assert!(matches!(err, WxPayError::InvalidCertificate(_)));

        let err = ClientIdentity::from_pem(b"", b"key").unwrap_err();
        assert!(matches!(err, WxPayError::CertificateNotLoaded));
    }
}
