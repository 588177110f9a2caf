//! The signing, dispatching client.
//!
//! A [`Client`] owns the caller identity, merchant credentials, the optional
//! client certificate and the HTTP transport. Configuration is applied through
//! `&mut self` methods and therefore cannot overlap an in-flight call; calls
//! themselves only borrow the client and may run concurrently.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ClientOption};
use crate::decode::decode_reply;
use crate::fields::FieldSet;
use crate::param::{Capabilities, Param, Reply, ResponseFormat};
use crate::sign::{self, FIELD_NONCE_STR, FIELD_SIGN, FIELD_SIGN_TYPE};
use crate::transport::{
    ClientIdentity, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    CONTENT_TYPE_FORM, CONTENT_TYPE_JSON,
};
use crate::xml;
use crate::{Result, WxPayError};

/// Outbound field carrying the application id.
pub const FIELD_APP_ID: &str = "appid";

/// Outbound field carrying the application secret.
pub const FIELD_SECRET: &str = "secret";

/// Outbound field carrying the merchant id.
pub const FIELD_MCH_ID: &str = "mch_id";

/// Callback receiving the HTTP method and raw reply bytes of every call.
pub type ReceivedDataHook = Arc<dyn Fn(&str, &[u8]) + Send + Sync>;

/// Per-call controls.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    /// Upper bound for the whole call.
    pub timeout: Option<Duration>,
    /// Token aborting the call when cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    /// Bound the call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Client for the mini-program and pay APIs.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    identity: Option<ClientIdentity>,
    transport: Arc<dyn HttpTransport>,
    on_received_data: Option<ReceivedDataHook>,
}

impl Client {
    /// Create a client from application credentials.
    ///
    /// # Errors
    ///
    /// Returns [`WxPayError::MissingCredentials`] when either value is empty.
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(app_id, secret))
    }

    /// Create a client from a full configuration using the default transport.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        validate_credentials(&config)?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        validate_credentials(&config)?;
        Ok(Self::assemble(config, transport))
    }

    fn assemble(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            identity: None,
            transport,
            on_received_data: None,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Application id.
    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    /// Apply configuration options in order.
    pub fn load_options(&mut self, options: impl IntoIterator<Item = ClientOption>) {
        for option in options {
            self.config.apply(option);
        }
    }

    /// Load the merchant client certificate and private key from PEM data.
    ///
    /// The pair is parsed immediately; both parts are replaced together.
    pub fn load_cert_pem_key(&mut self, cert_pem: &[u8], key_pem: &[u8]) -> Result<()> {
        self.identity = Some(ClientIdentity::from_pem(cert_pem, key_pem)?);
        Ok(())
    }

    /// Load the merchant client certificate and private key from PEM files.
    pub fn load_cert_pem_key_from_file(
        &mut self,
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<()> {
        let cert = read_pem(cert_path.as_ref())?;
        let key = read_pem(key_path.as_ref())?;
        self.load_cert_pem_key(&cert, &key)
    }

    /// Returns true once a client certificate is loaded.
    pub fn has_certificate(&self) -> bool {
        self.identity.is_some()
    }

    /// Register the hook receiving every raw reply.
    pub fn on_received_data<F>(&mut self, hook: F)
    where
        F: Fn(&str, &[u8]) + Send + Sync + 'static,
    {
        self.on_received_data = Some(Arc::new(hook));
    }

    /// Verify the `sign` field of a flat field set with the merchant key.
    ///
    /// Useful for asynchronous payment notifications, which arrive as the same
    /// flat XML documents as call replies.
    pub fn verify_sign(&self, fields: &FieldSet) -> Result<()> {
        sign::verify(fields, &self.config.mch_secret)
    }

    /// Build the outgoing field set for `param`.
    ///
    /// Identity and signing fields are added after the request's own fields
    /// and replace any same-named value. The signature covers every other
    /// field.
    pub fn url_values<P: Param + ?Sized>(&self, param: &P) -> Result<FieldSet> {
        let mut values = FieldSet::from_serialize(param)?;

        if param.need_app_id() {
            values.insert(FIELD_APP_ID, self.config.app_id.as_str());
        }
        if param.need_secret() {
            values.insert(FIELD_SECRET, self.config.secret.as_str());
        }
        if param.need_sign() {
            values.insert(FIELD_MCH_ID, self.config.mch_id.as_str());
            values.insert(FIELD_NONCE_STR, sign::nonce_str());
            values.insert(FIELD_SIGN_TYPE, self.config.sign_type.as_str());
            let signature = sign::sign(values.iter(), &self.config.mch_secret);
            values.insert(FIELD_SIGN, signature);
        }
        Ok(values)
    }

    /// Build the HTTP request for `param` without sending it.
    ///
    /// # Errors
    ///
    /// Fails with [`WxPayError::CertificateNotLoaded`] when the request needs a
    /// client certificate and none is loaded, and with
    /// [`WxPayError::InvalidHost`] when no usable host is configured.
    pub fn build_request<P: Param + ?Sized>(
        &self,
        method: HttpMethod,
        param: &P,
        options: &CallOptions,
    ) -> Result<HttpRequest> {
        let identity = if param.need_tls_cert() {
            Some(
                self.identity
                    .clone()
                    .ok_or(WxPayError::CertificateNotLoaded)?,
            )
        } else {
            None
        };

        let host = self.config.host.as_str();
        if let Err(e) = url::Url::parse(host) {
            return Err(WxPayError::InvalidHost {
                host: host.to_string(),
                reason: e.to_string(),
            });
        }

        let values = self.url_values(param)?;
        let format = param.response_format();
        let content_type = match format {
            ResponseFormat::JsonAsBody => CONTENT_TYPE_JSON,
            ResponseFormat::Json | ResponseFormat::Xml => CONTENT_TYPE_FORM,
        };

        let (url, body) = match method {
            HttpMethod::Get => (append_query(host, &values.to_form_urlencoded()), None),
            HttpMethod::Post => {
                let body = match format {
                    ResponseFormat::Json => values.to_form_urlencoded().into_bytes(),
                    ResponseFormat::JsonAsBody => serde_json::to_vec(param)?,
                    ResponseFormat::Xml => xml::encode(&values).into_bytes(),
                };
                (host.to_string(), Some(body))
            }
        };

        Ok(HttpRequest {
            method,
            url,
            content_type,
            body,
            identity,
            timeout: self.call_timeout(options),
        })
    }

    /// Deadline of one call: the per-call value, else the configured one.
    ///
    /// A configured timeout of zero leaves the call unbounded.
    pub fn call_timeout(&self, options: &CallOptions) -> Option<Duration> {
        options.timeout.or_else(|| {
            (self.config.timeout_secs > 0).then(|| Duration::from_secs(self.config.timeout_secs))
        })
    }

    /// Sign, send and decode one call.
    ///
    /// Failures are returned as-is; nothing is retried.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, param, options), fields(method = %method, format = %param.response_format()))
    )]
    pub async fn do_request<P, R>(
        &self,
        method: HttpMethod,
        param: &P,
        options: CallOptions,
    ) -> Result<R>
    where
        P: Param + ?Sized,
        R: Reply,
    {
        let capabilities = Capabilities::of(param);
        let request = self.build_request(method, param, &options)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = request.endpoint(),
            body_len = request.body.as_ref().map_or(0, Vec::len),
            tls = request.identity.is_some(),
            "sending request"
        );

        let response = self.send(request, options.cancellation.as_ref()).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(status = response.status, body_len = response.body.len(), "received response");

        if let Some(hook) = &self.on_received_data {
            hook(method.as_str(), &response.body);
        }

        if !response.is_success() {
            return Err(WxPayError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }

        decode_reply(&capabilities, &response.body, &self.config.mch_secret)
    }

    async fn send(
        &self,
        request: HttpRequest,
        cancellation: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        let operation = format!("{} {}", request.method, request.endpoint());
        let timeout = request.timeout;
        let call = async {
            match timeout {
                Some(timeout) => tokio::time::timeout(timeout, self.transport.execute(request))
                    .await
                    .map_err(|_| WxPayError::Timeout {
                        operation: operation.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    })?,
                None => self.transport.execute(request).await,
            }
        };

        match cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(WxPayError::Cancelled(operation.clone())),
                result = call => result,
            },
            None => call.await,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("has_certificate", &self.identity.is_some())
            .field("has_observer", &self.on_received_data.is_some())
            .finish()
    }
}

fn validate_credentials(config: &ClientConfig) -> Result<()> {
    if config.app_id.is_empty() {
        return Err(WxPayError::MissingCredentials("app_id"));
    }
    if config.secret.is_empty() {
        return Err(WxPayError::MissingCredentials("secret"));
    }
    Ok(())
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        WxPayError::InvalidCertificate(format!("failed to read {}: {}", path.display(), e))
    })
}

fn append_query(host: &str, query: &str) -> String {
    if query.is_empty() {
        return host.to_string();
    }
    let separator = if host.contains('?') { '&' } else { '?' };
    format!("{}{}{}", host, separator, query)
}
