//! Error types for client operations.
//!
//! Every failure is returned to the immediate caller. Variants fall into
//! five groups: configuration, transport, decode, application (the remote
//! service answered but reported failure in its envelope) and signature
//! verification.

use crate::envelope::{AppletError, PayError};

/// Stable numeric codes for FFI and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WxPayErrorCode {
    /// Configuration error
    Config = 1000,
    /// Client certificate required but not loaded
    CertificateNotLoaded = 1001,
    /// Client certificate material could not be parsed
    InvalidCertificate = 1002,
    /// Transport/network layer error
    Transport = 2000,
    /// Connection failed
    ConnectionFailed = 2001,
    /// Call exceeded its deadline
    Timeout = 2002,
    /// Call cancelled by the caller
    Cancelled = 2003,
    /// Non-success HTTP status
    HttpStatus = 2004,
    /// Response did not match the declared format
    Decode = 3000,
    /// Serialization error
    Serialization = 3001,
    /// Malformed XML
    Xml = 3002,
    /// Mini-program API reported a non-zero errcode
    Applet = 4000,
    /// Pay API reported a non-SUCCESS return_code
    Pay = 4001,
    /// Returned signature did not match the recomputed one
    SignatureMismatch = 5000,
}

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum WxPayError {
    /// Required identity fields were missing at construction time.
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The configured host is not a valid URL.
    #[error("invalid host {host}: {reason}")]
    InvalidHost {
        /// Host as configured
        host: String,
        /// Parser message
        reason: String,
    },

    /// The request needs a client certificate and none was loaded.
    #[error("client certificate and key not loaded")]
    CertificateNotLoaded,

    /// Certificate or key material could not be read or parsed.
    #[error("invalid client certificate: {0}")]
    InvalidCertificate(String),

    /// Transport/network layer error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection failed.
    #[error("connection to {target} failed: {reason}")]
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// The call did not complete within its deadline.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Deadline in milliseconds
        timeout_ms: u64,
    },

    /// The caller cancelled the call.
    #[error("{0} cancelled")]
    Cancelled(String),

    /// Non-success HTTP status.
    #[error("unexpected HTTP status {status}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Raw response body
        body: Vec<u8>,
    },

    /// The response bytes do not match the declared format.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Malformed XML document.
    #[error("xml error: {0}")]
    Xml(String),

    /// Mini-program API failure envelope.
    #[error("applet error: {0}")]
    Applet(AppletError),

    /// Pay API failure envelope.
    #[error("pay error: {0}")]
    Pay(PayError),

    /// Returned signature does not match the recomputed one.
    #[error("signature verification failed: received {received}, computed {computed}")]
    SignatureMismatch {
        /// Signature found in the response
        received: String,
        /// Signature recomputed locally
        computed: String,
    },
}

impl WxPayError {
    /// Get the numeric error code.
    pub fn code(&self) -> WxPayErrorCode {
        match self {
            Self::MissingCredentials(_) | Self::InvalidHost { .. } => WxPayErrorCode::Config,
            Self::CertificateNotLoaded => WxPayErrorCode::CertificateNotLoaded,
            Self::InvalidCertificate(_) => WxPayErrorCode::InvalidCertificate,
            Self::Transport(_) => WxPayErrorCode::Transport,
            Self::ConnectionFailed { .. } => WxPayErrorCode::ConnectionFailed,
            Self::Timeout { .. } => WxPayErrorCode::Timeout,
            Self::Cancelled(_) => WxPayErrorCode::Cancelled,
            Self::HttpStatus { .. } => WxPayErrorCode::HttpStatus,
            Self::Decode(_) => WxPayErrorCode::Decode,
            Self::Serialization(_) => WxPayErrorCode::Serialization,
            Self::Xml(_) => WxPayErrorCode::Xml,
            Self::Applet(_) => WxPayErrorCode::Applet,
            Self::Pay(_) => WxPayErrorCode::Pay,
            Self::SignatureMismatch { .. } => WxPayErrorCode::SignatureMismatch,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true for transport-level failures a caller may choose to retry.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true when the remote service reported failure in its envelope.
    pub fn is_application_error(&self) -> bool {
        matches!(self, Self::Applet(_) | Self::Pay(_))
    }

    /// Returns the mini-program envelope, if this is one.
    pub fn as_applet(&self) -> Option<&AppletError> {
        match self {
            Self::Applet(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the pay envelope, if this is one.
    pub fn as_pay(&self) -> Option<&PayError> {
        match self {
            Self::Pay(err) => Some(err),
            _ => None,
        }
    }

    /// Create a decode error from any displayable cause.
    pub fn decode(reason: impl std::fmt::Display) -> Self {
        Self::Decode(reason.to_string())
    }
}

impl From<serde_json::Error> for WxPayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for WxPayError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<AppletError> for WxPayError {
    fn from(err: AppletError) -> Self {
        Self::Applet(err)
    }
}

impl From<PayError> for WxPayError {
    fn from(err: PayError) -> Self {
        Self::Pay(err)
    }
}
