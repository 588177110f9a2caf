//! Capability descriptors for outgoing requests.
//!
//! Every request type implements [`Param`] and declares, as fixed facts of
//! the type, which cross-cutting behaviours apply to it. The request builder,
//! dispatcher and decoder consult only these capabilities and never special
//! case a request type by name.
//!
//! The defaults describe a signed, verified JSON call that carries the
//! application id; request types override only what differs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format of a request/reply pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseFormat {
    /// Form or query parameters out, JSON with an `errcode` envelope back.
    #[default]
    Json,
    /// JSON document out, raw binary on success or a JSON error envelope back.
    JsonAsBody,
    /// Flat XML document out and back, with a `return_code` envelope.
    Xml,
}

impl ResponseFormat {
    /// Returns true for the two JSON reply families.
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonAsBody)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::JsonAsBody => "jsonAsBody",
            Self::Xml => "xml",
        })
    }
}

/// Request capability contract.
///
/// Implementors are plain serializable field sets; the capability methods
/// must return constants for a given type.
pub trait Param: Serialize + Send + Sync {
    /// Attach the application id as `appid`.
    fn need_app_id(&self) -> bool {
        true
    }

    /// Attach the application secret as `secret`.
    fn need_secret(&self) -> bool {
        false
    }

    /// Attach merchant id, nonce, sign type and signature.
    fn need_sign(&self) -> bool {
        true
    }

    /// Verify the signature of an XML reply.
    fn need_verify(&self) -> bool {
        true
    }

    /// Present the loaded client certificate during the TLS handshake.
    fn need_tls_cert(&self) -> bool {
        false
    }

    /// Wire format of the request and its reply.
    fn response_format(&self) -> ResponseFormat {
        ResponseFormat::Json
    }
}

/// Typed reply produced by the response decoder.
pub trait Reply: DeserializeOwned {
    /// Build a reply from an opaque binary body.
    ///
    /// Only consulted for [`ResponseFormat::JsonAsBody`] when the body is not
    /// a JSON envelope. Returning `None` turns such a body into a decode
    /// error.
    fn from_binary(_data: Vec<u8>) -> Option<Self> {
        None
    }
}

impl Reply for serde_json::Value {}

/// Snapshot of the capabilities of one request, taken before dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// See [`Param::need_app_id`].
    pub need_app_id: bool,
    /// See [`Param::need_secret`].
    pub need_secret: bool,
    /// See [`Param::need_sign`].
    pub need_sign: bool,
    /// See [`Param::need_verify`].
    pub need_verify: bool,
    /// See [`Param::need_tls_cert`].
    pub need_tls_cert: bool,
    /// See [`Param::response_format`].
    pub response_format: ResponseFormat,
}

impl Capabilities {
    /// Read the capabilities of `param`.
    pub fn of<P: Param + ?Sized>(param: &P) -> Self {
        Self {
            need_app_id: param.need_app_id(),
            need_secret: param.need_secret(),
            need_sign: param.need_sign(),
            need_verify: param.need_verify(),
            need_tls_cert: param.need_tls_cert(),
            response_format: param.response_format(),
        }
    }
}
