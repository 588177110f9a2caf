//! Reply decoding.
//!
//! The declared [`ResponseFormat`] alone selects the branch. The only
//! content-driven decision is the binary fallback of
//! [`ResponseFormat::JsonAsBody`]: a body that is not a JSON object is handed
//! to [`Reply::from_binary`].

use serde_json::{Map, Value};

use crate::envelope::{AppletError, PayError, FIELD_ERR_CODE};
use crate::param::{Capabilities, Reply, ResponseFormat};
use crate::{sign, xml};
use crate::{Result, WxPayError};

/// Decode a successful HTTP body into `R` according to `capabilities`.
pub(crate) fn decode_reply<R: Reply>(
    capabilities: &Capabilities,
    data: &[u8],
    mch_secret: &str,
) -> Result<R> {
    match capabilities.response_format {
        ResponseFormat::Json | ResponseFormat::JsonAsBody => {
            decode_json(capabilities.response_format, data)
        }
        ResponseFormat::Xml => decode_xml(capabilities.need_verify, data, mch_secret),
    }
}

fn decode_json<R: Reply>(format: ResponseFormat, data: &[u8]) -> Result<R> {
    let object = match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(object)) => object,
        _ if format == ResponseFormat::JsonAsBody => {
            return R::from_binary(data.to_vec())
                .ok_or_else(|| WxPayError::decode("reply type does not accept binary bodies"));
        }
        Ok(_) => return Err(WxPayError::decode("expected a JSON object")),
        Err(e) => return Err(WxPayError::decode(e)),
    };

    if let Some(error) = applet_error(&object) {
        #[cfg(feature = "tracing")]
        tracing::warn!(errcode = error.errcode.0, errmsg = %error.errmsg, "applet call failed");
        return Err(WxPayError::Applet(error));
    }

    serde_json::from_value(Value::Object(object)).map_err(WxPayError::decode)
}

/// Extract a failure envelope, if `object` carries a non-zero `errcode`.
fn applet_error(object: &Map<String, Value>) -> Option<AppletError> {
    let code = match object.get(FIELD_ERR_CODE)? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if code == 0 {
        return None;
    }
    let message = object
        .get("errmsg")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(AppletError::new(code, message))
}

fn decode_xml<R: Reply>(need_verify: bool, data: &[u8], mch_secret: &str) -> Result<R> {
    let fields = xml::decode(data)?;

    let envelope = PayError::from_fields(fields.iter());
    if envelope.is_failure() {
        #[cfg(feature = "tracing")]
        tracing::warn!(envelope = %envelope, "pay call failed");
        return Err(WxPayError::Pay(envelope));
    }

    if need_verify {
        if let Err(e) = sign::verify(&fields, mch_secret) {
            #[cfg(feature = "tracing")]
            tracing::warn!("reply signature mismatch");
            return Err(e);
        }
    }

    xml::bind(&fields)
}
