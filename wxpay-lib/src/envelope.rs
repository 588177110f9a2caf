//! Response envelopes returned by the remote service.
//!
//! Two mutually exclusive failure shapes exist:
//!
//! - the mini-program (JSON) family reports `errcode`/`errmsg`, where `0`
//!   means success;
//! - the legacy pay (XML) family reports `return_code`/`return_msg` and, for
//!   business results, `result_code`/`err_code`/`err_code_des`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field carrying the JSON error code.
pub const FIELD_ERR_CODE: &str = "errcode";

/// Field carrying the XML communication status.
pub const FIELD_RETURN_CODE: &str = "return_code";

/// Communication status reported by the legacy pay API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnCode(pub String);

impl ReturnCode {
    /// Value the service uses to signal success.
    pub const SUCCESS: &'static str = "SUCCESS";

    /// Create a return code from any string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true only for the exact `SUCCESS` marker.
    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Anything other than `SUCCESS`, including an absent code, is a failure.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error code reported by the mini-program API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrCode(pub i64);

impl ErrCode {
    /// Value the service uses to signal success.
    pub const SUCCESS: ErrCode = ErrCode(0);

    /// Returns true when the code is zero.
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Returns true for any non-zero code.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure envelope of the mini-program (JSON) family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletError {
    /// Non-zero error code.
    #[serde(default)]
    pub errcode: ErrCode,
    /// Human readable message.
    #[serde(default)]
    pub errmsg: String,
}

impl AppletError {
    /// Create an applet error from its code and message.
    pub fn new(errcode: i64, errmsg: impl Into<String>) -> Self {
        Self {
            errcode: ErrCode(errcode),
            errmsg: errmsg.into(),
        }
    }

    /// Returns true when the envelope reports success.
    pub fn is_success(&self) -> bool {
        self.errcode.is_success()
    }

    /// Returns true when the envelope reports a failure.
    pub fn is_failure(&self) -> bool {
        self.errcode.is_failure()
    }
}

impl fmt::Display for AppletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.errcode, self.errmsg)
    }
}

impl std::error::Error for AppletError {}

/// Failure envelope of the legacy pay (XML) family.
///
/// Successful XML replies embed the same fields, see [`PayEnvelope`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayError {
    /// Communication status; anything but `SUCCESS` is a failure.
    #[serde(default)]
    pub return_code: ReturnCode,
    /// Reason for a communication failure.
    #[serde(default)]
    pub return_msg: String,
    /// Business error code.
    #[serde(default)]
    pub err_code: String,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: String,
    /// Business result, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: String,
}

impl PayError {
    /// Returns true when `return_code` is `SUCCESS`.
    pub fn is_success(&self) -> bool {
        self.return_code.is_success()
    }

    /// Returns true when `return_code` is anything but `SUCCESS`.
    pub fn is_failure(&self) -> bool {
        self.return_code.is_failure()
    }

    /// Build the envelope from a decoded flat XML map.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut envelope = Self::default();
        for (key, value) in fields {
            match key {
                FIELD_RETURN_CODE => envelope.return_code = ReturnCode::new(value),
                "return_msg" => envelope.return_msg = value.to_string(),
                "err_code" => envelope.err_code = value.to_string(),
                "err_code_des" => envelope.err_code_des = value.to_string(),
                "result_code" => envelope.result_code = value.to_string(),
                _ => {}
            }
        }
        envelope
    }
}

impl fmt::Display for PayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.return_code, self.return_msg)?;
        if !self.err_code.is_empty() {
            write!(f, ", {} - {}", self.err_code, self.err_code_des)?;
        }
        if !self.result_code.is_empty() {
            write!(f, ", {}", self.result_code)?;
        }
        Ok(())
    }
}

impl std::error::Error for PayError {}

/// Envelope fields carried by every successful XML reply.
///
/// `return_code` is always `SUCCESS` here; `result_code` may still be `FAIL`
/// and must be checked by the caller for business outcomes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayEnvelope {
    /// Communication status.
    #[serde(default)]
    pub return_code: String,
    /// Communication message.
    #[serde(default)]
    pub return_msg: String,
    /// Business result, `SUCCESS` or `FAIL`.
    #[serde(default)]
    pub result_code: String,
    /// Business error code.
    #[serde(default)]
    pub err_code: String,
    /// Business error description.
    #[serde(default)]
    pub err_code_des: String,
}

impl PayEnvelope {
    /// Returns true when the business result is `SUCCESS`.
    pub fn is_business_success(&self) -> bool {
        self.result_code == ReturnCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_code_states() {
        assert!(ReturnCode::new("SUCCESS").is_success());
        assert!(ReturnCode::new("FAIL").is_failure());
        assert!(ReturnCode::default().is_failure());
        assert!(ReturnCode::new("success").is_failure());
    }

    #[test]
    fn test_pay_error_display() {
        let err = PayError {
            return_code: ReturnCode::new("SUCCESS"),
            return_msg: "OK".to_string(),
            err_code: "ORDERPAID".to_string(),
            err_code_des: "order paid".to_string(),
            result_code: "FAIL".to_string(),
        };
        assert_eq!(err.to_string(), "SUCCESS - OK, ORDERPAID - order paid, FAIL");

        let err = PayError {
            return_code: ReturnCode::new("FAIL"),
            return_msg: "bad sign".to_string(),
            ..Default::default()
        };
        assert_eq!(err.to_string(), "FAIL - bad sign");
    }

    #[test]
    fn test_pay_error_from_fields() {
        let fields = [
            ("return_code", "FAIL"),
            ("return_msg", "invalid mch_id"),
            ("appid", "wx1"),
        ];
        let err = PayError::from_fields(fields);
        assert!(err.is_failure());
        assert_eq!(err.return_msg, "invalid mch_id");
    }

    #[test]
    fn test_applet_error_json() {
        let err: AppletError =
            serde_json::from_str(r#"{"errcode":40029,"errmsg":"invalid code"}"#).unwrap();
        assert_eq!(err.errcode, ErrCode(40029));
        assert!(err.is_failure());
        assert_eq!(err.to_string(), "40029 - invalid code");
    }
}
