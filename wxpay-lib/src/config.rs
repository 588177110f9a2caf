//! Client configuration and option values.

use serde::{Deserialize, Serialize};

use crate::sign::SignType;

/// Well-known API hosts.
///
/// Hosts that authenticate with an access token take it as a query
/// parameter; use the helper functions to build them.
pub mod hosts {
    /// Mini-program login.
    pub const JS_CODE_TO_SESSION: &str = "https://api.weixin.qq.com/sns/jscode2session";
    /// Access token issuance.
    pub const ACCESS_TOKEN: &str = "https://api.weixin.qq.com/cgi-bin/token";
    /// Unified order for every trade type.
    pub const UNIFIED_ORDER: &str = "https://api.mch.weixin.qq.com/pay/unifiedorder";
    /// Order query.
    pub const ORDER_QUERY: &str = "https://api.mch.weixin.qq.com/pay/orderquery";
    /// Close order.
    pub const CLOSE_ORDER: &str = "https://api.mch.weixin.qq.com/pay/closeorder";
    /// Refund; requires the merchant client certificate.
    pub const REFUND: &str = "https://api.mch.weixin.qq.com/secapi/pay/refund";
    /// Refund query.
    pub const REFUND_QUERY: &str = "https://api.mch.weixin.qq.com/pay/refundquery";

    /// Phone number lookup for an access token.
    pub fn phone_number(access_token: &str) -> String {
        format!(
            "https://api.weixin.qq.com/wxa/business/getuserphonenumber?access_token={}",
            access_token
        )
    }

    /// Unlimited mini-program code for an access token.
    pub fn wxa_code_unlimited(access_token: &str) -> String {
        format!(
            "https://api.weixin.qq.com/wxa/getwxacodeunlimit?access_token={}",
            access_token
        )
    }

    /// Mini-program QR code for an access token.
    pub fn create_qr_code(access_token: &str) -> String {
        format!(
            "https://api.weixin.qq.com/cgi-bin/wxaapp/createwxaqrcode?access_token={}",
            access_token
        )
    }

    /// Limited mini-program code for an access token.
    pub fn wxa_code(access_token: &str) -> String {
        format!(
            "https://api.weixin.qq.com/wxa/getwxacode?access_token={}",
            access_token
        )
    }
}

/// Identity and endpoint configuration of a [`Client`](crate::Client).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application id, sent as `appid`.
    pub app_id: String,

    /// Application secret, sent as `secret` when a request asks for it.
    pub secret: String,

    /// Merchant id, sent as `mch_id` on signed requests.
    #[serde(default)]
    pub mch_id: String,

    /// Merchant key used to sign requests and verify replies.
    #[serde(default)]
    pub mch_secret: String,

    /// Target URL of the next call.
    #[serde(default)]
    pub host: String,

    /// Signature scheme tag sent as `sign_type`.
    #[serde(default)]
    pub sign_type: SignType,

    /// Deadline of calls without their own timeout, in seconds. Zero
    /// leaves them unbounded.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Create a configuration from application credentials.
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
            mch_id: String::new(),
            mch_secret: String::new(),
            host: String::new(),
            sign_type: SignType::default(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the target host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set merchant credentials.
    pub fn with_mch(mut self, mch_id: impl Into<String>, mch_secret: impl Into<String>) -> Self {
        self.mch_id = mch_id.into();
        self.mch_secret = mch_secret.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Apply an option.
    pub fn apply(&mut self, option: ClientOption) {
        match option {
            ClientOption::ApiHost(host) => {
                if !host.is_empty() {
                    self.host = host;
                }
            }
            ClientOption::MchInformation { id, secret } => {
                if !id.is_empty() {
                    self.mch_id = id;
                }
                if !secret.is_empty() {
                    self.mch_secret = secret;
                }
                self.sign_type = SignType::Md5;
            }
            ClientOption::Timeout(secs) => self.timeout_secs = secs,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .field("mch_id", &self.mch_id)
            .field("mch_secret", &"<redacted>")
            .field("host", &self.host)
            .field("sign_type", &self.sign_type)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A discrete configuration change applied before a call.
///
/// Empty strings leave the current value untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientOption {
    /// Target a specific URL.
    ApiHost(String),
    /// Set merchant id and key; also selects MD5 signatures.
    MchInformation {
        /// Merchant id
        id: String,
        /// Merchant key
        secret: String,
    },
    /// Deadline of calls without their own timeout, in seconds.
    Timeout(u64),
}

impl ClientOption {
    /// Target `host`.
    pub fn api_host(host: impl Into<String>) -> Self {
        Self::ApiHost(host.into())
    }

    /// Target the mini-program login endpoint.
    pub fn js_code_host() -> Self {
        Self::ApiHost(hosts::JS_CODE_TO_SESSION.to_string())
    }

    /// Target the access token endpoint.
    pub fn access_token_host() -> Self {
        Self::ApiHost(hosts::ACCESS_TOKEN.to_string())
    }

    /// Target the unified order endpoint.
    pub fn pay_host() -> Self {
        Self::ApiHost(hosts::UNIFIED_ORDER.to_string())
    }

    /// Target the order query endpoint.
    pub fn order_query_host() -> Self {
        Self::ApiHost(hosts::ORDER_QUERY.to_string())
    }

    /// Target the close order endpoint.
    pub fn close_order_host() -> Self {
        Self::ApiHost(hosts::CLOSE_ORDER.to_string())
    }

    /// Target the refund endpoint.
    pub fn refund_host() -> Self {
        Self::ApiHost(hosts::REFUND.to_string())
    }

    /// Target the refund query endpoint.
    pub fn refund_query_host() -> Self {
        Self::ApiHost(hosts::REFUND_QUERY.to_string())
    }

    /// Set merchant credentials.
    pub fn mch_information(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::MchInformation {
            id: id.into(),
            secret: secret.into(),
        }
    }
}
