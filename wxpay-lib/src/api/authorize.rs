//! Mini-program login, access token and phone number endpoints.

use serde::{Deserialize, Serialize};

use crate::client::{CallOptions, Client};
use crate::param::{Param, Reply};
use crate::transport::HttpMethod;
use crate::Result;

/// Grant type of [`GetAccessToken`] when none is given.
pub const GRANT_CLIENT_CREDENTIAL: &str = "client_credential";

/// Grant type of [`Code2Session`] when none is given.
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";

/// Exchange a login code for a session.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Code2Session {
    /// Defaults to `authorization_code`.
    pub grant_type: String,
    /// Code obtained by the mini-program login call.
    pub js_code: String,
}

impl Param for Code2Session {
    fn need_secret(&self) -> bool {
        true
    }

    fn need_sign(&self) -> bool {
        false
    }

    fn need_verify(&self) -> bool {
        false
    }
}

/// Session of a logged-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Code2SessionRsp {
    /// Stable user id within the application.
    #[serde(default)]
    pub openid: String,
    /// Session key.
    #[serde(default)]
    pub session_key: String,
    /// Cross-application user id, when the application is bound to an open platform account.
    #[serde(default)]
    pub unionid: String,
}

impl Reply for Code2SessionRsp {}

/// Issue an API access token.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GetAccessToken {
    /// Defaults to `client_credential`.
    pub grant_type: String,
}

impl Param for GetAccessToken {
    fn need_secret(&self) -> bool {
        true
    }

    fn need_sign(&self) -> bool {
        false
    }

    fn need_verify(&self) -> bool {
        false
    }
}

/// Issued access token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GetAccessTokenRsp {
    /// The token.
    #[serde(default)]
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: i64,
}

impl Reply for GetAccessTokenRsp {}

/// Resolve a phone number authorization code.
///
/// The access token travels in the host URL, see
/// [`hosts::phone_number`](crate::config::hosts::phone_number).
#[derive(Clone, Debug, Default, Serialize)]
pub struct GetPhoneNumber {
    /// Phone number authorization code.
    pub code: String,
    /// User id, optional.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub openid: String,
}

impl Param for GetPhoneNumber {
    fn need_app_id(&self) -> bool {
        false
    }

    fn need_sign(&self) -> bool {
        false
    }

    fn need_verify(&self) -> bool {
        false
    }
}

/// Resolved phone number.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GetPhoneNumberRsp {
    #[serde(default)]
    pub phone_info: PhoneNumberInfo,
}

impl Reply for GetPhoneNumberRsp {}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberInfo {
    /// Number including the country prefix for foreign numbers.
    #[serde(default)]
    pub phone_number: String,
    /// Number without country prefix.
    #[serde(default)]
    pub pure_phone_number: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub watermark: Watermark,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Watermark {
    /// Unix time of the lookup.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub appid: String,
}

impl Client {
    /// Fetch an access token.
    ///
    /// `GET https://api.weixin.qq.com/cgi-bin/token`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn get_access_token(
        &self,
        mut param: GetAccessToken,
        options: CallOptions,
    ) -> Result<GetAccessTokenRsp> {
        if param.grant_type.is_empty() {
            param.grant_type = GRANT_CLIENT_CREDENTIAL.to_string();
        }
        self.do_request(HttpMethod::Get, &param, options).await
    }

    /// Exchange a login code for a session.
    ///
    /// `GET https://api.weixin.qq.com/sns/jscode2session`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn code2_session(
        &self,
        mut param: Code2Session,
        options: CallOptions,
    ) -> Result<Code2SessionRsp> {
        if param.grant_type.is_empty() {
            param.grant_type = GRANT_AUTHORIZATION_CODE.to_string();
        }
        self.do_request(HttpMethod::Get, &param, options).await
    }

    /// Resolve a phone number authorization code.
    ///
    /// `POST https://api.weixin.qq.com/wxa/business/getuserphonenumber?access_token=ACCESS_TOKEN`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn get_phone_number(
        &self,
        param: GetPhoneNumber,
        options: CallOptions,
    ) -> Result<GetPhoneNumberRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{hosts, ClientConfig};
    use crate::test_utils::MockTransport;
    use crate::WxPayError;
    use tokio_util::sync::CancellationToken;

    fn client(transport: std::sync::Arc<MockTransport>, host: &str) -> Client {
        Client::with_transport(ClientConfig::new("wx1", "s1").with_host(host), transport).unwrap()
    }

    #[tokio::test]
    async fn test_code2_session_defaults_grant() {
        let transport = MockTransport::new();
        transport.push_json(r#"{"errcode":0,"openid":"abc","session_key":"k"}"#);
        let client = client(transport.clone(), hosts::JS_CODE_TO_SESSION);

        let session = client
            .code2_session(
                Code2Session {
                    js_code: "C1".to_string(),
                    ..Default::default()
                },
                CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(session.openid, "abc");

        let url = transport.last_request().unwrap().url;
        assert!(url.contains("grant_type=authorization_code"));
        assert!(url.contains("js_code=C1"));
        assert!(url.contains("secret=s1"));
        assert!(!url.contains("sign="));
    }

    #[tokio::test]
    async fn test_code2_session_honors_call_options() {
        let transport = MockTransport::new();
        transport.set_delay(std::time::Duration::from_secs(5));
        transport.push_json(r#"{"errcode":0,"openid":"abc"}"#);
        let client = client(transport, hosts::JS_CODE_TO_SESSION);

        let token = CancellationToken::new();
        token.cancel();
        let err = client
            .code2_session(
                Code2Session::default(),
                CallOptions::default().with_cancellation(token),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WxPayError::Cancelled(_)));

        let err = client
            .get_access_token(
                GetAccessToken::default(),
                CallOptions::default().with_timeout(std::time::Duration::from_millis(20)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WxPayError::Timeout { timeout_ms: 20, .. }));
    }

    #[tokio::test]
    async fn test_access_token_error() {
        let transport = MockTransport::new();
        transport.push_json(r#"{"errcode":40013,"errmsg":"invalid appid"}"#);
        let client = client(transport.clone(), hosts::ACCESS_TOKEN);

        let err = client
            .get_access_token(GetAccessToken::default(), CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WxPayError::Applet(ref e) if e.errcode.0 == 40013));
        assert!(transport
            .last_request()
            .unwrap()
            .url
            .contains("grant_type=client_credential"));
    }

    #[tokio::test]
    async fn test_phone_number_posts_form() {
        let transport = MockTransport::new();
        transport.push_json(
            r#"{"errcode":0,"errmsg":"ok","phone_info":{"phoneNumber":"+86 13800000000","purePhoneNumber":"13800000000","countryCode":"86","watermark":{"timestamp":1700000000,"appid":"wx1"}}}"#,
        );
        let client = client(transport.clone(), &hosts::phone_number("TOKEN"));

        let rsp = client
            .get_phone_number(
                GetPhoneNumber {
                    code: "P1".to_string(),
                    openid: String::new(),
                },
                CallOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(rsp.phone_info.pure_phone_number, "13800000000");
        assert_eq!(rsp.phone_info.watermark.timestamp, 1_700_000_000);

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.body.unwrap(), b"code=P1".to_vec());
        assert!(sent.url.ends_with("access_token=TOKEN"));
    }
}
