//! Mini-program code and QR code endpoints.
//!
//! These calls send a JSON document and receive the image bytes on success or
//! a JSON error envelope on failure.

use serde::{Deserialize, Serialize};

use crate::client::{CallOptions, Client};
use crate::param::{Param, Reply, ResponseFormat};
use crate::transport::HttpMethod;
use crate::Result;

macro_rules! qrcode_param {
    ($($ty:ty),+ $(,)?) => {$(
        impl Param for $ty {
            fn need_app_id(&self) -> bool {
                false
            }

            fn need_sign(&self) -> bool {
                false
            }

            fn need_verify(&self) -> bool {
                false
            }

            fn response_format(&self) -> ResponseFormat {
                ResponseFormat::JsonAsBody
            }
        }
    )+};
}

/// RGB line color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Mini-program code without a quantity limit.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GetWxACodeUnLimit {
    /// Page path without a leading slash; the home page when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub page: String,
    /// Up to 32 visible characters handed to the page.
    pub scene: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_path: Option<bool>,
    /// `release`, `trial` or `develop`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub env_version: String,
    /// Width in pixels, 280 to 1280.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub auto_color: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<LineColor>,
    pub is_hyaline: bool,
}

/// Mini-program QR code, quantity limited.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateQRCode {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

/// Mini-program code, quantity limited.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GetQRCode {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub auto_color: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<LineColor>,
    pub is_hyaline: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub env_version: String,
}

qrcode_param!(GetWxACodeUnLimit, CreateQRCode, GetQRCode);

/// Image bytes of a generated code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QrcodeRsp {
    #[serde(default)]
    pub buffer: Vec<u8>,
}

impl Reply for QrcodeRsp {
    fn from_binary(data: Vec<u8>) -> Option<Self> {
        Some(Self { buffer: data })
    }
}

impl Client {
    /// `POST https://api.weixin.qq.com/wxa/getwxacodeunlimit?access_token=ACCESS_TOKEN`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn get_wxa_code_unlimit(
        &self,
        param: GetWxACodeUnLimit,
        options: CallOptions,
    ) -> Result<QrcodeRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.weixin.qq.com/cgi-bin/wxaapp/createwxaqrcode?access_token=ACCESS_TOKEN`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn create_qr_code(
        &self,
        param: CreateQRCode,
        options: CallOptions,
    ) -> Result<QrcodeRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.weixin.qq.com/wxa/getwxacode?access_token=ACCESS_TOKEN`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn get_qr_code(&self, param: GetQRCode, options: CallOptions) -> Result<QrcodeRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }
}
