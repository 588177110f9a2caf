//! Legacy pay endpoints: unified order, query, close and refund.
//!
//! Every call here is a signed XML exchange; replies are verified with the
//! merchant key before they are bound.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::client::{CallOptions, Client};
use crate::envelope::PayEnvelope;
use crate::param::{Param, Reply, ResponseFormat};
use crate::sign::{self, SignType};
use crate::transport::HttpMethod;
use crate::xml::int_from_text;
use crate::Result;

/// Layout of `time_start` and `time_expire`.
pub const TRADE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format a timestamp as `yyyyMMddHHmmss` in its own offset.
pub fn format_trade_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(TRADE_TIME_FORMAT).to_string()
}

/// Trade types accepted by the unified order endpoint.
pub mod trade_type {
    pub const JSAPI: &str = "JSAPI";
    pub const APP: &str = "APP";
    pub const NATIVE: &str = "NATIVE";
    pub const MWEB: &str = "MWEB";
}

macro_rules! xml_param {
    ($($ty:ty),+ $(,)?) => {$(
        impl Param for $ty {
            fn response_format(&self) -> ResponseFormat {
                ResponseFormat::Xml
            }
        }
    )+};
}

macro_rules! reply {
    ($($ty:ty),+ $(,)?) => {$(
        impl Reply for $ty {}
    )+};
}

/// Scene description sent as `scene_info`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h5_info: Option<H5Info>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_info: Option<StoreInfo>,
}

/// Web page or app launching an `MWEB` payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct H5Info {
    /// `Wap`, `IOS` or `Android`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub wap_url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub wap_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub app_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub bundle_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub package_name: String,
}

/// Physical store of an offline payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: String,
    pub name: String,
    pub area_code: String,
    pub address: String,
}

/// Fields shared by every unified order.
///
/// Empty strings are omitted from the request.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Trade {
    /// Asynchronous notification URL.
    pub notify_url: String,
    /// Goods description.
    pub body: String,
    /// Merchant order number, unique per merchant.
    pub out_trade_no: String,
    /// Amount in cents; omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fee: Option<u64>,
    /// Payer IP address.
    pub spbill_create_ip: String,
    /// Filled in by the client method when empty.
    pub trade_type: String,
    pub attach: String,
    pub device_info: String,
    pub detail: String,
    pub fee_type: String,
    /// See [`format_trade_time`].
    pub time_start: String,
    /// See [`format_trade_time`].
    pub time_expire: String,
    pub goods_tag: String,
    /// Required for `NATIVE`.
    pub product_id: String,
    pub limit_pay: String,
    pub receipt: String,
    pub profit_sharing: String,
    /// Sent as a compact JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_info: Option<SceneInfo>,
}

impl Trade {
    fn default_trade_type(&mut self, trade_type: &str) {
        if self.trade_type.is_empty() {
            self.trade_type = trade_type.to_string();
        }
    }
}

/// Mini-program payment.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeApplet {
    #[serde(flatten)]
    pub trade: Trade,
    pub openid: String,
}

/// In-app payment.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeApp {
    #[serde(flatten)]
    pub trade: Trade,
}

/// Payment inside the in-app browser.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeJSAPI {
    #[serde(flatten)]
    pub trade: Trade,
    pub openid: String,
}

/// QR code payment.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeNative {
    #[serde(flatten)]
    pub trade: Trade,
}

/// Payment from an external mobile browser.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeWap {
    #[serde(flatten)]
    pub trade: Trade,
}

/// Query an order by merchant or platform number.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeOrderQuery {
    pub out_trade_no: String,
    pub transaction_id: String,
}

/// Close an unpaid order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeCloseOrder {
    pub out_trade_no: String,
}

/// Refund a paid order. Requires the merchant client certificate.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeRefund {
    pub out_trade_no: String,
    pub transaction_id: String,
    pub out_refund_no: String,
    /// Order amount in cents; omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_fee: Option<u64>,
    /// Refund amount in cents; omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_fee: Option<u64>,
    pub refund_fee_type: String,
    pub refund_desc: String,
    pub refund_account: String,
    pub notify_url: String,
}

/// Query refunds of an order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TradeRefundQuery {
    pub transaction_id: String,
    pub out_trade_no: String,
    pub out_refund_no: String,
    pub refund_id: String,
    pub offset: String,
}

xml_param!(
    TradeApplet,
    TradeApp,
    TradeJSAPI,
    TradeNative,
    TradeWap,
    TradeOrderQuery,
    TradeCloseOrder,
    TradeRefundQuery,
);

impl Param for TradeRefund {
    fn need_tls_cert(&self) -> bool {
        true
    }

    fn response_format(&self) -> ResponseFormat {
        ResponseFormat::Xml
    }
}

/// Unified order reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeResponse {
    #[serde(flatten)]
    pub envelope: PayEnvelope,
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub device_info: String,
    #[serde(default)]
    pub trade_type: String,
    /// Prepayment session id, valid for two hours.
    #[serde(default)]
    pub prepay_id: String,
}

/// Unified order reply carrying an optional code URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeCodeUrlRsp {
    #[serde(flatten)]
    pub trade: TradeResponse,
    #[serde(default)]
    pub code_url: String,
}

/// Mini-program order reply.
pub type TradeAppletRsp = TradeCodeUrlRsp;
/// In-browser order reply.
pub type TradeJSAPIRsp = TradeCodeUrlRsp;
/// QR code order reply; `code_url` is the content of the code.
pub type TradeNativeRsp = TradeCodeUrlRsp;
/// In-app order reply.
pub type TradeAppRsp = TradeResponse;

/// External browser order reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeWapRsp {
    #[serde(flatten)]
    pub trade: TradeResponse,
    /// Page that launches the payment.
    #[serde(default)]
    pub mweb_url: String,
}

/// Parameters handed to the mini-program payment API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAppletPayRsp {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    #[serde(rename = "nonceStr")]
    pub nonce_str: String,
    /// `prepay_id=<id>`.
    pub package: String,
    #[serde(rename = "signType")]
    pub sign_type: String,
    #[serde(rename = "paySign")]
    pub pay_sign: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeOrderQueryRsp {
    #[serde(flatten)]
    pub envelope: PayEnvelope,
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub device_info: String,
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub is_subscribe: String,
    #[serde(default)]
    pub trade_type: String,
    /// `SUCCESS`, `REFUND`, `NOTPAY`, `CLOSED`, `REVOKED`, `USERPAYING` or `PAYERROR`.
    #[serde(default)]
    pub trade_state: String,
    #[serde(default)]
    pub bank_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub total_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub settlement_total_fee: i64,
    #[serde(default)]
    pub fee_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub cash_fee: i64,
    #[serde(default)]
    pub cash_fee_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_count: i64,
    #[serde(default)]
    pub coupon_type_0: String,
    #[serde(default)]
    pub coupon_id_0: String,
    #[serde(default)]
    pub coupon_fee_0: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub attach: String,
    /// `yyyyMMddHHmmss`.
    #[serde(default)]
    pub time_end: String,
    #[serde(default)]
    pub trade_state_desc: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeCloseOrderRsp {
    #[serde(flatten)]
    pub envelope: PayEnvelope,
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub result_msg: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeRefundRsp {
    #[serde(flatten)]
    pub envelope: PayEnvelope,
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub out_refund_no: String,
    #[serde(default)]
    pub refund_id: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub refund_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub settlement_refund_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub total_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub settlement_total_fee: i64,
    #[serde(default)]
    pub fee_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub cash_fee: i64,
    #[serde(default)]
    pub cash_fee_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub cash_refund_fee: i64,
    #[serde(default)]
    pub coupon_type_0: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_fee_0: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_count: i64,
    #[serde(default)]
    pub coupon_refund_id_0: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TradeRefundQueryRsp {
    #[serde(flatten)]
    pub envelope: PayEnvelope,
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub total_refund_count: i64,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub total_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub settlement_total_fee: i64,
    #[serde(default)]
    pub fee_type: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub cash_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub refund_count: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub refund_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub cash_refund_fee: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_fee: i64,
    #[serde(default)]
    pub out_refund_no_0: String,
    #[serde(default)]
    pub refund_id_0: String,
    #[serde(default)]
    pub refund_channel_0: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub refund_fee_0: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub settlement_refund_fee_0: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_fee_0: i64,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_count_0: i64,
    #[serde(default)]
    pub coupon_type_0_0: String,
    #[serde(default)]
    pub coupon_refund_id_0_0: String,
    #[serde(default, deserialize_with = "int_from_text")]
    pub coupon_refund_fee_0_0: i64,
    /// `SUCCESS`, `REFUNDCLOSE`, `PROCESSING` or `CHANGE`.
    #[serde(default)]
    pub refund_status_0: String,
    #[serde(default)]
    pub refund_account_0: String,
    #[serde(default)]
    pub refund_recv_accout_0: String,
    #[serde(default)]
    pub refund_success_time_0: String,
}

reply!(
    TradeResponse,
    TradeCodeUrlRsp,
    TradeWapRsp,
    TradeOrderQueryRsp,
    TradeCloseOrderRsp,
    TradeRefundRsp,
    TradeRefundQueryRsp,
);

impl Client {
    /// Place a mini-program order and return the parameters for the
    /// mini-program payment API.
    ///
    /// `POST https://api.mch.weixin.qq.com/pay/unifiedorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_trade_no = %param.trade.out_trade_no)))]
    pub async fn trade_applet(
        &self,
        mut param: TradeApplet,
        options: CallOptions,
    ) -> Result<TradeAppletPayRsp> {
        param.trade.default_trade_type(trade_type::JSAPI);
        let order: TradeAppletRsp = self
            .do_request(HttpMethod::Post, &param, options)
            .await?;
        Ok(self.applet_pay_params(
            &order.trade.prepay_id,
            chrono::Utc::now().timestamp(),
            sign::nonce_str(),
        ))
    }

    /// Sign the mini-program payment parameters for a prepayment session.
    ///
    /// The signature covers `appId`, `timeStamp`, `nonceStr`, `package` and
    /// `signType` and uses the merchant key.
    pub fn applet_pay_params(
        &self,
        prepay_id: &str,
        timestamp: i64,
        nonce_str: String,
    ) -> TradeAppletPayRsp {
        let mut params = TradeAppletPayRsp {
            app_id: self.app_id().to_string(),
            timestamp: timestamp.to_string(),
            nonce_str,
            package: format!("prepay_id={}", prepay_id),
            sign_type: SignType::Md5.as_str().to_string(),
            pay_sign: String::new(),
        };
        params.pay_sign = sign::sign(
            [
                ("appId", params.app_id.as_str()),
                ("timeStamp", params.timestamp.as_str()),
                ("nonceStr", params.nonce_str.as_str()),
                ("package", params.package.as_str()),
                ("signType", params.sign_type.as_str()),
            ],
            &self.config().mch_secret,
        );
        params
    }

    /// `POST https://api.mch.weixin.qq.com/pay/unifiedorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_trade_no = %param.trade.out_trade_no)))]
    pub async fn trade_app(
        &self,
        mut param: TradeApp,
        options: CallOptions,
    ) -> Result<TradeAppRsp> {
        param.trade.default_trade_type(trade_type::APP);
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/unifiedorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_trade_no = %param.trade.out_trade_no)))]
    pub async fn trade_jsapi(
        &self,
        mut param: TradeJSAPI,
        options: CallOptions,
    ) -> Result<TradeJSAPIRsp> {
        param.trade.default_trade_type(trade_type::JSAPI);
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/unifiedorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_trade_no = %param.trade.out_trade_no)))]
    pub async fn trade_native(
        &self,
        mut param: TradeNative,
        options: CallOptions,
    ) -> Result<TradeNativeRsp> {
        param.trade.default_trade_type(trade_type::NATIVE);
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/unifiedorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_trade_no = %param.trade.out_trade_no)))]
    pub async fn trade_wap(
        &self,
        mut param: TradeWap,
        options: CallOptions,
    ) -> Result<TradeWapRsp> {
        param.trade.default_trade_type(trade_type::MWEB);
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/orderquery`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn trade_order_query(
        &self,
        param: TradeOrderQuery,
        options: CallOptions,
    ) -> Result<TradeOrderQueryRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/closeorder`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn trade_close_order(
        &self,
        param: TradeCloseOrder,
        options: CallOptions,
    ) -> Result<TradeCloseOrderRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/secapi/pay/refund`
    ///
    /// Fails with [`WxPayError::CertificateNotLoaded`](crate::WxPayError::CertificateNotLoaded)
    /// before any network traffic when no client certificate is loaded.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(out_refund_no = %param.out_refund_no)))]
    pub async fn trade_refund(
        &self,
        param: TradeRefund,
        options: CallOptions,
    ) -> Result<TradeRefundRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }

    /// `POST https://api.mch.weixin.qq.com/pay/refundquery`
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn trade_refund_query(
        &self,
        param: TradeRefundQuery,
        options: CallOptions,
    ) -> Result<TradeRefundQueryRsp> {
        self.do_request(HttpMethod::Post, &param, options).await
    }
}
