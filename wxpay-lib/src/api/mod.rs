//! Endpoint declarations.
//!
//! Each request type is a plain serializable struct implementing
//! [`Param`](crate::Param); each reply type implements [`Reply`](crate::Reply).
//! The matching `Client` methods fill in request defaults and delegate to
//! [`Client::do_request`](crate::Client::do_request). Select the host with
//! [`ClientOption`](crate::ClientOption) before calling.

pub mod authorize;
pub mod qrcode;
pub mod trade;

pub use authorize::{
    Code2Session, Code2SessionRsp, GetAccessToken, GetAccessTokenRsp, GetPhoneNumber,
    GetPhoneNumberRsp, PhoneNumberInfo, Watermark,
};
pub use qrcode::{CreateQRCode, GetQRCode, GetWxACodeUnLimit, LineColor, QrcodeRsp};
pub use trade::{
    format_trade_time, H5Info, SceneInfo, StoreInfo, Trade, TradeApp, TradeAppRsp, TradeApplet,
    TradeAppletPayRsp, TradeAppletRsp, TradeCloseOrder, TradeCloseOrderRsp, TradeCodeUrlRsp,
    TradeJSAPI, TradeJSAPIRsp, TradeNative, TradeNativeRsp, TradeOrderQuery, TradeOrderQueryRsp,
    TradeRefund, TradeRefundQuery, TradeRefundQueryRsp, TradeRefundRsp, TradeResponse, TradeWap,
    TradeWapRsp,
};
