//! WeChat mini-program and pay API client.
//!
//! One [`Client`] talks to endpoint families that disagree on wire format,
//! signing, credential attachment and mutual TLS. Each request type declares
//! those needs through [`Param`]; the client builds, signs, dispatches and
//! decodes accordingly.
//!
//! # Features
//!
//! - **Capability descriptors**: request types declare app id, secret, signing,
//!   verification, client certificate and reply format
//! - **Canonical MD5 signing**: one canonicalizer for outbound requests and
//!   inbound verification
//! - **Three wire formats**: query/form with JSON replies, JSON documents with
//!   binary replies, and flat XML
//! - **Request-scoped mutual TLS**: certificate calls never alter the shared
//!   HTTP client
//!
//! # Example
//!
//! ```no_run
//! use wxpay_lib::api::Code2Session;
//! use wxpay_lib::{CallOptions, Client, ClientOption};
//!
//! # async fn demo() -> wxpay_lib::Result<()> {
//! let mut client = Client::new("wx0123456789", "app-secret")?;
//! client.load_options([ClientOption::js_code_host()]);
//!
//! let session = client
//!     .code2_session(
//!         Code2Session {
//!             js_code: "081aBc".into(),
//!             ..Default::default()
//!         },
//!         CallOptions::default(),
//!     )
//!     .await?;
//! println!("openid: {}", session.openid);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
mod decode;
pub mod envelope;
pub mod errors;
pub mod fields;
pub mod param;
pub mod prelude;
pub mod sign;
pub mod transport;
pub mod xml;

/// Test utilities: a recording mock transport and signed reply fixtures.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{CallOptions, Client, ReceivedDataHook};
pub use config::{hosts, ClientConfig, ClientOption};
pub use envelope::{AppletError, ErrCode, PayEnvelope, PayError, ReturnCode};
pub use errors::{WxPayError, WxPayErrorCode};
pub use fields::FieldSet;
pub use param::{Capabilities, Param, Reply, ResponseFormat};
pub use sign::SignType;
pub use transport::{HttpMethod, HttpTransport, ReqwestTransport};

/// Common result alias for client operations.
pub type Result<T> = std::result::Result<T, WxPayError>;
