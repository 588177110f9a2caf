//! Test utilities for the client.
//!
//! - [`MockTransport`]: records outgoing requests and replays canned replies
//! - [`fixtures`]: signed XML replies and shared credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wxpay_lib::test_utils::{fixtures, MockTransport};
//! use wxpay_lib::{Client, ClientConfig};
//!
//! let transport = MockTransport::new();
//! transport.push_xml(&fixtures::signed_order_reply());
//! let config = ClientConfig::new("wx1", "s1").with_mch("M1", fixtures::MCH_KEY);
//! let client = Client::with_transport(config, transport.clone())?;
//! ```

pub mod fixtures;
mod mock_transport;

pub use mock_transport::MockTransport;
