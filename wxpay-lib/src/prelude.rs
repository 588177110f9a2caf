//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use wxpay_lib::prelude::*;
//! ```

// Client and configuration
pub use crate::{hosts, CallOptions, Client, ClientConfig, ClientOption};

// Error handling
pub use crate::errors::{WxPayError, WxPayErrorCode};
pub use crate::envelope::{AppletError, PayError};
pub use crate::Result;

// Request contract
pub use crate::{FieldSet, Param, Reply, ResponseFormat};

// Endpoints
pub use crate::api::*;
