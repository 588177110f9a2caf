//! HTTP transport abstraction.
//!
//! The client builds an immutable [`HttpRequest`] per call and hands it to an
//! [`HttpTransport`]. [`ReqwestTransport`] is the default; tests substitute a
//! recording mock.

mod http;
mod traits;

pub use http::ReqwestTransport;
pub use traits::{
    ClientIdentity, HttpMethod, HttpRequest, HttpResponse, HttpTransport, CONTENT_TYPE_FORM,
    CONTENT_TYPE_JSON,
};
