//! Where signature database text comes from
//!
//! The classifier only depends on the [`SignatureSource`] trait; the HTTP
//! implementation is the production transport and [`StaticSignatureSource`]
//! serves fixed text for tests and offline use.

pub mod http;
pub mod traits;

pub use http::HttpSignatureSource;
pub use traits::{SignatureSource, StaticSignatureSource};
