//! Centralized error handling for the UAS classifier
//!
//! This module provides a single error type shared by every layer of the
//! classifier so callers only ever need to match on one enum.
//!
//! # Error Categories
//!
//! - **Input Errors**: empty or missing user agent strings passed to `classify`
//! - **Database Errors**: signature text that cannot be compiled into a table
//! - **Fetch Errors**: transport failures while downloading the signature text
//! - **Refresh Errors**: a failed refresh, wrapping the fetch or compile cause
//! - **Storage Errors**: persisted table blobs that cannot be read or written
//!
//! # Usage
//!
//! ```rust
//! use uas_classifier::errors::{ClassifierError, ClassifierResult};
//!
//! fn example_function(input: &str) -> ClassifierResult<&str> {
//!     if input.is_empty() {
//!         return Err(ClassifierError::invalid_input("user agent must not be empty"));
//!     }
//!     Ok(input)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using ClassifierError
pub type ClassifierResult<T> = Result<T, ClassifierError>;
