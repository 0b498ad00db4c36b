//! Source trait definitions

use async_trait::async_trait;

use crate::errors::{ClassifierError, ClassifierResult};

/// Supplies the raw signature database text
#[async_trait]
pub trait SignatureSource: Send + Sync {
    /// Download the complete database.
    ///
    /// Failures must be reported as [`ClassifierError::Fetch`].
    async fn fetch(&self) -> ClassifierResult<String>;

    /// Human-readable location, safe to log
    fn describe(&self) -> String;
}

/// Serves a fixed database text
#[derive(Debug, Clone)]
pub struct StaticSignatureSource {
    text: Option<String>,
}

impl StaticSignatureSource {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// A source whose every fetch fails
    pub fn unavailable() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl SignatureSource for StaticSignatureSource {
    async fn fetch(&self) -> ClassifierResult<String> {
        self.text
            .clone()
            .ok_or_else(|| ClassifierError::fetch("static", "no database text configured"))
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
