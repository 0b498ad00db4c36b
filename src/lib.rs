//! User agent classification backed by the user-agent-string.info signature
//! database.
//!
//! ```rust,no_run
//! use uas_classifier::{Classifier, config::Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = Classifier::from_config(&Config::default()).await?;
//! let result = classifier.classify("Mozilla/5.0 (X11; Linux x86_64) Firefox/89.0")?;
//! println!("{} on {}", result.ua_name, result.os_name);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod models;
pub mod signatures;
pub mod sources;
pub mod storage;
pub mod utils;

pub use classifier::{Classifier, TableOrigin};
pub use errors::{ClassifierError, ClassifierResult};
pub use models::{Field, ResultFields};
