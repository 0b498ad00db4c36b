//! Signature database compilation and matching
//!
//! Raw ini text flows through [`parser`] and [`compiler`] into an immutable
//! [`SignatureTable`], which [`matcher`] applies to user agent strings.

pub mod compiler;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod table;

pub use compiler::{CompileStats, SignatureCompiler};
pub use matcher::{MatchKind, MatchOutcome, match_user_agent};
pub use pattern::SignaturePattern;
pub use table::{PatternRule, RobotSignature, SignatureTable, TableSnapshot};
