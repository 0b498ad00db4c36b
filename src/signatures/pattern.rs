//! Slash-delimited signature patterns
//!
//! The database stores patterns in `/body/flags` form. Only two flags carry
//! meaning: `s` (dot matches newline) and `i` (case-insensitive). Both are
//! mapped onto [`RegexBuilder`] options rather than spliced into the pattern
//! text, so the body is compiled exactly as written.

use regex::{Regex, RegexBuilder};

use crate::errors::{ClassifierError, ClassifierResult};

/// Flags recognised after the closing delimiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub dot_matches_new_line: bool,
    pub case_insensitive: bool,
}

impl PatternFlags {
    /// Unknown flag characters are ignored
    pub fn parse(flags: &str) -> Self {
        Self {
            dot_matches_new_line: flags.contains('s'),
            case_insensitive: flags.contains('i'),
        }
    }
}

/// A compiled signature pattern that remembers its database form
#[derive(Debug, Clone)]
pub struct SignaturePattern {
    source: String,
    flags: PatternFlags,
    regex: Regex,
}

/// Split `/body/flags` into its body and flag characters
pub fn split_delimited(text: &str) -> ClassifierResult<(&str, &str)> {
    let rest = text.strip_prefix('/').ok_or_else(|| {
        ClassifierError::malformed(format!("pattern '{text}' does not start with '/'"))
    })?;
    let end = rest.rfind('/').ok_or_else(|| {
        ClassifierError::malformed(format!("pattern '{text}' has no closing '/'"))
    })?;
    Ok((&rest[..end], &rest[end + 1..]))
}

impl SignaturePattern {
    /// Parse and compile a pattern in `/body/flags` form.
    ///
    /// A missing delimiter is a malformed database; a body the regex engine
    /// rejects is reported separately as [`PatternError::Unsupported`] so the
    /// compiler can decide to skip it.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let (body, flags) = split_delimited(text).map_err(PatternError::Malformed)?;
        let flags = PatternFlags::parse(flags);

        let regex = RegexBuilder::new(body)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .case_insensitive(flags.case_insensitive)
            .build()
            .map_err(|e| PatternError::Unsupported {
                pattern: text.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            source: text.to_string(),
            flags,
            regex,
        })
    }

    /// The pattern exactly as it appeared in the database
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Search the haystack; `Some(version)` carries capture group 1 when it
    /// participated and is non-empty.
    pub fn search<'h>(&self, haystack: &'h str) -> Option<Option<&'h str>> {
        let captures = self.regex.captures(haystack)?;
        Some(
            captures
                .get(1)
                .map(|m| m.as_str())
                .filter(|version| !version.is_empty()),
        )
    }
}

/// Why a single pattern could not be compiled
#[derive(Debug)]
pub enum PatternError {
    /// The delimiter structure is broken
    Malformed(ClassifierError),
    /// Well-formed, but uses syntax the regex engine does not support
    Unsupported { pattern: String, message: String },
}

impl From<PatternError> for ClassifierError {
    fn from(err: PatternError) -> Self {
        match err {
            PatternError::Malformed(err) => err,
            PatternError::Unsupported { pattern, message } => {
                ClassifierError::malformed(format!("pattern '{pattern}' failed to compile: {message}"))
            }
        }
    }
}
