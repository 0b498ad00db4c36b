//! Reader for the sectioned, indexed-list ini format
//!
//! ```text
//! [os]
//! 1[] = "Linux"
//! 1[] = "Linux"
//! 1[] = "http://en.wikipedia.org/wiki/Linux"
//! ```
//!
//! Every `N[] = "value"` line appends `value` to the list stored under index
//! `N` of the current section. Comments, blank lines and `key = "value"`
//! globals are skipped.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::errors::{ClassifierError, ClassifierResult};

/// Entries of one section, ordered by index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: BTreeMap<u32, Vec<String>>,
}

impl Section {
    pub fn get(&self, index: u32) -> Option<&[String]> {
        self.entries.get(&index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> {
        self.entries
            .iter()
            .map(|(index, values)| (*index, values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, index: u32, value: String) {
        self.entries.entry(index).or_default().push(value);
    }
}

/// The whole database, before any interpretation of its sections
#[derive(Debug, Clone, Default)]
pub struct RawDatabase {
    sections: HashMap<String, Section>,
}

impl RawDatabase {
    pub fn parse(text: &str) -> ClassifierResult<Self> {
        let mut sections: HashMap<String, Section> = HashMap::new();
        let mut current: Option<String> = None;

        for (line_no, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some((index, value)) = parse_entry(line) {
                let Some(section) = current.as_ref() else {
                    return Err(ClassifierError::malformed(format!(
                        "line {}: entry appears before any section header",
                        line_no + 1
                    )));
                };
                let index: u32 = index.parse().map_err(|_| {
                    ClassifierError::malformed(format!(
                        "line {}: index '{index}' out of range",
                        line_no + 1
                    ))
                })?;
                sections
                    .entry(section.clone())
                    .or_default()
                    .push(index, value.to_string());
            } else if let Some(name) = parse_section_header(line) {
                if sections.insert(name.to_string(), Section::default()).is_some() {
                    debug!("Section [{}] repeated, earlier entries discarded", name);
                }
                current = Some(name.to_string());
            }
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Look up a section that compilation cannot proceed without
    pub fn required(&self, name: &str) -> ClassifierResult<&Section> {
        self.section(name).ok_or_else(|| {
            ClassifierError::malformed(format!("required section [{name}] is missing"))
        })
    }
}

/// `[name]` with a non-empty, whitespace-free name
fn parse_section_header(line: &str) -> Option<&str> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?;
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return None;
    }
    Some(name)
}

/// `<digits>[] = "<value>"`, exactly one whitespace character around `=`
fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .filter(|&end| end > 0)?;
    let (index, rest) = line.split_at(digits_end);

    let rest = rest.strip_prefix("[]")?;
    let rest = strip_one_whitespace(rest)?.strip_prefix('=')?;
    let rest = strip_one_whitespace(rest)?;
    let value = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some((index, value))
}

fn strip_one_whitespace(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    chars.next().filter(|c| c.is_whitespace())?;
    Some(chars.as_str())
}
