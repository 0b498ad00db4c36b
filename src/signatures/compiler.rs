//! Compiles the raw ini database into a [`SignatureTable`]
//!
//! All normalisation happens here, once per refresh: `ua_info_url` gets the
//! info-site prefix, browser type ids are resolved to their names, and each
//! browser inherits its declared default OS. The matcher only ever merges
//! precomputed field sets.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::parser::{RawDatabase, Section};
use super::pattern::{PatternError, SignaturePattern};
use super::table::{PatternRule, RobotSignature, SignatureTable};
use crate::errors::{ClassifierError, ClassifierResult};
use crate::models::{Field, FieldSet, ResultFields};

pub const SECTION_ROBOTS: &str = "robots";
pub const SECTION_OS: &str = "os";
pub const SECTION_OS_REG: &str = "os_reg";
pub const SECTION_BROWSER: &str = "browser";
pub const SECTION_BROWSER_REG: &str = "browser_reg";
pub const SECTION_BROWSER_TYPE: &str = "browser_type";
pub const SECTION_BROWSER_OS: &str = "browser_os";

/// Positional layout of `[os]` entries
pub const OS_TEMPLATE: [Field; 6] = [
    Field::OsFamily,
    Field::OsName,
    Field::OsUrl,
    Field::OsCompany,
    Field::OsCompanyUrl,
    Field::OsIcon,
];

/// Positional layout of `[browser]` entries
pub const BROWSER_TEMPLATE: [Field; 7] = [
    Field::Typ,
    Field::UaFamily,
    Field::UaUrl,
    Field::UaCompany,
    Field::UaCompanyUrl,
    Field::UaIcon,
    Field::UaInfoUrl,
];

/// Positional layout of the browser part of `[robots]` entries
pub const ROBOT_TEMPLATE: [Field; 7] = [
    Field::UaFamily,
    Field::UaName,
    Field::UaUrl,
    Field::UaCompany,
    Field::UaCompanyUrl,
    Field::UaIcon,
    Field::UaInfoUrl,
];

/// Position of the OS index inside a robot entry
const ROBOT_OS_POSITION: usize = 7;

/// Counts reported after a successful compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub robots: usize,
    pub os_rules: usize,
    pub browser_rules: usize,
    /// Patterns dropped because the regex engine does not support them
    pub skipped_patterns: usize,
}

/// Turns database text into a matching table
#[derive(Debug, Clone)]
pub struct SignatureCompiler {
    info_url: String,
}

impl SignatureCompiler {
    /// `info_url` is prepended to every `ua_info_url`
    pub fn new<S: Into<String>>(info_url: S) -> Self {
        Self {
            info_url: info_url.into(),
        }
    }

    pub fn compile(&self, text: &str) -> ClassifierResult<SignatureTable> {
        self.compile_with_stats(text).map(|(table, _)| table)
    }

    pub fn compile_with_stats(&self, text: &str) -> ClassifierResult<(SignatureTable, CompileStats)> {
        let start_time = Instant::now();
        let db = RawDatabase::parse(text)?;

        let robots_section = db.required(SECTION_ROBOTS)?;
        let os_section = db.required(SECTION_OS)?;
        let os_reg = db.required(SECTION_OS_REG)?;
        let browser_section = db.required(SECTION_BROWSER)?;
        let browser_reg = db.required(SECTION_BROWSER_REG)?;
        let browser_types = db.required(SECTION_BROWSER_TYPE)?;
        let empty = Section::default();
        let browser_os = db.section(SECTION_BROWSER_OS).unwrap_or(&empty);

        let os_details = build_os_details(os_section);
        let browser_details =
            self.build_browser_details(browser_section, browser_types, browser_os, &os_details)?;
        let robots = self.build_robots(robots_section, os_section)?;

        let mut stats = CompileStats {
            robots: robots.len(),
            ..CompileStats::default()
        };
        let os_rules = build_rules(SECTION_OS_REG, os_reg, &os_details, &mut stats.skipped_patterns)?;
        let browser_rules = build_rules(
            SECTION_BROWSER_REG,
            browser_reg,
            &browser_details,
            &mut stats.skipped_patterns,
        )?;
        stats.os_rules = os_rules.len();
        stats.browser_rules = browser_rules.len();

        info!(
            robots = stats.robots,
            os_rules = stats.os_rules,
            browser_rules = stats.browser_rules,
            skipped_patterns = stats.skipped_patterns,
            "Compiled signature table in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok((SignatureTable::new(robots, os_rules, browser_rules), stats))
    }

    fn build_browser_details(
        &self,
        browsers: &Section,
        browser_types: &Section,
        browser_os: &Section,
        os_details: &HashMap<u32, FieldSet>,
    ) -> ClassifierResult<HashMap<u32, FieldSet>> {
        let mut details = HashMap::with_capacity(browsers.len());

        for (id, values) in browsers.iter() {
            let mut fields = FieldSet::new();

            if let Some(os_ref) = browser_os.get(id).and_then(|values| values.first()) {
                match parse_index(os_ref).and_then(|os_id| os_details.get(&os_id)) {
                    Some(os_fields) => fields.extend(os_fields.iter().cloned()),
                    None => debug!("Browser {} default OS '{}' not found, skipping", id, os_ref),
                }
            }

            for (field, value) in BROWSER_TEMPLATE.iter().zip(values) {
                let value = match field {
                    Field::Typ => resolve_browser_type(browser_types, id, value)?,
                    Field::UaInfoUrl => self.info_link(value),
                    _ => value.clone(),
                };
                fields.push((*field, value));
            }

            details.insert(id, fields);
        }

        Ok(details)
    }

    fn build_robots(
        &self,
        robots: &Section,
        os_section: &Section,
    ) -> ClassifierResult<Vec<RobotSignature>> {
        let mut signatures = Vec::with_capacity(robots.len());

        for (id, values) in robots.iter() {
            let Some((user_agent, rest)) = values.split_first() else {
                continue;
            };

            let browser_values = values
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(position, _)| *position != ROBOT_OS_POSITION)
                .map(|(_, value)| value);

            let mut fields = ResultFields::default();
            fields.set(Field::Typ, "Robot");
            for (field, value) in ROBOT_TEMPLATE.iter().zip(browser_values) {
                let value = match field {
                    Field::UaInfoUrl => self.info_link(value),
                    _ => value.clone(),
                };
                fields.set(*field, value);
            }

            let os_ref = rest.get(ROBOT_OS_POSITION - 1).map(String::as_str).unwrap_or("");
            if !os_ref.is_empty() {
                let os_values = parse_index(os_ref)
                    .and_then(|os_id| os_section.get(os_id))
                    .ok_or_else(|| {
                        ClassifierError::malformed(format!(
                            "robot {id} references unknown OS '{os_ref}'"
                        ))
                    })?;
                for (field, value) in OS_TEMPLATE.iter().zip(os_values) {
                    fields.set(*field, value.clone());
                }
            }

            signatures.push(RobotSignature {
                user_agent: user_agent.clone(),
                fields,
            });
        }

        Ok(signatures)
    }

    fn info_link(&self, path: &str) -> String {
        format!("{}{}", self.info_url, path)
    }
}

fn build_os_details(os_section: &Section) -> HashMap<u32, FieldSet> {
    os_section
        .iter()
        .map(|(id, values)| {
            let fields = OS_TEMPLATE
                .iter()
                .zip(values)
                .map(|(field, value)| (*field, value.clone()))
                .collect();
            (id, fields)
        })
        .collect()
}

/// Pair each `(pattern, details_id)` entry with its resolved details
fn build_rules(
    section_name: &str,
    section: &Section,
    details: &HashMap<u32, FieldSet>,
    skipped: &mut usize,
) -> ClassifierResult<Vec<PatternRule>> {
    let mut rules = Vec::with_capacity(section.len());

    for (index, values) in section.iter() {
        let [pattern_text, details_ref, ..] = values else {
            return Err(ClassifierError::malformed(format!(
                "[{section_name}] entry {index} needs a pattern and a details id"
            )));
        };

        let fields = parse_index(details_ref)
            .and_then(|id| details.get(&id))
            .ok_or_else(|| {
                ClassifierError::malformed(format!(
                    "[{section_name}] entry {index} references unknown details '{details_ref}'"
                ))
            })?;

        let pattern = match SignaturePattern::parse(pattern_text) {
            Ok(pattern) => pattern,
            Err(PatternError::Unsupported { pattern, message }) => {
                warn!(
                    "Skipping [{}] entry {}: pattern {} is not supported: {}",
                    section_name, index, pattern, message
                );
                *skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        rules.push(PatternRule {
            pattern,
            fields: fields.clone(),
        });
    }

    Ok(rules)
}

fn resolve_browser_type(
    browser_types: &Section,
    browser_id: u32,
    type_ref: &str,
) -> ClassifierResult<String> {
    parse_index(type_ref)
        .and_then(|type_id| browser_types.get(type_id))
        .and_then(|names| names.first())
        .cloned()
        .ok_or_else(|| {
            ClassifierError::malformed(format!(
                "browser {browser_id} references unknown type '{type_ref}'"
            ))
        })
}

fn parse_index(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}
