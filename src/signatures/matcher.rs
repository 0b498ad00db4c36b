//! Applies a [`SignatureTable`] to a user agent string
//!
//! Precedence is fixed: an exact robot match ends the search; otherwise the
//! first matching OS rule is merged, then the first matching browser rule.
//! OS and browser rules are each scanned once, never interleaved.

use super::table::SignatureTable;
use crate::errors::{ClassifierError, ClassifierResult};
use crate::models::{Field, ResultFields};

/// Which part of the table decided the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Robot,
    Pattern { os: bool, browser: bool },
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub fields: ResultFields,
    pub kind: MatchKind,
}

pub fn match_user_agent(table: &SignatureTable, user_agent: &str) -> ClassifierResult<MatchOutcome> {
    if user_agent.is_empty() {
        return Err(ClassifierError::invalid_input("user agent string is empty"));
    }

    if let Some(robot) = table.find_robot(user_agent) {
        return Ok(MatchOutcome {
            fields: robot.fields.clone(),
            kind: MatchKind::Robot,
        });
    }

    let mut fields = ResultFields::default();

    let os_rule = table
        .os_rules()
        .iter()
        .find(|rule| rule.pattern.is_match(user_agent));
    if let Some(rule) = os_rule {
        fields.apply(&rule.fields);
    }

    let browser_match = table
        .browser_rules()
        .iter()
        .find_map(|rule| rule.pattern.search(user_agent).map(|version| (rule, version)));
    if let Some((rule, version)) = browser_match {
        fields.apply(&rule.fields);
        if let Some(version) = version {
            let name = format!("{} {}", fields.ua_family, version);
            fields.set(Field::UaName, name);
        }
    }

    let kind = if os_rule.is_none() && browser_match.is_none() {
        MatchKind::Unmatched
    } else {
        MatchKind::Pattern {
            os: os_rule.is_some(),
            browser: browser_match.is_some(),
        }
    };

    Ok(MatchOutcome { fields, kind })
}
