//! The compiled, immutable signature table and its persisted form

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pattern::SignaturePattern;
use crate::errors::{ClassifierError, ClassifierResult};
use crate::models::{FieldSet, ResultFields};

/// Bumped whenever [`TableSnapshot`] changes shape
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A crawler identified by its complete user agent string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotSignature {
    pub user_agent: String,
    pub fields: ResultFields,
}

/// A regex rule together with the fields it contributes on a match
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: SignaturePattern,
    pub fields: FieldSet,
}

/// Ordered robot, OS and browser rules. Order encodes precedence.
#[derive(Debug, Clone, Default)]
pub struct SignatureTable {
    robots: Vec<RobotSignature>,
    robot_index: HashMap<String, usize>,
    os_rules: Vec<PatternRule>,
    browser_rules: Vec<PatternRule>,
}

impl SignatureTable {
    pub fn new(
        robots: Vec<RobotSignature>,
        os_rules: Vec<PatternRule>,
        browser_rules: Vec<PatternRule>,
    ) -> Self {
        let mut robot_index = HashMap::with_capacity(robots.len());
        for (position, robot) in robots.iter().enumerate() {
            // first occurrence wins, same as a linear scan
            robot_index
                .entry(robot.user_agent.clone())
                .or_insert(position);
        }

        Self {
            robots,
            robot_index,
            os_rules,
            browser_rules,
        }
    }

    pub fn robots(&self) -> &[RobotSignature] {
        &self.robots
    }

    pub fn os_rules(&self) -> &[PatternRule] {
        &self.os_rules
    }

    pub fn browser_rules(&self) -> &[PatternRule] {
        &self.browser_rules
    }

    /// Exact-match robot lookup
    pub fn find_robot(&self, user_agent: &str) -> Option<&RobotSignature> {
        self.robot_index
            .get(user_agent)
            .map(|&position| &self.robots[position])
    }

    /// Decompile into the serializable form
    pub fn snapshot(&self) -> TableSnapshot {
        let rules = |rules: &[PatternRule]| -> Vec<RuleSnapshot> {
            rules
                .iter()
                .map(|rule| RuleSnapshot {
                    pattern: rule.pattern.source().to_string(),
                    fields: rule.fields.clone(),
                })
                .collect()
        };

        TableSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            robots: self.robots.clone(),
            os_rules: rules(&self.os_rules),
            browser_rules: rules(&self.browser_rules),
        }
    }

    /// Rebuild a table from a snapshot, recompiling every pattern
    pub fn from_snapshot(snapshot: TableSnapshot) -> ClassifierResult<Self> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(ClassifierError::storage(format!(
                "snapshot format version {} is not supported (expected {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let rules = |rules: Vec<RuleSnapshot>| -> ClassifierResult<Vec<PatternRule>> {
            rules
                .into_iter()
                .map(|rule| {
                    let pattern = SignaturePattern::parse(&rule.pattern).map_err(|e| {
                        ClassifierError::storage(format!(
                            "snapshot pattern could not be recompiled: {}",
                            ClassifierError::from(e)
                        ))
                    })?;
                    Ok(PatternRule {
                        pattern,
                        fields: rule.fields,
                    })
                })
                .collect()
        };

        Ok(Self::new(
            snapshot.robots,
            rules(snapshot.os_rules)?,
            rules(snapshot.browser_rules)?,
        ))
    }

    /// Encode for a [`crate::storage::TableStore`]
    pub fn to_bytes(&self) -> ClassifierResult<Vec<u8>> {
        serde_json::to_vec(&self.snapshot())
            .map_err(|e| ClassifierError::storage(format!("failed to encode table: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> ClassifierResult<Self> {
        let snapshot: TableSnapshot = serde_json::from_slice(bytes)
            .map_err(|e| ClassifierError::storage(format!("failed to decode table: {e}")))?;
        Self::from_snapshot(snapshot)
    }
}

/// Serializable form of a [`SignatureTable`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub format_version: u32,
    pub robots: Vec<RobotSignature>,
    pub os_rules: Vec<RuleSnapshot>,
    pub browser_rules: Vec<RuleSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    /// Pattern in its `/body/flags` database form
    pub pattern: String,
    pub fields: FieldSet,
}
