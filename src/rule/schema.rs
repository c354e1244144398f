//! Rule Schema Types
//!
//! TOML shape of rule files and the runtime rule they convert into.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::diagnostics::diagnostic::{max_placeholder, DEFAULT_CATEGORY};
use crate::diagnostics::{RuleDescriptor, Severity};
use crate::source::AttributeName;

/// How a violation's position is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PositionMode {
    /// Target start plus the number of violations found so far. Consecutive
    /// violations land on consecutive offsets no matter where the characters
    /// sit in the argument.
    #[default]
    ViolationCount,
    /// Target start plus the character's index within the argument
    CharacterIndex,
}

/// What happens to usages without exactly one string argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    #[default]
    Skip,
    Report,
}

/// Root rule file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// One `[[rules]]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub id: String,
    pub title: String,
    pub message_format: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Metadata name of the attribute, e.g. "ErrorAttribute"
    pub attribute: String,
    pub disallowed_characters: Vec<char>,
    #[serde(default)]
    pub position_mode: PositionMode,
    #[serde(default)]
    pub malformed: MalformedPolicy,
}

fn default_enabled() -> bool {
    true
}

const DEFAULT_MESSAGE_FORMAT: &str = r#"Illegal character '{0}' in message "{1}""#;

/// Invalid rule definitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule id must not be empty")]
    EmptyId,
    #[error("rule '{0}' has no attribute name")]
    EmptyAttribute(String),
    #[error("rule '{id}' uses placeholder {{{index}}}; only {{0}} and {{1}} are available")]
    UnknownPlaceholder { id: String, index: usize },
    #[error("failed to parse rule file: {0}")]
    Parse(String),
}

/// Runtime rule: one attribute, one character blocklist
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub descriptor: RuleDescriptor,
    pub attribute: AttributeName,
    pub disallowed: BTreeSet<char>,
    pub position_mode: PositionMode,
    pub malformed: MalformedPolicy,
    pub enabled: bool,
}

impl Rule {
    /// Built-in rule: no '?' in `ErrorAttribute` messages
    pub fn error_attribute() -> Self {
        Self {
            descriptor: RuleDescriptor::illegal_character(),
            attribute: AttributeName::new("ErrorAttribute"),
            disallowed: BTreeSet::from(['?']),
            position_mode: PositionMode::ViolationCount,
            malformed: MalformedPolicy::Skip,
            enabled: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn is_disallowed(&self, ch: char) -> bool {
        self.disallowed.contains(&ch)
    }

    pub fn with_position_mode(mut self, mode: PositionMode) -> Self {
        self.position_mode = mode;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed = policy;
        self
    }

    pub fn with_disallowed(mut self, characters: impl IntoIterator<Item = char>) -> Self {
        self.disallowed = characters.into_iter().collect();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.descriptor.severity = severity;
        self
    }
}

impl TryFrom<RuleDef> for Rule {
    type Error = RuleError;

    fn try_from(def: RuleDef) -> Result<Self, Self::Error> {
        let id = def.id.trim().to_string();
        if id.is_empty() {
            return Err(RuleError::EmptyId);
        }
        if def.attribute.trim().is_empty() {
            return Err(RuleError::EmptyAttribute(id));
        }

        let message_format = def
            .message_format
            .unwrap_or_else(|| DEFAULT_MESSAGE_FORMAT.to_string());
        if let Some(index) = max_placeholder(&message_format).filter(|&index| index > 1) {
            return Err(RuleError::UnknownPlaceholder { id, index });
        }

        Ok(Self {
            descriptor: RuleDescriptor {
                id,
                title: def.title,
                message_format,
                category: def.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                severity: def.severity,
            },
            attribute: AttributeName::new(&def.attribute),
            disallowed: def.disallowed_characters.into_iter().collect(),
            position_mode: def.position_mode,
            malformed: def.malformed,
            enabled: def.enabled,
        })
    }
}

/// Parse a rule file's TOML and convert every rule in it
pub fn parse_rules(content: &str) -> Result<Vec<Rule>, RuleError> {
    let file: RuleFile = toml::from_str(content).map_err(|e| RuleError::Parse(e.to_string()))?;
    file.rules.into_iter().map(Rule::try_from).collect()
}
