//! Diagnostic Types
//!
//! Positioned, severity-tagged messages and the sinks that collect them.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::source::{FileId, SourceMap};

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(name)
    }
}

/// Static description of a rule's diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Stable identifier, e.g. "ESG0001"
    pub id: String,
    pub title: String,
    /// Message template with `{0}`, `{1}`, ... placeholders
    pub message_format: String,
    pub category: String,
    pub severity: Severity,
}

pub const ILLEGAL_CHARACTER_ID: &str = "ESG0001";
pub const MALFORMED_ARGUMENTS_ID: &str = "ESG0002";
pub const DEFAULT_CATEGORY: &str = "ErrorGenerator";

impl RuleDescriptor {
    /// `Illegal character '{0}' in message "{1}"`
    pub fn illegal_character() -> Self {
        Self {
            id: ILLEGAL_CHARACTER_ID.to_string(),
            title: "Illegal character in message".to_string(),
            message_format: r#"Illegal character '{0}' in message "{1}""#.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            severity: Severity::Warning,
        }
    }

    /// Reported for usages skipped because of their argument shape
    pub fn malformed_arguments() -> Self {
        Self {
            id: MALFORMED_ARGUMENTS_ID.to_string(),
            title: "Malformed attribute arguments".to_string(),
            message_format: "Attribute '{0}' expects exactly one string argument ({1})".to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            severity: Severity::Info,
        }
    }

    /// Fill the message template
    pub fn format(&self, args: &[&str]) -> String {
        format_message(&self.message_format, args)
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"));

/// Substitute `{N}` placeholders; unknown indices are left as written
pub fn format_message(template: &str, args: &[&str]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .map(|arg| arg.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Highest placeholder index used by a template
pub fn max_placeholder(template: &str) -> Option<usize> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .max()
}

/// Byte range in a file's text
///
/// Offsets count UTF-8 bytes. Hosts that measure text in UTF-16 code units
/// report different offsets once non-ASCII text precedes the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Where a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: FileId,
    pub path: String,
    pub span: Span,
}

/// A diagnostic message for one rule violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub location: Location,
}

impl Diagnostic {
    /// `path:line:col: severity[id]: message`, resolving lines via `sources`
    pub fn render(&self, sources: &SourceMap) -> String {
        match sources.get(self.location.file) {
            Some(file) => {
                let (line, column) = file.line_col(self.location.span.start);
                format!(
                    "{}:{}:{}: {}[{}]: {}",
                    self.location.path, line, column, self.severity, self.rule_id, self.message
                )
            }
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}..{}: {}[{}]: {}",
            self.location.path,
            self.location.span.start,
            self.location.span.end(),
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

/// Anything that accepts diagnostics in order
pub trait DiagnosticSink {
    fn accept(&mut self, diagnostic: Diagnostic);

    fn accept_all(&mut self, diagnostics: Vec<Diagnostic>) {
        for diagnostic in diagnostics {
            self.accept(diagnostic);
        }
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn accept(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Ordered diagnostic collection with severity queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn accept(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
