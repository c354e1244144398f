//! Diagnostic Reporter
//!
//! Converts violations into diagnostics, one per violation, in the order the
//! scanner produced them.

use super::diagnostic::{Diagnostic, DiagnosticSink, Location, RuleDescriptor, Span};
use crate::source::{FileId, MalformedOccurrence, SourceMap, UnknownFile};
use crate::validation::Violation;

/// Reporting failures; these point at a broken host integration, never at
/// the code being validated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    UnknownFile(#[from] UnknownFile),
}

/// Builds diagnostics against a known set of sources
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    sources: &'a SourceMap,
}

impl<'a> Reporter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// One diagnostic per violation
    ///
    /// Every location is resolved before anything is returned, so an unknown
    /// file fails the whole batch instead of silently dropping diagnostics.
    pub fn report(
        &self,
        rule: &RuleDescriptor,
        violations: &[Violation],
    ) -> Result<Vec<Diagnostic>, ReportError> {
        violations
            .iter()
            .map(|violation| {
                let location = self.locate(violation.file, violation.position)?;
                let offending = violation.offending_character.to_string();
                Ok(Diagnostic {
                    rule_id: rule.id.clone(),
                    title: rule.title.clone(),
                    message: rule.format(&[offending.as_str(), violation.argument_text.as_str()]),
                    severity: rule.severity,
                    location,
                })
            })
            .collect()
    }

    /// Report violations straight into a sink; returns how many were added
    pub fn report_into(
        &self,
        rule: &RuleDescriptor,
        violations: &[Violation],
        sink: &mut impl DiagnosticSink,
    ) -> Result<usize, ReportError> {
        let diagnostics = self.report(rule, violations)?;
        let count = diagnostics.len();
        sink.accept_all(diagnostics);
        Ok(count)
    }

    /// Diagnostics for usages whose arguments could not be scanned
    pub fn report_malformed(
        &self,
        rule: &RuleDescriptor,
        malformed: &[MalformedOccurrence],
    ) -> Result<Vec<Diagnostic>, ReportError> {
        malformed
            .iter()
            .map(|occurrence| {
                let location = self.locate(occurrence.file, occurrence.target_start_offset)?;
                let reason = occurrence.reason.to_string();
                Ok(Diagnostic {
                    rule_id: rule.id.clone(),
                    title: rule.title.clone(),
                    message: rule.format(&[occurrence.attribute_name.as_str(), reason.as_str()]),
                    severity: rule.severity,
                    location,
                })
            })
            .collect()
    }

    fn locate(&self, file: FileId, position: usize) -> Result<Location, ReportError> {
        let source = self.sources.resolve(file)?;
        Ok(Location {
            file,
            path: source.path.clone(),
            span: Span::new(position, 1),
        })
    }
}
