//! Generator
//!
//! One validation pass over a compilation: adapt, scan, report, for every
//! enabled rule in registration order. Also owns the fixed `ErrorAttribute`
//! declaration that accompanies each run.

use serde::Serialize;
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, Reporter, RuleDescriptor, Severity};
use crate::error::Result;
use crate::rule::{MalformedPolicy, Rule, RuleRegistry};
use crate::source::{extract_all, Compilation, Extraction};
use crate::validation::{scan_all, scan_parallel};

/// File name the attribute declaration is registered under
pub const ERROR_ATTRIBUTE_HINT: &str = "ErrorAttribute.cs";

/// Declaration of the attribute the built-in rule checks
pub const ERROR_ATTRIBUTE_SOURCE: &str = "\
using System;
internal sealed class ErrorAttribute : Attribute
{
    public ErrorAttribute(string message) => Message = message;
    public string Message { get; }
}
";

/// A source file produced by the generator rather than read from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    pub hint_name: String,
    pub text: String,
}

/// Output of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub generated_sources: Vec<GeneratedSource>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Runs the registered rules over compilations
#[derive(Debug, Clone)]
pub struct Generator {
    registry: RuleRegistry,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(RuleRegistry::with_builtin())
    }
}

impl Generator {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// The fixed attribute declaration, independent of any input
    pub fn post_initialization_output(&self) -> GeneratedSource {
        GeneratedSource {
            hint_name: ERROR_ATTRIBUTE_HINT.to_string(),
            text: ERROR_ATTRIBUTE_SOURCE.to_string(),
        }
    }

    /// Full run: generated declaration plus diagnostics
    pub fn run(&self, compilation: &Compilation) -> Result<RunResult> {
        Ok(RunResult {
            generated_sources: vec![self.post_initialization_output()],
            diagnostics: self.analyze(compilation)?,
        })
    }

    /// Full run with scanning spread over tokio tasks
    pub async fn run_parallel(
        &self,
        compilation: &Compilation,
        chunk_size: usize,
    ) -> Result<RunResult> {
        Ok(RunResult {
            generated_sources: vec![self.post_initialization_output()],
            diagnostics: self.analyze_parallel(compilation, chunk_size).await?,
        })
    }

    /// Diagnostics for every enabled rule
    ///
    /// Per rule, violation diagnostics come first in occurrence order, then
    /// malformed-usage diagnostics when the rule asks for them.
    pub fn analyze(&self, compilation: &Compilation) -> Result<Vec<Diagnostic>> {
        let reporter = Reporter::new(compilation.sources());
        let mut diagnostics = Vec::new();

        for rule in self.registry.enabled_rules() {
            let extraction = extract_all(compilation, &rule.attribute);
            let violations = scan_all(&extraction.occurrences, rule);
            log_rule_pass(rule, &extraction, violations.len());

            reporter.report_into(&rule.descriptor, &violations, &mut diagnostics)?;
            diagnostics.extend(report_malformed(&reporter, rule, &extraction)?);
        }

        Ok(diagnostics)
    }

    /// Same output as [`Generator::analyze`], scanning in parallel
    pub async fn analyze_parallel(
        &self,
        compilation: &Compilation,
        chunk_size: usize,
    ) -> Result<Vec<Diagnostic>> {
        let reporter = Reporter::new(compilation.sources());
        let mut diagnostics = Vec::new();

        for rule in self.registry.enabled_rules() {
            let extraction = extract_all(compilation, &rule.attribute);
            let violations = scan_parallel(
                extraction.occurrences.clone(),
                Arc::new(rule.clone()),
                chunk_size,
            )
            .await?;
            log_rule_pass(rule, &extraction, violations.len());

            reporter.report_into(&rule.descriptor, &violations, &mut diagnostics)?;
            diagnostics.extend(report_malformed(&reporter, rule, &extraction)?);
        }

        Ok(diagnostics)
    }
}

fn report_malformed(
    reporter: &Reporter<'_>,
    rule: &Rule,
    extraction: &Extraction,
) -> Result<Vec<Diagnostic>> {
    match rule.malformed {
        MalformedPolicy::Skip => Ok(Vec::new()),
        MalformedPolicy::Report => {
            let mut descriptor = RuleDescriptor::malformed_arguments();
            descriptor.category = rule.descriptor.category.clone();
            Ok(reporter.report_malformed(&descriptor, &extraction.malformed)?)
        }
    }
}

fn log_rule_pass(rule: &Rule, extraction: &Extraction, violations: usize) {
    log::debug!(
        "rule {}: {} occurrences, {} malformed, {} violations",
        rule.id(),
        extraction.occurrences.len(),
        extraction.malformed.len(),
        violations
    );
}
