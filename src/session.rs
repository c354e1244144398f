//! Validation Session
//!
//! Caller-owned driver for repeated runs over changing input. Each
//! [`Session::advance`] validates a fresh compilation; the generated
//! attribute declaration is produced once and reused.

use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::generator::{GeneratedSource, Generator, RunResult};
use crate::source::Compilation;

/// Repeated runs with one generator
#[derive(Debug, Clone)]
pub struct Session {
    generator: Generator,
    generated: Option<GeneratedSource>,
    runs: usize,
    last: Option<RunResult>,
    last_changed: bool,
}

impl Session {
    pub fn new(generator: Generator) -> Self {
        Self {
            generator,
            generated: None,
            runs: 0,
            last: None,
            last_changed: false,
        }
    }

    /// Validate `compilation` and keep the result as the latest
    pub fn advance(&mut self, compilation: &Compilation) -> Result<&RunResult> {
        let diagnostics = self.generator.analyze(compilation)?;
        Ok(self.record(diagnostics))
    }

    /// Like [`Session::advance`], scanning on tokio tasks
    pub async fn advance_parallel(
        &mut self,
        compilation: &Compilation,
        chunk_size: usize,
    ) -> Result<&RunResult> {
        let diagnostics = self
            .generator
            .analyze_parallel(compilation, chunk_size)
            .await?;
        Ok(self.record(diagnostics))
    }

    fn record(&mut self, diagnostics: Vec<Diagnostic>) -> &RunResult {
        let generator = &self.generator;
        let generated = self
            .generated
            .get_or_insert_with(|| generator.post_initialization_output())
            .clone();

        self.last_changed = self
            .last
            .as_ref()
            .is_none_or(|previous| !same_reports(&previous.diagnostics, &diagnostics));
        self.runs += 1;
        log::debug!(
            "run {}: {} diagnostics{}",
            self.runs,
            diagnostics.len(),
            if self.last_changed { "" } else { " (unchanged)" }
        );

        self.last.insert(RunResult {
            generated_sources: vec![generated],
            diagnostics,
        })
    }

    /// Number of completed runs
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last.as_ref()
    }

    /// Whether the latest run produced different diagnostics than the one
    /// before it; the first run always counts as changed
    pub fn last_run_changed(&self) -> bool {
        self.last_changed
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}

/// Compare what the user sees; file handles differ between compilations
fn same_reports(previous: &[Diagnostic], current: &[Diagnostic]) -> bool {
    previous.len() == current.len()
        && previous.iter().zip(current).all(|(a, b)| {
            a.rule_id == b.rule_id
                && a.severity == b.severity
                && a.message == b.message
                && a.location.path == b.location.path
                && a.location.span == b.location.span
        })
}
