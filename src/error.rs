//! Library error type

use crate::diagnostics::ReportError;
use crate::rule::RuleError;
use crate::validation::ScanError;

/// Errors surfaced by a validation run
///
/// Rule violations are never errors; they come back as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
