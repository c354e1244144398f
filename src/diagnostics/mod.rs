//! Diagnostics
//!
//! Diagnostic types, sinks and the reporter that turns scanner output into
//! positioned messages.

pub mod diagnostic;
pub mod reporter;

pub use diagnostic::{
    format_message, Diagnostic, DiagnosticCollector, DiagnosticSink, Location, RuleDescriptor,
    Severity, Span, ILLEGAL_CHARACTER_ID, MALFORMED_ARGUMENTS_ID,
};
pub use reporter::{ReportError, Reporter};
