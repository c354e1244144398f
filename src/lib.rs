//! Attribute Validator
//!
//! Checks string arguments of attributes for disallowed characters and
//! reports each offending character as a positioned diagnostic.
//!
//! This library provides:
//! - A source model fed by any parser front end (a C#-like one is bundled)
//! - Declarative character-blocklist rules loaded from TOML
//! - The scanner, the diagnostic reporter and a caller-owned session
//! - Configuration and the `attr-check` command-line driver

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod parser;
pub mod rule;
pub mod session;
pub mod source;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticSink, Reporter, Severity};
pub use error::{Error, Result};
pub use generator::{GeneratedSource, Generator, RunResult};
pub use rule::{Rule, RuleRegistry};
pub use session::Session;
pub use source::{AnnotationOccurrence, Compilation, FileId, SourceMap};
pub use validation::{scan, Violation};
