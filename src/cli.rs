//! Command-line driver for `attr-check`

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use crate::config::{Config, OutputFormat};
use crate::diagnostics::{Diagnostic, Severity};
use crate::generator::{GeneratedSource, Generator, RunResult};
use crate::session::Session;
use crate::source::{Compilation, SourceMap};

/// Parse arguments, validate the given files and print diagnostics
pub async fn run() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    let outcome = check(&config).await?;
    print!("{}", render(&outcome, config.format)?);

    if let Some(dir) = &config.emit_attribute {
        for source in &outcome.result.generated_sources {
            write_generated(dir, source).await?;
        }
    }

    if should_fail(&outcome.result, config.deny_warnings) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Initialize `env_logger`; `RUST_LOG` wins over the configured level
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

/// Inputs and output of one checker invocation
#[derive(Debug, Clone)]
pub struct Outcome {
    pub compilation: Compilation,
    pub result: RunResult,
}

/// Read every configured file and run the configured rules once
pub async fn check(config: &Config) -> Result<Outcome> {
    if config.files.is_empty() && config.emit_attribute.is_none() {
        anyhow::bail!("no input files");
    }

    let registry = config.build_registry()?;
    log::info!("Active rules: {}", registry.list_rules().join(", "));

    let mut compilation = Compilation::new();
    for path in &config.files {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        compilation.add_parsed(path.display().to_string(), text);
    }

    let mut session = Session::new(Generator::new(registry));
    let result = if config.parallel {
        session
            .advance_parallel(&compilation, config.chunk_size)
            .await?
            .clone()
    } else {
        session.advance(&compilation)?.clone()
    };

    log::info!(
        "{} files checked: {} errors, {} warnings",
        compilation.sources().len(),
        result.count(Severity::Error),
        result.count(Severity::Warning)
    );

    Ok(Outcome {
        compilation,
        result,
    })
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
    line: usize,
    column: usize,
}

/// Format diagnostics for output
pub fn render(outcome: &Outcome, format: OutputFormat) -> Result<String> {
    let sources = outcome.compilation.sources();
    let diagnostics = &outcome.result.diagnostics;

    match format {
        OutputFormat::Text => Ok(diagnostics
            .iter()
            .map(|d| format!("{}\n", d.render(sources)))
            .collect()),
        OutputFormat::Json => {
            let entries: Vec<_> = diagnostics
                .iter()
                .map(|d| json_entry(sources, d))
                .collect();
            let mut json = serde_json::to_string_pretty(&entries)
                .context("Failed to serialize diagnostics")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn json_entry<'a>(sources: &SourceMap, diagnostic: &'a Diagnostic) -> JsonDiagnostic<'a> {
    let (line, column) = sources
        .get(diagnostic.location.file)
        .map(|file| file.line_col(diagnostic.location.span.start))
        .unwrap_or((0, 0));

    JsonDiagnostic {
        diagnostic,
        line,
        column,
    }
}

/// Errors always fail the run; warnings only under `deny_warnings`
pub fn should_fail(result: &RunResult, deny_warnings: bool) -> bool {
    result.has_errors() || (deny_warnings && result.count(Severity::Warning) > 0)
}

async fn write_generated(dir: &Path, source: &GeneratedSource) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(&source.hint_name);
    tokio::fs::write(&path, &source.text)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use clap::Parser;

    fn config_for(args: &[&str]) -> Config {
        let argv = ["attr-check", "--no-user-rules"].into_iter().chain(args.iter().copied());
        Config::from_args(Args::parse_from(argv)).unwrap()
    }

    #[tokio::test]
    async fn test_check_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.cs");
        std::fs::write(&path, "[Error(\"Hello??\")]\nclass C { }").unwrap();

        let config = config_for(&[path.to_str().unwrap()]);
        let outcome = check(&config).await.unwrap();

        assert_eq!(outcome.result.diagnostics.len(), 2);
        let text = render(&outcome, OutputFormat::Text).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let message = "warning[ESG0001]: Illegal character '?' in message \"Hello??\"";
        assert!(lines[0].ends_with(&format!(":1:1: {}", message)));
        assert!(lines[1].ends_with(&format!(":1:2: {}", message)));
    }

    #[tokio::test]
    async fn test_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.cs");
        std::fs::write(&path, "\n[Error(\"a?\")] class C { }").unwrap();

        let config = config_for(&["--format", "json", path.to_str().unwrap()]);
        let outcome = check(&config).await.unwrap();
        let json = render(&outcome, config.format).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["rule_id"], "ESG0001");
        assert_eq!(first["severity"], "warning");
        assert_eq!(first["line"], 2);
        assert_eq!(first["column"], 1);
        assert_eq!(first["location"]["span"]["start"], 1);
        assert_eq!(first["location"]["span"]["length"], 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let config = config_for(&["/nonexistent/file.cs"]);
        let err = check(&config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_no_input_is_an_error() {
        let config = config_for(&[]);
        assert!(check(&config).await.is_err());
    }

    #[test]
    fn test_should_fail() {
        let clean = RunResult::default();
        assert!(!should_fail(&clean, true));

        let compilation = Compilation::from_sources([("f.cs", "[Error(\"?\")] class C { }")]);
        let warned = Generator::default().run(&compilation).unwrap();
        assert!(!should_fail(&warned, false));
        assert!(should_fail(&warned, true));
    }
}
