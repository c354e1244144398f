//! Configuration management for the attribute checker.
//!
//! Handles:
//! - Command-line argument parsing
//! - Rule file and rule directory discovery
//! - Per-run overrides applied on top of loaded rules

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::rule::{MalformedPolicy, PositionMode, RuleRegistry};

/// Environment variable naming an extra rule directory
pub const RULES_DIR_ENV: &str = "ATTR_CHECK_RULES_DIR";

/// How diagnostics are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line arguments for the attribute checker
#[derive(Debug, Parser)]
#[command(name = "attr-check")]
#[command(about = "Check attribute string arguments for disallowed characters")]
#[command(version)]
pub struct Args {
    /// Source files to validate
    pub files: Vec<PathBuf>,

    /// Extra rule files, applied after the rule directories
    #[arg(long = "rules", help = "Rule file in TOML format (repeatable)")]
    pub rules: Vec<PathBuf>,

    /// Directory of rule files
    #[arg(long, help = "Directory containing rule TOML files")]
    pub rules_dir: Option<PathBuf>,

    /// Skip the per-user rule directory
    #[arg(long, help = "Do not load rules from the user config directory")]
    pub no_user_rules: bool,

    #[arg(long, value_enum, help = "Override how violation positions are computed")]
    pub position_mode: Option<PositionMode>,

    #[arg(long, value_enum, help = "Override handling of malformed attribute usages")]
    pub malformed: Option<MalformedPolicy>,

    #[arg(long, value_enum, default_value = "text", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, help = "Scan occurrences on multiple worker tasks")]
    pub parallel: bool,

    #[arg(long, default_value_t = 64, help = "Occurrences per task when scanning in parallel")]
    pub chunk_size: usize,

    #[arg(long, help = "Write the generated ErrorAttribute declaration into this directory")]
    pub emit_attribute: Option<PathBuf>,

    #[arg(long, help = "Exit with failure when warnings are reported")]
    pub deny_warnings: bool,

    /// Log level for the checker
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub files: Vec<PathBuf>,
    /// Rule directories in load order; later ones override earlier ones
    pub rule_dirs: Vec<PathBuf>,
    pub rule_files: Vec<PathBuf>,
    pub position_mode: Option<PositionMode>,
    pub malformed: Option<MalformedPolicy>,
    pub format: OutputFormat,
    pub parallel: bool,
    pub chunk_size: usize,
    pub emit_attribute: Option<PathBuf>,
    pub deny_warnings: bool,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments and environment
    pub fn from_args_and_env() -> Result<Self> {
        let mut config = Self::from_args(Args::parse())?;

        if let Some(dir) = std::env::var_os(RULES_DIR_ENV) {
            config.rule_dirs.push(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let mut rule_dirs = Vec::new();

        // Per-user rules first so explicit ones can override them
        if !args.no_user_rules {
            if let Some(config_dir) = dirs::config_dir() {
                rule_dirs.push(config_dir.join("attr-check").join("rules"));
            }
        }

        if let Some(custom_dir) = args.rules_dir {
            rule_dirs.push(custom_dir);
        }

        if args.chunk_size == 0 {
            anyhow::bail!("--chunk-size must be at least 1");
        }

        Ok(Config {
            files: args.files,
            rule_dirs,
            rule_files: args.rules,
            position_mode: args.position_mode,
            malformed: args.malformed,
            format: args.format,
            parallel: args.parallel,
            chunk_size: args.chunk_size,
            emit_attribute: args.emit_attribute,
            deny_warnings: args.deny_warnings,
            log_level: args.log_level,
        })
    }

    /// Built-in rules, then rule directories, then rule files, then overrides
    pub fn build_registry(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::with_builtin();

        for dir in &self.rule_dirs {
            registry.load_directory(dir)?;
        }
        for file in &self.rule_files {
            registry.load_file(file)?;
        }

        for rule in registry.rules_mut() {
            if let Some(mode) = self.position_mode {
                rule.position_mode = mode;
            }
            if let Some(policy) = self.malformed {
                rule.malformed = policy;
            }
        }

        Ok(registry)
    }
}
