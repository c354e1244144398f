//! Rule Registry
//!
//! Insertion-ordered set of rules. Order matters: a run reports rules in the
//! order they were registered.

use anyhow::{Context, Result};
use std::path::Path;

use super::schema::{parse_rules, Rule};

/// Simple in-memory rule registry
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the embedded `ErrorAttribute` rule
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.add_embedded_rules();
        registry
    }

    /// Add or replace a rule; a replaced rule keeps its position
    pub fn add_rule(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.id() == rule.id()) {
            Some(existing) => {
                log::debug!("replacing rule {}", rule.id());
                *existing = rule;
            }
            None => self.rules.push(rule),
        }
    }

    pub fn get_rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn get_rule_mut(&mut self, id: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.id() == id)
    }

    /// Enable or disable a rule; false when no such rule exists
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.get_rule_mut(id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.rules.iter_mut()
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn list_rules(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Load every rule from one TOML file; returns how many were added
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        let rules = parse_rules(&content)
            .with_context(|| format!("Invalid rule file {}", path.display()))?;

        let count = rules.len();
        for rule in rules {
            self.add_rule(rule);
        }
        log::info!("Loaded {} rules from {}", count, path.display());

        Ok(count)
    }

    /// Load all `*.toml` files in a directory, in file name order
    ///
    /// A missing directory is not an error.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            log::debug!("rule directory {} does not exist", dir.display());
            return Ok(0);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read rule directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut total = 0;
        for path in paths {
            total += self.load_file(&path)?;
        }

        Ok(total)
    }

    /// Add the embedded rule definitions
    pub fn add_embedded_rules(&mut self) {
        let embedded_toml = include_str!("../../resources/rules/error-attribute.toml");

        match parse_rules(embedded_toml) {
            Ok(rules) => {
                for rule in rules {
                    self.add_rule(rule);
                }
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded rules: {}. Using built-in fallback.",
                    e
                );
                self.add_rule(Rule::error_attribute());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use std::io::Write;

    #[test]
    fn test_registry_creation() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.enabled_rules().count(), 0);
    }

    #[test]
    fn test_builtin_rule() {
        let registry = RuleRegistry::with_builtin();
        assert_eq!(registry.list_rules(), vec!["ESG0001"]);
        assert_eq!(registry.get_rule("ESG0001"), Some(&Rule::error_attribute()));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = RuleRegistry::with_builtin();
        let mut second = Rule::error_attribute();
        second.descriptor.id = "ESG0100".to_string();
        registry.add_rule(second);

        registry.add_rule(Rule::error_attribute().with_severity(Severity::Error));

        assert_eq!(registry.list_rules(), vec!["ESG0001", "ESG0100"]);
        assert_eq!(
            registry.get_rule("ESG0001").unwrap().descriptor.severity,
            Severity::Error
        );
    }

    #[test]
    fn test_set_enabled() {
        let mut registry = RuleRegistry::with_builtin();
        assert!(registry.set_enabled("ESG0001", false));
        assert_eq!(registry.enabled_rules().count(), 0);
        assert!(!registry.set_enabled("nonexistent", true));
    }

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();

        let mut b = std::fs::File::create(dir.path().join("b.toml")).unwrap();
        writeln!(
            b,
            "[[rules]]\nid = \"B1\"\ntitle = \"b\"\nattribute = \"B\"\n{}",
            "disallowed_characters = [\"!\"]"
        )
        .unwrap();
        let mut a = std::fs::File::create(dir.path().join("a.toml")).unwrap();
        writeln!(
            a,
            "[[rules]]\nid = \"A1\"\ntitle = \"a\"\nattribute = \"A\"\n{}",
            "disallowed_characters = [\"?\"]"
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = RuleRegistry::new();
        let loaded = registry.load_directory(dir.path()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(registry.list_rules(), vec!["A1", "B1"]);
    }

    #[test]
    fn test_load_missing_directory() {
        let mut registry = RuleRegistry::new();
        let loaded = registry
            .load_directory(Path::new("/nonexistent/attr-check/rules"))
            .unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[[rules]]\nid = \"\"\ntitle = \"t\"\nattribute = \"A\"\ndisallowed_characters = []",
        )
        .unwrap();

        let mut registry = RuleRegistry::new();
        let err = registry.load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid rule file"));
    }
}
