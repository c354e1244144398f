//! Rule Configuration
//!
//! Declarative character-blocklist rules, loaded from TOML or built in.

pub mod registry;
pub mod schema;

pub use registry::RuleRegistry;
pub use schema::{parse_rules, MalformedPolicy, PositionMode, Rule, RuleDef, RuleError, RuleFile};
