//! Source Model Adapter
//!
//! Turns host syntax data into the flat occurrences the scanner works on.
//! Usages that do not carry exactly one string constructor argument are set
//! aside rather than treated as errors.

use super::map::FileId;
use super::syntax::{ArgumentValue, Compilation, SyntaxOccurrence};

/// One usage of the rule-bearing attribute, ready to scan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationOccurrence {
    pub file: FileId,
    pub target_start_offset: usize,
    pub argument_text: String,
}

/// Why a usage was excluded from scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    NoArguments,
    TooManyArguments(usize),
    NonStringArgument,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::NoArguments => write!(f, "no arguments"),
            MalformedReason::TooManyArguments(count) => write!(f, "{} arguments", count),
            MalformedReason::NonStringArgument => write!(f, "argument is not a string literal"),
        }
    }
}

/// A usage of the attribute that cannot be scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedOccurrence {
    pub file: FileId,
    pub target_start_offset: usize,
    pub attribute_name: String,
    pub reason: MalformedReason,
}

/// Result of adapting a compilation for one attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub occurrences: Vec<AnnotationOccurrence>,
    pub malformed: Vec<MalformedOccurrence>,
}

/// Attribute metadata name and the spellings that refer to it
///
/// `ErrorAttribute` is matched by `Error`, `ErrorAttribute` and any
/// namespace-qualified form of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeName {
    full: String,
    short: Option<String>,
}

impl AttributeName {
    pub fn new(metadata_name: &str) -> Self {
        let full = last_segment(metadata_name).to_string();
        let short = full
            .strip_suffix("Attribute")
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self { full, short }
    }

    pub fn metadata_name(&self) -> &str {
        &self.full
    }

    /// Check whether a name as written in source refers to this attribute
    pub fn matches(&self, written: &str) -> bool {
        let name = last_segment(written);
        name == self.full || self.short.as_deref() == Some(name)
    }
}

fn last_segment(name: &str) -> &str {
    let name = name.trim();
    let name = name.rsplit("::").next().unwrap_or(name);
    name.rsplit('.').next().unwrap_or(name)
}

/// Extract scannable occurrences for `attribute`, dropping malformed usages
pub fn extract(compilation: &Compilation, attribute: &AttributeName) -> Vec<AnnotationOccurrence> {
    extract_all(compilation, attribute).occurrences
}

/// Extract occurrences for `attribute`, keeping malformed usages separately
///
/// Output follows file registration order, then source order within a file.
pub fn extract_all(compilation: &Compilation, attribute: &AttributeName) -> Extraction {
    let mut extraction = Extraction::default();

    for unit in compilation.units() {
        for occurrence in &unit.occurrences {
            if !attribute.matches(&occurrence.attribute_name) {
                continue;
            }

            match single_string_argument(occurrence) {
                Ok(text) => extraction.occurrences.push(AnnotationOccurrence {
                    file: unit.file,
                    target_start_offset: occurrence.target_start,
                    argument_text: text.to_string(),
                }),
                Err(reason) => {
                    log::debug!(
                        "skipping '{}' at offset {}: {}",
                        occurrence.attribute_name,
                        occurrence.target_start,
                        reason
                    );
                    extraction.malformed.push(MalformedOccurrence {
                        file: unit.file,
                        target_start_offset: occurrence.target_start,
                        attribute_name: occurrence.attribute_name.clone(),
                        reason,
                    });
                }
            }
        }
    }

    extraction
}

fn single_string_argument(occurrence: &SyntaxOccurrence) -> Result<&str, MalformedReason> {
    let mut arguments = occurrence.constructor_arguments();
    let first = arguments.next().ok_or(MalformedReason::NoArguments)?;

    let extra = arguments.count();
    if extra > 0 {
        return Err(MalformedReason::TooManyArguments(extra + 1));
    }

    match &first.value {
        ArgumentValue::String(text) => Ok(text.as_str()),
        ArgumentValue::Other(_) => Err(MalformedReason::NonStringArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::syntax::AttributeArgument;

    fn error_attribute() -> AttributeName {
        AttributeName::new("ErrorAttribute")
    }

    #[test]
    fn test_attribute_name_spellings() {
        let name = error_attribute();
        assert!(name.matches("Error"));
        assert!(name.matches("ErrorAttribute"));
        assert!(name.matches("My.Namespace.Error"));
        assert!(name.matches("global::My.ErrorAttribute"));
        assert!(!name.matches("Errors"));
        assert!(!name.matches("Obsolete"));
    }

    #[test]
    fn test_attribute_name_without_suffix() {
        let name = AttributeName::new("Check");
        assert!(name.matches("Check"));
        assert!(!name.matches("CheckAttribute"));

        // A bare "Attribute" has no short form
        let bare = AttributeName::new("Attribute");
        assert!(bare.matches("Attribute"));
        assert!(!bare.matches(""));
    }

    #[test]
    fn test_extract_single_string() {
        let mut compilation = Compilation::new();
        let file = compilation.add_unit(
            "a.cs",
            "",
            vec![SyntaxOccurrence::new("Error", 12).with_string("Hello?")],
        );

        let occurrences = extract(&compilation, &error_attribute());
        assert_eq!(
            occurrences,
            vec![AnnotationOccurrence {
                file,
                target_start_offset: 12,
                argument_text: "Hello?".to_string(),
            }]
        );
    }

    #[test]
    fn test_extract_skips_malformed() {
        let mut compilation = Compilation::new();
        compilation.add_unit(
            "a.cs",
            "",
            vec![
                SyntaxOccurrence::new("Error", 0),
                SyntaxOccurrence::new("Error", 10).with_string("a").with_string("b"),
                SyntaxOccurrence::new("Error", 20).with_argument(AttributeArgument::positional(
                    ArgumentValue::Other("42".to_string()),
                )),
                SyntaxOccurrence::new("Obsolete", 30).with_string("?"),
                SyntaxOccurrence::new("Error", 40).with_string("ok"),
            ],
        );

        let extraction = extract_all(&compilation, &error_attribute());
        assert_eq!(extraction.occurrences.len(), 1);
        assert_eq!(extraction.occurrences[0].target_start_offset, 40);

        let reasons: Vec<_> = extraction.malformed.iter().map(|m| m.reason).collect();
        assert_eq!(
            reasons,
            vec![
                MalformedReason::NoArguments,
                MalformedReason::TooManyArguments(2),
                MalformedReason::NonStringArgument,
            ]
        );
    }

    #[test]
    fn test_property_assignments_do_not_count() {
        let mut compilation = Compilation::new();
        compilation.add_unit(
            "a.cs",
            "",
            vec![SyntaxOccurrence::new("Error", 0)
                .with_string("x?")
                .with_argument(AttributeArgument::property(
                    "Message",
                    ArgumentValue::String("y".to_string()),
                ))],
        );

        let occurrences = extract(&compilation, &error_attribute());
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].argument_text, "x?");
    }

    #[test]
    fn test_named_constructor_argument_is_scanned() {
        let mut compilation = Compilation::new();
        compilation.add_unit(
            "a.cs",
            "",
            vec![
                SyntaxOccurrence::new("Error", 0).with_argument(
                    AttributeArgument::named_constructor(
                        "message",
                        ArgumentValue::String("Hello?".to_string()),
                    ),
                ),
                SyntaxOccurrence::new("Error", 20)
                    .with_string("a")
                    .with_argument(AttributeArgument::named_constructor(
                        "extra",
                        ArgumentValue::String("b".to_string()),
                    )),
            ],
        );

        let extraction = extract_all(&compilation, &error_attribute());
        assert_eq!(extraction.occurrences.len(), 1);
        assert_eq!(extraction.occurrences[0].argument_text, "Hello?");
        assert_eq!(
            extraction.malformed[0].reason,
            MalformedReason::TooManyArguments(2)
        );
    }

    #[test]
    fn test_extract_preserves_file_order() {
        let mut compilation = Compilation::new();
        let a = compilation.add_unit(
            "a.cs",
            "",
            vec![SyntaxOccurrence::new("Error", 5).with_string("1")],
        );
        let b = compilation.add_unit(
            "b.cs",
            "",
            vec![
                SyntaxOccurrence::new("Error", 1).with_string("2"),
                SyntaxOccurrence::new("Error", 9).with_string("3"),
            ],
        );

        let files: Vec<_> = extract(&compilation, &error_attribute())
            .into_iter()
            .map(|o| (o.file, o.argument_text))
            .collect();
        assert_eq!(
            files,
            vec![
                (a, "1".to_string()),
                (b, "2".to_string()),
                (b, "3".to_string())
            ]
        );
    }
}
