//! Host Syntax Data
//!
//! Plain data a parser front end hands over: which attributes appear where,
//! and what literal arguments they carry. No validation happens here.

use super::map::{FileId, SourceMap};

/// One attribute usage attached to a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxOccurrence {
    /// Attribute name as written (e.g. "Error", "Ns.ErrorAttribute")
    pub attribute_name: String,
    /// Byte offset where the annotated declaration starts
    pub target_start: usize,
    /// Arguments in source order, constructor and property
    pub arguments: Vec<AttributeArgument>,
}

/// A single attribute argument
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArgument {
    pub kind: ArgumentKind,
    pub value: ArgumentValue,
}

/// How an argument binds to the attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    /// `value`
    Positional,
    /// `name: value`, bound to the constructor parameter `name`
    NamedConstructor(String),
    /// `Name = value`, assigned to a field or property
    Property(String),
}

impl ArgumentKind {
    /// Positional and `name:` arguments both reach the constructor
    pub fn is_constructor(&self) -> bool {
        !matches!(self, ArgumentKind::Property(_))
    }
}

/// Argument value as far as the front end could evaluate it
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// A string literal with escapes already decoded
    String(String),
    /// Anything else, kept as raw source text
    Other(String),
}

impl SyntaxOccurrence {
    pub fn new(attribute_name: impl Into<String>, target_start: usize) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            target_start,
            arguments: Vec::new(),
        }
    }

    /// Append a positional string argument
    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.arguments
            .push(AttributeArgument::positional(ArgumentValue::String(value.into())));
        self
    }

    /// Append an arbitrary argument
    pub fn with_argument(mut self, argument: AttributeArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Arguments that bind to constructor parameters
    pub fn constructor_arguments(&self) -> impl Iterator<Item = &AttributeArgument> {
        self.arguments.iter().filter(|arg| arg.kind.is_constructor())
    }
}

impl AttributeArgument {
    pub fn positional(value: ArgumentValue) -> Self {
        Self {
            kind: ArgumentKind::Positional,
            value,
        }
    }

    pub fn named_constructor(name: impl Into<String>, value: ArgumentValue) -> Self {
        Self {
            kind: ArgumentKind::NamedConstructor(name.into()),
            value,
        }
    }

    pub fn property(name: impl Into<String>, value: ArgumentValue) -> Self {
        Self {
            kind: ArgumentKind::Property(name.into()),
            value,
        }
    }

    /// Parameter or property name, if the argument was written with one
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ArgumentKind::Positional => None,
            ArgumentKind::NamedConstructor(name) | ArgumentKind::Property(name) => Some(name),
        }
    }
}

/// Syntax data for one registered file
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSyntax {
    pub file: FileId,
    pub occurrences: Vec<SyntaxOccurrence>,
}

/// Everything a single validation run looks at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    sources: SourceMap,
    units: Vec<UnitSyntax>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a compilation by running the bundled front end over each source
    pub fn from_sources<I, P, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<String>,
    {
        let mut compilation = Self::new();
        for (path, text) in sources {
            compilation.add_parsed(path, text);
        }
        compilation
    }

    /// Register a file together with host-supplied syntax occurrences
    pub fn add_unit(
        &mut self,
        path: impl Into<String>,
        text: impl Into<String>,
        occurrences: Vec<SyntaxOccurrence>,
    ) -> FileId {
        let file = self.sources.add(path, text);
        self.units.push(UnitSyntax { file, occurrences });
        file
    }

    /// Register a file and discover its attributes with the bundled parser
    pub fn add_parsed(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        let text = text.into();
        let occurrences = crate::parser::parse(&text);
        let path = path.into();
        log::debug!("{}: found {} attribute usages", path, occurrences.len());
        self.add_unit(path, text, occurrences)
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn units(&self) -> &[UnitSyntax] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_arguments_skip_properties() {
        let occurrence = SyntaxOccurrence::new("Error", 0)
            .with_string("a")
            .with_argument(AttributeArgument::property(
                "Level",
                ArgumentValue::Other("2".to_string()),
            ));

        let positional: Vec<_> = occurrence.constructor_arguments().collect();
        assert_eq!(positional.len(), 1);
        assert_eq!(positional[0].value, ArgumentValue::String("a".to_string()));
    }

    #[test]
    fn test_named_constructor_argument_counts() {
        let occurrence = SyntaxOccurrence::new("Error", 0).with_argument(
            AttributeArgument::named_constructor("message", ArgumentValue::String("b".into())),
        );

        let arguments: Vec<_> = occurrence.constructor_arguments().collect();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].name(), Some("message"));
    }

    #[test]
    fn test_add_unit_keeps_order() {
        let mut compilation = Compilation::new();
        let a = compilation.add_unit("a.cs", "", vec![]);
        let b = compilation.add_unit("b.cs", "", vec![SyntaxOccurrence::new("Error", 0)]);

        let files: Vec<_> = compilation.units().iter().map(|u| u.file).collect();
        assert_eq!(files, vec![a, b]);
        assert_eq!(compilation.sources().len(), 2);
    }

    #[test]
    fn test_add_parsed_uses_front_end() {
        let mut compilation = Compilation::new();
        compilation.add_parsed("file.cs", "[Error(\"Hello?\")]\nclass C { }");

        let unit = &compilation.units()[0];
        assert_eq!(unit.occurrences.len(), 1);
        assert_eq!(unit.occurrences[0].attribute_name, "Error");
        assert_eq!(unit.occurrences[0].target_start, 0);
    }
}
