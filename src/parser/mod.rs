//! Attribute Front End
//!
//! A small parser for C#-like sources that finds attribute usages and the
//! declarations they annotate. Hosts with their own syntax trees can skip
//! this entirely and hand [`SyntaxOccurrence`]s to the adapter directly.

pub mod ast;
pub mod lexer;

pub use ast::{collect_occurrences, parse_attribute_list, Attribute, AttributeList};
pub use lexer::{tokenize, Token, TokenKind};

use crate::source::SyntaxOccurrence;

/// Parse a whole source file into attribute usages
pub fn parse(source: &str) -> Vec<SyntaxOccurrence> {
    let tokens = lexer::tokenize(source);
    ast::collect_occurrences(source, &tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ArgumentValue;

    #[test]
    fn test_parse_simple_attribute() {
        let result = parse("[Error(\"Hello?\")]\nclass C { }");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].attribute_name, "Error");
        assert_eq!(result[0].target_start, 0);
        assert_eq!(
            result[0].arguments[0].value,
            ArgumentValue::String("Hello?".to_string())
        );
    }

    #[test]
    fn test_parse_after_top_level_statements() {
        let source = concat!(
            "// See https://aka.ms/new-console-template for more information\n",
            "using System;\n\n",
            "Console.WriteLine(\"Hello, World!\");\n\n",
            "[Error(\"hello???\")]\n",
            "class C { }"
        );
        let result = parse(source);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].target_start, source.find('[').unwrap());
    }

    #[test]
    fn test_parse_ignores_strings_in_code() {
        let result = parse("class C { string s = \"[Error(\\\"?\\\")]\"; }");
        assert!(result.is_empty());
    }

    #[test]
    fn test_parse_empty_source() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\t").is_empty());
    }
}
