//! Source Model
//!
//! Files, host syntax data and the adapter that flattens them into
//! scannable attribute occurrences.

pub mod adapter;
pub mod map;
pub mod syntax;

pub use adapter::{
    extract, extract_all, AnnotationOccurrence, AttributeName, Extraction, MalformedOccurrence,
    MalformedReason,
};
pub use map::{FileId, SourceFile, SourceMap, UnknownFile};
pub use syntax::{
    ArgumentKind, ArgumentValue, AttributeArgument, Compilation, SyntaxOccurrence, UnitSyntax,
};
