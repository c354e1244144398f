//! Attribute List Syntax
//!
//! Minimal syntax for `[Name(args), Other]` lists in front of declarations.
//! Anything that does not parse cleanly as an attribute list is ignored.

use crate::parser::lexer::{Token, TokenKind};
use crate::source::{ArgumentKind, ArgumentValue, AttributeArgument, SyntaxOccurrence};

/// A bracketed attribute list
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeList {
    /// Byte offset of the opening bracket
    pub start: usize,
    /// Byte offset just past the closing bracket
    pub end: usize,
    /// Explicit target such as `return` or `assembly`
    pub target: Option<String>,
    pub attributes: Vec<Attribute>,
}

/// One attribute inside a list
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Possibly qualified name, e.g. "System.Obsolete"
    pub name: String,
    pub arguments: Vec<AttributeArgument>,
}

impl AttributeList {
    /// Lists aimed at the whole assembly or module have no declaration
    pub fn is_global(&self) -> bool {
        matches!(self.target.as_deref(), Some("assembly" | "module"))
    }
}

/// Where the tokens seen so far allow an attribute list to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    /// Start of file or after `;`, `{`, `}` or another attribute list
    Declaration,
    /// After `(`, `,` or `<`: parameters, enum members, type parameters
    Member,
}

impl Boundary {
    fn after(token: &Token) -> Self {
        match token.kind {
            TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => Boundary::Declaration,
            TokenKind::LParen | TokenKind::Comma => Boundary::Member,
            TokenKind::Other if token.text == "<" => Boundary::Member,
            _ => Boundary::None,
        }
    }
}

/// Collect attribute usages from a token stream
///
/// Consecutive lists belong to the same declaration; each usage reports the
/// offset of the first list as its target start. A list counts at a
/// declaration boundary, or inside parameter, enum member and type
/// parameter lists when the lists are followed by an identifier or keyword.
pub fn collect_occurrences(source: &str, tokens: &[Token]) -> Vec<SyntaxOccurrence> {
    let mut occurrences = Vec::new();
    let mut group: Vec<AttributeList> = Vec::new();
    let mut boundary = Boundary::Declaration;
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];

        if token.kind == TokenKind::LBracket {
            match boundary {
                Boundary::Declaration => {
                    if let Some((list, next)) = parse_attribute_list(source, tokens, index) {
                        if !list.is_global() {
                            group.push(list);
                        }
                        index = next;
                        continue;
                    }
                }
                Boundary::Member => {
                    if let Some((lists, next)) = parse_list_run(source, tokens, index) {
                        group.extend(lists.into_iter().filter(|list| !list.is_global()));
                        index = next;
                        continue;
                    }
                }
                Boundary::None => {}
            }
        }

        // The token after a run of lists is the declaration itself
        flush_group(&mut group, &mut occurrences);
        boundary = Boundary::after(token);
        index += 1;
    }

    // Lists at end of input annotate nothing
    if !group.is_empty() {
        log::trace!("dropping {} trailing attribute lists", group.len());
    }

    occurrences
}

/// Consecutive lists starting at `open`, accepted only when an identifier
/// or keyword follows them
fn parse_list_run(
    source: &str,
    tokens: &[Token],
    open: usize,
) -> Option<(Vec<AttributeList>, usize)> {
    let mut lists = Vec::new();
    let mut index = open;

    while tokens.get(index)?.kind == TokenKind::LBracket {
        let (list, next) = parse_attribute_list(source, tokens, index)?;
        lists.push(list);
        index = next;
    }

    (tokens.get(index)?.kind == TokenKind::Ident).then_some((lists, index))
}

fn flush_group(group: &mut Vec<AttributeList>, occurrences: &mut Vec<SyntaxOccurrence>) {
    let Some(target_start) = group.first().map(|list| list.start) else {
        return;
    };

    for list in group.drain(..) {
        for attribute in list.attributes {
            occurrences.push(SyntaxOccurrence {
                attribute_name: attribute.name,
                target_start,
                arguments: attribute.arguments,
            });
        }
    }
}

/// Parse `[target: A(args), B]` starting at `open`; returns the list and the
/// index of the token after `]`
pub fn parse_attribute_list(
    source: &str,
    tokens: &[Token],
    open: usize,
) -> Option<(AttributeList, usize)> {
    let start = tokens.get(open)?.start;
    let mut index = open + 1;

    let mut target = None;
    if let (Some(name), Some(colon)) = (tokens.get(index), tokens.get(index + 1)) {
        if name.kind == TokenKind::Ident && colon.kind == TokenKind::Colon {
            target = Some(name.text.clone());
            index += 2;
        }
    }

    let mut attributes = Vec::new();
    loop {
        let (attribute, next) = parse_attribute(source, tokens, index)?;
        attributes.push(attribute);
        index = next;

        match tokens.get(index)?.kind {
            TokenKind::Comma => index += 1,
            TokenKind::RBracket => break,
            _ => return None,
        }

        // Trailing comma
        if tokens.get(index)?.kind == TokenKind::RBracket {
            break;
        }
    }

    let close = tokens.get(index)?;
    let list = AttributeList {
        start,
        end: close.end,
        target,
        attributes,
    };

    Some((list, index + 1))
}

fn parse_attribute(source: &str, tokens: &[Token], start: usize) -> Option<(Attribute, usize)> {
    let (name, mut index) = parse_qualified_name(tokens, start)?;

    let mut arguments = Vec::new();
    if tokens.get(index).map(|t| t.kind) == Some(TokenKind::LParen) {
        let close = find_closing_paren(tokens, index)?;
        arguments = parse_arguments(source, &tokens[index + 1..close])?;
        index = close + 1;
    }

    Some((Attribute { name, arguments }, index))
}

fn parse_qualified_name(tokens: &[Token], start: usize) -> Option<(String, usize)> {
    let first = tokens.get(start)?;
    if first.kind != TokenKind::Ident {
        return None;
    }

    let mut name = first.text.clone();
    let mut index = start + 1;

    while let (Some(sep), Some(part)) = (tokens.get(index), tokens.get(index + 1)) {
        let separator = match sep.kind {
            TokenKind::Dot => ".",
            TokenKind::DoubleColon => "::",
            _ => break,
        };
        if part.kind != TokenKind::Ident {
            return None;
        }
        name.push_str(separator);
        name.push_str(&part.text);
        index += 2;
    }

    Some((name, index))
}

fn find_closing_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;

    for (offset, token) in tokens[open..].iter().enumerate() {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (token.kind == TokenKind::RParen).then_some(open + offset);
                }
            }
            TokenKind::Semicolon => return None,
            _ => {}
        }
    }

    None
}

/// Split top-level arguments on commas; `None` when an argument is empty
fn parse_arguments(source: &str, tokens: &[Token]) -> Option<Vec<AttributeArgument>> {
    if tokens.is_empty() {
        return Some(Vec::new());
    }

    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut current = 0;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1)
            }
            TokenKind::Comma if depth == 0 => {
                arguments.push(parse_argument(source, &tokens[current..index])?);
                current = index + 1;
            }
            _ => {}
        }
    }
    arguments.push(parse_argument(source, &tokens[current..])?);

    Some(arguments)
}

fn parse_argument(source: &str, tokens: &[Token]) -> Option<AttributeArgument> {
    let (kind, value_tokens) = match tokens {
        [name, sep, rest @ ..] if name.kind == TokenKind::Ident => match sep.kind {
            TokenKind::Equals => (ArgumentKind::Property(name.text.clone()), rest),
            TokenKind::Colon => (ArgumentKind::NamedConstructor(name.text.clone()), rest),
            _ => (ArgumentKind::Positional, tokens),
        },
        _ => (ArgumentKind::Positional, tokens),
    };

    let value = match (constant_string(value_tokens), value_tokens) {
        (_, []) => return None,
        (Some(text), _) => ArgumentValue::String(text),
        (None, [single]) => ArgumentValue::Other(single.text.clone()),
        (None, [first, .., last]) => {
            ArgumentValue::Other(source[first.start..last.end].to_string())
        }
    };

    Some(AttributeArgument { kind, value })
}

/// `"a"` or `"a" + "b" + ...`, folded into one decoded string
fn constant_string(tokens: &[Token]) -> Option<String> {
    if tokens.len() % 2 == 0 {
        return None;
    }

    let mut text = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if index % 2 == 1 {
            if token.kind != TokenKind::Other || token.text != "+" {
                return None;
            }
        } else if token.kind == TokenKind::Str {
            text.push_str(token.value.as_deref().unwrap_or_default());
        } else {
            return None;
        }
    }

    Some(text)
}
