//! Source Lexer
//!
//! Tokenizes C#-like source just far enough to find attribute lists.
//! Every token keeps its byte span; comments, whitespace and preprocessor
//! lines are dropped.

/// Token types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    /// `::` alias qualifier
    DoubleColon,
    Dot,
    Equals,
    /// Identifier or keyword
    Ident,
    /// Constant string literal (regular, verbatim or raw)
    Str,
    /// Numbers, chars, interpolated strings
    Literal,
    /// Operators and anything unrecognized
    Other,
}

/// A token with its source text and byte span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Decoded value, only set for [`TokenKind::Str`]
    pub value: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, source: &str, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: source[start..end].to_string(),
            start,
            end,
            value: None,
        }
    }
}

struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.pos..].starts_with(prefix)
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn skip_line(&mut self) {
        self.eat_while(|c| c != '\n');
    }
}

/// Tokenize a whole source file
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = Cursor { source, pos: 0 };
    let mut at_line_start = true;

    while let Some(ch) = cursor.peek() {
        let start = cursor.pos;

        if ch == '\n' {
            cursor.bump();
            at_line_start = true;
            continue;
        }
        if ch.is_whitespace() {
            cursor.bump();
            continue;
        }

        // Preprocessor directives occupy the rest of the line
        if ch == '#' && at_line_start {
            cursor.skip_line();
            continue;
        }
        at_line_start = false;

        if cursor.starts_with("//") {
            cursor.skip_line();
            continue;
        }
        if cursor.starts_with("/*") {
            cursor.pos += 2;
            match source[cursor.pos..].find("*/") {
                Some(end) => cursor.pos += end + 2,
                None => cursor.pos = source.len(),
            }
            continue;
        }

        let token = match ch {
            '"' if cursor.starts_with("\"\"\"") => lex_raw_string(&mut cursor),
            '"' => lex_regular_string(&mut cursor),
            '@' if cursor.peek_nth(1) == Some('"') => lex_verbatim_string(&mut cursor),
            '$' | '@' if matches!(cursor.peek_nth(1), Some('"' | '$' | '@')) => {
                lex_interpolated_string(&mut cursor)
            }
            '\'' => lex_char_literal(&mut cursor),
            c if c.is_ascii_digit() => {
                cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
                Token::new(TokenKind::Literal, source, start, cursor.pos)
            }
            c if is_ident_start(c)
                || (c == '@' && cursor.peek_nth(1).is_some_and(is_ident_start)) =>
            {
                cursor.bump();
                cursor.eat_while(is_ident_continue);
                Token::new(TokenKind::Ident, source, start, cursor.pos)
            }
            _ => lex_punctuation(&mut cursor),
        };

        tokens.push(token);
    }

    tokens
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn lex_punctuation(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    let ch = cursor.bump().unwrap_or_default();

    let kind = match ch {
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        '.' => TokenKind::Dot,
        ':' if cursor.peek() == Some(':') => {
            cursor.bump();
            TokenKind::DoubleColon
        }
        ':' => TokenKind::Colon,
        '=' if matches!(cursor.peek(), Some('=' | '>')) => {
            cursor.bump();
            TokenKind::Other
        }
        '=' => TokenKind::Equals,
        _ => TokenKind::Other,
    };

    Token::new(kind, cursor.source, start, cursor.pos)
}

/// `"..."` with backslash escapes; unterminated literals end at the line break
fn lex_regular_string(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    cursor.bump();

    let mut value = String::new();
    let mut terminated = false;

    while let Some(ch) = cursor.peek() {
        match ch {
            '"' => {
                cursor.bump();
                terminated = true;
                break;
            }
            '\n' => break,
            '\\' => {
                cursor.bump();
                decode_escape(cursor, &mut value);
            }
            _ => {
                cursor.bump();
                value.push(ch);
            }
        }
    }

    string_token(cursor, start, terminated.then_some(value))
}

fn decode_escape(cursor: &mut Cursor<'_>, value: &mut String) {
    let Some(ch) = cursor.bump() else {
        value.push('\\');
        return;
    };

    let decoded = match ch {
        '\'' => '\'',
        '"' => '"',
        '\\' => '\\',
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        'u' => return decode_hex(cursor, value, 4, 4, 'u'),
        'U' => return decode_hex(cursor, value, 8, 8, 'U'),
        'x' => return decode_hex(cursor, value, 1, 4, 'x'),
        other => {
            value.push('\\');
            other
        }
    };
    value.push(decoded);
}

fn decode_hex(cursor: &mut Cursor<'_>, value: &mut String, min: usize, max: usize, marker: char) {
    let rest = &cursor.source[cursor.pos..];
    let digits: String = rest
        .chars()
        .take(max)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();

    let decoded = if digits.len() >= min {
        u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
    } else {
        None
    };

    match decoded {
        Some(ch) => {
            cursor.pos += digits.len();
            value.push(ch);
        }
        None => {
            value.push('\\');
            value.push(marker);
        }
    }
}

/// `@"..."` where `""` stands for a single quote
fn lex_verbatim_string(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    cursor.pos += 2;

    let mut value = String::new();
    let mut terminated = false;

    while let Some(ch) = cursor.bump() {
        if ch == '"' {
            if cursor.peek() == Some('"') {
                cursor.bump();
                value.push('"');
                continue;
            }
            terminated = true;
            break;
        }
        value.push(ch);
    }

    string_token(cursor, start, terminated.then_some(value))
}

/// `"""..."""` with three or more delimiting quotes
fn lex_raw_string(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    let quotes = cursor.source[start..]
        .chars()
        .take_while(|&c| c == '"')
        .count();
    let delimiter = "\"".repeat(quotes);
    cursor.pos += quotes;

    let content_start = cursor.pos;
    let value = match cursor.source[content_start..].find(&delimiter) {
        Some(len) => {
            cursor.pos = content_start + len + quotes;
            // Extra closing quotes belong to the delimiter run
            cursor.eat_while(|c| c == '"');
            raw_string_value(&cursor.source[content_start..content_start + len])
        }
        None => {
            cursor.pos = cursor.source.len();
            None
        }
    };

    string_token(cursor, start, value)
}

/// Apply raw string rules: single-line content is taken as is; multi-line
/// content drops the opening and closing lines and the closing line's
/// indentation from every line.
fn raw_string_value(content: &str) -> Option<String> {
    if !content.contains('\n') {
        return Some(content.to_string());
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let (first, rest) = lines.split_first()?;
    let (last, body) = rest.split_last()?;
    if !first.trim().is_empty() || !last.trim().is_empty() {
        return None;
    }

    let indent = last.trim_end_matches('\r');
    let dedented: Vec<&str> = body
        .iter()
        .map(|line| {
            let line = line.trim_end_matches('\r');
            line.strip_prefix(indent).unwrap_or(line.trim_start())
        })
        .collect();

    Some(dedented.join("\n"))
}

fn lex_interpolated_string(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    cursor.eat_while(|c| c == '$' || c == '@');

    let verbatim = cursor.source[start..cursor.pos].contains('@');
    if cursor.peek() == Some('"') {
        cursor.bump();
    }

    let mut depth = 0usize;
    while let Some(ch) = cursor.bump() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '\\' if !verbatim => {
                cursor.bump();
            }
            '"' if verbatim && cursor.peek() == Some('"') => {
                cursor.bump();
            }
            '"' if depth == 0 => break,
            '\n' if !verbatim && depth == 0 => break,
            _ => {}
        }
    }

    Token::new(TokenKind::Literal, cursor.source, start, cursor.pos)
}

fn lex_char_literal(cursor: &mut Cursor<'_>) -> Token {
    let start = cursor.pos;
    cursor.bump();

    while let Some(ch) = cursor.peek() {
        match ch {
            '\'' => {
                cursor.bump();
                break;
            }
            '\n' => break,
            '\\' => {
                cursor.bump();
                cursor.bump();
            }
            _ => {
                cursor.bump();
            }
        }
    }

    Token::new(TokenKind::Literal, cursor.source, start, cursor.pos)
}

/// Unterminated strings still produce a token, just not a constant one
fn string_token(cursor: &Cursor<'_>, start: usize, value: Option<String>) -> Token {
    let mut token = Token::new(TokenKind::Literal, cursor.source, start, cursor.pos);
    if let Some(value) = value {
        token.kind = TokenKind::Str;
        token.value = Some(value);
    }
    token
}
