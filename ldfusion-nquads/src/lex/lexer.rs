//! N-Quads line lexer implementation using winnow.
//!
//! A statement never spans lines in N-Quads, so the lexer works on one line
//! at a time and reports errors with the caller's line number.

use std::sync::Arc;

use winnow::combinator::{alt, delimited, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::stream::{AsChar, Location};
use winnow::token::{any, take, take_while};
use winnow::{LocatingSlice, ModalResult, Parser};

use super::chars::*;
use crate::error::{NQuadsError, Result};

/// Input type for the lexer - tracks position for column reporting.
pub type Input<'a> = LocatingSlice<&'a str>;

/// A token with its byte offset in the line.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
}

/// Token kinds for N-Quads.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Full IRI: `<http://example.org/>`
    Iri(Arc<str>),

    /// Labeled blank node: `_:name` (label stored without `_:`)
    BlankNodeLabel(Arc<str>),

    /// String literal (unescaped content)
    String(Arc<str>),

    /// Language tag, stored without the `@` prefix
    LangTag(Arc<str>),

    /// Datatype marker `^^`
    DoubleCaret,

    /// Statement terminator `.`
    Dot,
}

/// Tokenize one line.
///
/// Whitespace is skipped and a `#` outside a token starts a comment that runs
/// to the end of the line. Fails on the first invalid token.
pub fn tokenize_line(line: &str, line_number: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut input = LocatingSlice::new(line);

    loop {
        let _: ModalResult<&str, ContextError> = take_while(0.., is_ws).parse_next(&mut input);

        if input.is_empty() || input.starts_with('#') {
            break;
        }

        let start = input.current_token_start();

        match next_token(&mut input) {
            Ok(kind) => tokens.push(Token { kind, start }),
            Err(_) => return Err(make_error(line, line_number, start)),
        }
    }

    Ok(tokens)
}

/// Build a descriptive error with a pointer under the offending character.
fn make_error(line: &str, line_number: usize, position: usize) -> NQuadsError {
    let bad_char = line[position..].chars().next().unwrap_or('?');
    let column = line[..position].chars().count() + 1;
    let pointer = " ".repeat(column - 1);

    let what = match bad_char {
        '"' => "unterminated or invalid string literal".to_string(),
        '<' => "invalid or unterminated IRI".to_string(),
        '_' => "invalid blank node label".to_string(),
        '@' => "invalid language tag".to_string(),
        c => format!("unexpected character '{}'", c.escape_default()),
    };

    NQuadsError::Lexer {
        line: line_number,
        column,
        message: format!("{}\n  |\n  | {}\n  | {}^", what, line, pointer),
    }
}

fn next_token(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    alt((
        "^^".map(|_| TokenKind::DoubleCaret),
        parse_iri_ref,
        parse_blank_node_label,
        parse_string_literal,
        parse_lang_tag,
        '.'.map(|_| TokenKind::Dot),
    ))
    .parse_next(input)
}

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

// =============================================================================
// IRIs
// =============================================================================

/// Parse an IRI reference: `<...>`
fn parse_iri_ref(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    delimited('<', parse_iri_content, '>')
        .map(|s: String| TokenKind::Iri(Arc::from(s)))
        .parse_next(input)
}

fn parse_iri_content(input: &mut Input<'_>) -> ModalResult<String> {
    let mut result = String::new();

    loop {
        let chunk: &str = take_while(0.., is_iri_char).parse_next(input)?;
        result.push_str(chunk);

        if input.is_empty() || input.starts_with('>') {
            break;
        }

        // Only \u and \U escapes are legal inside an IRI
        if input.starts_with("\\u") || input.starts_with("\\U") {
            '\\'.parse_next(input)?;
            result.push(parse_escape_char(input)?);
        } else {
            return backtrack();
        }
    }

    Ok(result)
}

// =============================================================================
// Blank nodes and language tags
// =============================================================================

/// Parse a blank node label: `_:name`
fn parse_blank_node_label(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    preceded("_:", parse_blank_node_name)
        .map(|name: &str| TokenKind::BlankNodeLabel(Arc::from(name)))
        .parse_next(input)
}

/// Label body; `.` is allowed inside but never as the last character.
fn parse_blank_node_name<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    let label_chars = {
        let rest: &str = **input;
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {}
            _ => return backtrack(),
        }

        let mut count: usize = 1;
        let mut last_non_dot = 1;
        for c in chars {
            if is_pn_chars(c) {
                count += 1;
                last_non_dot = count;
            } else if c == '.' {
                count += 1;
            } else {
                break;
            }
        }
        last_non_dot
    };

    take(label_chars).parse_next(input)
}

/// Parse a language tag: `@en`, `@en-US`
fn parse_lang_tag(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    preceded(
        '@',
        (take_while(1.., AsChar::is_alpha), take_while(0.., is_lang_char)).take(),
    )
    .map(|tag: &str| TokenKind::LangTag(Arc::from(tag)))
    .parse_next(input)
}

// =============================================================================
// String literals
// =============================================================================

fn parse_string_literal(input: &mut Input<'_>) -> ModalResult<TokenKind> {
    delimited('"', parse_string_content, '"')
        .map(|s| TokenKind::String(Arc::from(s)))
        .parse_next(input)
}

fn parse_string_content(input: &mut Input<'_>) -> ModalResult<String> {
    let mut result = String::new();

    loop {
        let chunk: &str = take_while(0.., |c| c != '"' && c != '\\' && c != '\n' && c != '\r')
            .parse_next(input)?;
        result.push_str(chunk);

        if input.is_empty() || input.starts_with('"') {
            break;
        }

        if input.starts_with('\\') {
            '\\'.parse_next(input)?;
            result.push(parse_escape_char(input)?);
        } else {
            break;
        }
    }

    Ok(result)
}

fn parse_escape_char(input: &mut Input<'_>) -> ModalResult<char> {
    let c: char = any.parse_next(input)?;
    match c {
        't' => Ok('\t'),
        'b' => Ok('\x08'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        'f' => Ok('\x0C'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        '\\' => Ok('\\'),
        'u' => parse_hex_char(input, 4),
        'U' => parse_hex_char(input, 8),
        _ => backtrack(),
    }
}

fn parse_hex_char(input: &mut Input<'_>, digits: usize) -> ModalResult<char> {
    let hex: &str = take_while(digits..=digits, AsChar::is_hex_digit).parse_next(input)?;
    let code =
        u32::from_str_radix(hex, 16).map_err(|_| ErrMode::Backtrack(ContextError::new()))?;
    char::from_u32(code).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}
