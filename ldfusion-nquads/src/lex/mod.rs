//! N-Quads lexer module.
//!
//! Tokenizes one statement line using winnow.

pub mod chars;
pub mod lexer;

pub use lexer::{tokenize_line, Token, TokenKind};
