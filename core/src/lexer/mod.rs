//! Source text to tokens. Newlines are significant and kept as tokens.

pub mod cursor;
pub mod scanner;
mod string_scanner;
pub mod token;

use crate::errors::SyntaxError;
pub use token::{Span, Token, TokenKind};

/// Scan `source` into tokens, always terminated by [`TokenKind::Eof`].
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    scanner::Scanner::new(source).scan_tokens()
}
