use super::cursor::Cursor;
use super::token::{Span, Token, TokenKind};
use crate::diagnostics::source_map::SourceMap;
use crate::errors::SyntaxError;

/// Scans source code into a sequence of tokens.
pub struct Scanner<'src> {
    pub(super) cursor: Cursor<'src>,
    source_map: SourceMap,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source_map: SourceMap::from_source(source),
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            self.skip_blanks_and_comments();
            if self.cursor.is_at_end() {
                break;
            }
            let token = self.scan_token()?;
            // Blank lines collapse into a single terminator.
            if token.kind == TokenKind::Newline
                && tokens
                    .last()
                    .is_none_or(|prev| prev.kind == TokenKind::Newline)
            {
                continue;
            }
            tokens.push(token);
        }

        let eof_pos = self.cursor.pos();
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(eof_pos, eof_pos),
            line: self.line_at(eof_pos),
        });

        Ok(tokens)
    }

    pub(super) fn line_at(&self, offset: usize) -> usize {
        self.source_map.byte_to_pos(offset).line
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.cursor.advance();
                }
                Some(b'\\') if self.cursor.peek_next() == Some(b'\n') => {
                    // Explicit line continuation.
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(b'#') => {
                    self.cursor.eat_while(|b| b != b'\n');
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.cursor.pos();
        let Some(ch) = self.cursor.advance() else {
            return Err(SyntaxError::new(
                "unexpected end of input",
                self.line_at(start),
                start,
                0,
            ));
        };

        let kind = match ch {
            b'\n' => TokenKind::Newline,
            b';' => TokenKind::Semicolon,
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'<' => TokenKind::Less,
            b'=' => TokenKind::Assign,
            b'"' | b'\'' => self.scan_string(ch, start)?,
            c if c.is_ascii_digit() => self.scan_integer(start)?,
            c if is_ident_start(c) => self.scan_identifier(start),
            _ => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", ch as char),
                    self.line_at(start),
                    start,
                    1,
                ));
            }
        };

        let end = self.cursor.pos();
        Ok(Token {
            kind,
            span: Span::new(start, end),
            line: self.line_at(start),
        })
    }

    fn scan_integer(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == b'_');

        let text = self.cursor.slice_from(start).replace('_', "");
        text.parse::<i64>().map(TokenKind::Integer).map_err(|_| {
            SyntaxError::new(
                format!("integer literal '{text}' out of range"),
                self.line_at(start),
                start,
                self.cursor.pos() - start,
            )
        })
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        self.cursor.eat_while(is_ident_continue);
        // Predicate and bang method names.
        if matches!(self.cursor.peek(), Some(b'?' | b'!')) && self.cursor.peek_next() != Some(b'=')
        {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        match text.as_str() {
            "class" => TokenKind::Class,
            "module" => TokenKind::Module,
            "def" => TokenKind::Def,
            "end" => TokenKind::End,
            "self" => TokenKind::SelfKw,
            "nil" => TokenKind::Nil,
            _ if text.starts_with(|c: char| c.is_ascii_uppercase()) => TokenKind::Constant(text),
            _ => TokenKind::Ident(text),
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}
