use super::scanner::Scanner;
use super::token::TokenKind;
use crate::errors::SyntaxError;

impl Scanner<'_> {
    pub(super) fn scan_string(&mut self, quote: u8, start: usize) -> Result<TokenKind, SyntaxError> {
        let mut bytes = Vec::new();
        loop {
            match self.cursor.advance() {
                Some(c) if c == quote => break,
                // Single-quoted strings only honour \\ and \'.
                Some(b'\\') if quote == b'\'' => match self.cursor.advance() {
                    Some(c) if c == quote || c == b'\\' => bytes.push(c),
                    Some(c) => bytes.extend_from_slice(&[b'\\', c]),
                    None => return Err(self.unterminated(start)),
                },
                Some(b'\\') => match self.cursor.advance() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'0') => bytes.push(0),
                    Some(c) => bytes.push(c),
                    None => return Err(self.unterminated(start)),
                },
                Some(c) => bytes.push(c),
                None => return Err(self.unterminated(start)),
            }
        }
        Ok(TokenKind::String(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn unterminated(&self, start: usize) -> SyntaxError {
        SyntaxError::new(
            "unterminated string meets end of file",
            self.line_at(start),
            start,
            self.cursor.pos() - start,
        )
    }
}
