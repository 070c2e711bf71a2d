pub mod ast;
mod expr_parser;
mod stmt_parser;

use std::collections::HashSet;

use crate::errors::SyntaxError;
use crate::lexer::token::{Span, Token, TokenKind};
use ast::Program;

/// Parse a token stream into a Program AST.
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

/// Recursive-descent parser over a token stream.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Local variable names per lexical scope (top level, class body, method body).
    scopes: Vec<HashSet<String>>,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|token| token.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |token| token.span.end);
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
                line,
            });
        }
        Self {
            tokens,
            pos: 0,
            scopes: vec![HashSet::new()],
        }
    }

    fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let body = self.parse_statements()?;
        if !self.is_at_end() {
            return Err(self.error_here(format!("unexpected {:?}", self.peek())));
        }
        Ok(Program {
            body,
            end_line: self.current().line,
        })
    }

    pub(crate) fn current(&self) -> &Token {
        // new() guarantees a trailing Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn peek_next(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, SyntaxError> {
        if self.peek() == expected {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected {:?}, found {:?}",
                expected,
                self.peek()
            )))
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected identifier, found {other:?}"))),
        }
    }

    pub(crate) fn expect_constant(&mut self) -> Result<String, SyntaxError> {
        match self.peek().clone() {
            TokenKind::Constant(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected constant name, found {other:?}"))),
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let token = self.current();
        SyntaxError::new(
            message,
            token.line,
            token.span.start,
            token.span.len().max(1),
        )
    }

    pub(crate) fn is_local(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains(name))
    }

    pub(crate) fn declare_local(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    pub(crate) fn with_scope<T>(
        &mut self,
        locals: &[String],
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        self.scopes.push(locals.iter().cloned().collect());
        let out = f(self);
        self.scopes.pop();
        out
    }
}
