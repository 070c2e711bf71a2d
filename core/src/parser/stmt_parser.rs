use super::Parser;
use super::ast::Stmt;
use crate::errors::SyntaxError;
use crate::lexer::token::TokenKind;

impl Parser {
    /// Statements up to (not including) `end` or end of input.
    pub(crate) fn parse_statements(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut body = Vec::new();
        loop {
            while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
                self.advance();
            }
            if matches!(self.peek(), TokenKind::End | TokenKind::Eof) {
                break;
            }
            body.push(self.parse_statement()?);
            if !matches!(
                self.peek(),
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::End | TokenKind::Eof
            ) {
                return Err(self.error_here(format!(
                    "unexpected {:?}, expecting end of statement",
                    self.peek()
                )));
            }
        }
        Ok(body)
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek() {
            TokenKind::Class => self.parse_class(false),
            TokenKind::Module => self.parse_class(true),
            TokenKind::Def => self.parse_def(),
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_class(&mut self, is_module: bool) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line; // consume 'class' or 'module'
        let name = self.expect_constant()?;
        let superclass = if !is_module && self.check(&TokenKind::Less) {
            self.advance(); // consume '<'
            Some(self.expect_constant()?)
        } else {
            None
        };

        let body = self.with_scope(&[], |p| p.parse_statements())?;
        let end_line = self.expect(&TokenKind::End)?.line;
        Ok(Stmt::Class {
            name,
            superclass,
            is_module,
            body,
            line,
            end_line,
        })
    }

    fn parse_def(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.advance().line; // consume 'def'
        let singleton = if self.check(&TokenKind::SelfKw) && self.peek_next() == &TokenKind::Dot {
            self.advance(); // consume 'self'
            self.advance(); // consume '.'
            true
        } else {
            false
        };
        let name = self.expect_ident()?;

        let mut params = Vec::new();
        if self.check(&TokenKind::LeftParen) {
            self.advance(); // consume '('
            self.skip_newlines();
            if !self.check(&TokenKind::RightParen) {
                loop {
                    let param = self.expect_ident()?;
                    if params.contains(&param) {
                        return Err(self.error_here(format!("duplicated argument name '{param}'")));
                    }
                    params.push(param);
                    self.skip_newlines();
                    if !self.check(&TokenKind::Comma) {
                        break;
                    }
                    self.advance(); // consume ','
                    self.skip_newlines();
                }
            }
            self.expect(&TokenKind::RightParen)?;
        }

        let body = self.with_scope(&params, |p| p.parse_statements())?;
        let end_line = self.expect(&TokenKind::End)?.line;
        Ok(Stmt::Def {
            name,
            singleton,
            params,
            body,
            line,
            end_line,
        })
    }
}
