use super::Parser;
use super::ast::{Expr, ExprKind};
use crate::errors::SyntaxError;
use crate::lexer::token::TokenKind;

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        if let TokenKind::Ident(name) = self.peek().clone() {
            if self.peek_next() == &TokenKind::Assign {
                let line = self.advance().line;
                self.advance(); // consume '='
                self.skip_newlines();
                let value = self.parse_expr()?;
                self.declare_local(&name);
                return Ok(Expr::new(
                    ExprKind::Assign {
                        name,
                        value: Box::new(value),
                    },
                    line,
                ));
            }
            if !self.is_local(&name) && self.peek_next().begins_argument() {
                return self.parse_command_call(name);
            }
        }
        self.parse_postfix()
    }

    /// `name arg, arg` without parentheses, receiver is self.
    fn parse_command_call(&mut self, method: String) -> Result<Expr, SyntaxError> {
        let line = self.advance().line;
        let mut args = vec![self.parse_expr()?];
        while self.check(&TokenKind::Comma) {
            self.advance(); // consume ','
            self.skip_newlines();
            args.push(self.parse_expr()?);
        }
        Ok(Expr::new(
            ExprKind::Call {
                receiver: None,
                method,
                args,
            },
            line,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            // Leading-dot chains continue across newlines.
            if self.check(&TokenKind::Newline) && self.peek_next() == &TokenKind::Dot {
                self.advance();
            }
            if !self.check(&TokenKind::Dot) {
                break;
            }
            self.advance(); // consume '.'
            self.skip_newlines();
            let token = self.advance();
            let method = match token.kind {
                TokenKind::Ident(name) | TokenKind::Constant(name) => name,
                TokenKind::Class => "class".to_string(),
                other => {
                    return Err(SyntaxError::new(
                        format!("expected method name after '.', found {other:?}"),
                        token.line,
                        token.span.start,
                        token.span.len().max(1),
                    ));
                }
            };
            let args = self.parse_paren_args()?;
            expr = Expr::new(
                ExprKind::Call {
                    receiver: Some(Box::new(expr)),
                    method,
                    args,
                },
                token.line,
            );
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.advance();
        let line = token.line;
        let kind = match token.kind {
            TokenKind::Integer(value) => ExprKind::Integer(value),
            TokenKind::String(value) => ExprKind::Str(value),
            TokenKind::Nil => ExprKind::Nil,
            TokenKind::SelfKw => ExprKind::SelfRef,
            TokenKind::Constant(name) => ExprKind::Const(name),
            TokenKind::Ident(name) => {
                if self.is_local(&name) && !self.check(&TokenKind::LeftParen) {
                    ExprKind::Local(name)
                } else {
                    ExprKind::Call {
                        receiver: None,
                        method: name,
                        args: self.parse_paren_args()?,
                    }
                }
            }
            TokenKind::LeftParen => {
                self.skip_newlines();
                let inner = self.parse_expr()?;
                self.skip_newlines();
                self.expect(&TokenKind::RightParen)?;
                return Ok(inner);
            }
            other => {
                return Err(SyntaxError::new(
                    format!("unexpected {other:?}"),
                    line,
                    token.span.start,
                    token.span.len().max(1),
                ));
            }
        };
        Ok(Expr::new(kind, line))
    }

    /// Optional `( expr, ... )` directly after a method name.
    fn parse_paren_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::LeftParen) {
            return Ok(args);
        }
        self.advance(); // consume '('
        self.skip_newlines();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                self.skip_newlines();
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance(); // consume ','
                self.skip_newlines();
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(args)
    }
}
