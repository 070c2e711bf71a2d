/// A single token with its kind, source span and 1-based line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub line: usize,
}

/// Byte offset span in the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    String(String),

    /// Lowercase identifier: local variable or method name.
    Ident(String),
    /// Capitalised identifier: constant.
    Constant(String),

    // Keywords
    Class,
    Module,
    Def,
    End,
    SelfKw,
    Nil,

    // Punctuation
    Dot,
    Comma,
    LeftParen,
    RightParen,
    Less,
    Assign,
    Semicolon,
    Newline,

    Eof,
}

impl TokenKind {
    /// Whether this token can begin an argument of a command call (`puts x`).
    pub fn begins_argument(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer(_)
                | TokenKind::String(_)
                | TokenKind::Ident(_)
                | TokenKind::Constant(_)
                | TokenKind::SelfKw
                | TokenKind::Nil
        )
    }
}
