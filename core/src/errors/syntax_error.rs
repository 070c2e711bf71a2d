use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("line {line}: syntax error, {message}")]
#[diagnostic(code(rbtrace::syntax_error))]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,

    #[label("here")]
    pub span: miette::SourceSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: usize, offset: usize, length: usize) -> Self {
        Self {
            message: message.into(),
            line,
            span: (offset, length).into(),
        }
    }
}
