use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("undefined method '{name}' for {receiver}")]
    NoMethod { name: String, receiver: String },

    #[error("uninitialized constant {name}")]
    UninitializedConstant { name: String },

    #[error("wrong number of arguments (given {given}, expected {expected})")]
    #[diagnostic(code(rbtrace::argument_error))]
    ArityMismatch { expected: usize, given: usize },

    #[error("stack level too deep ({depth} frames)")]
    StackTooDeep { depth: usize },

    #[error("type error: {message}")]
    TypeError { message: String },

    /// A call-info cursor outside `[base, top]` of the current stack.
    #[error("invalid call-info cursor {index} (valid range {range})")]
    #[diagnostic(
        code(rbtrace::argument_error),
        help("call-info cursors are only valid while the stack they came from is unchanged")
    )]
    InvalidCursor { index: usize, range: String },

    #[error("frame {index} is a native call and has no source location")]
    NativeFrame { index: usize },

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
        }
    }
}
