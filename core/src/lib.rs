pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod vm;

pub use context::Context;
pub use engine::Engine;
pub use errors::{RbError, RuntimeError, SyntaxError};
pub use runtime::output::Output;
pub use vm::Vm;
pub use vm::bytecode::Value;

/// Evaluate source in a fresh context writing to stdout.
pub fn run(source: &str) -> Result<Context, RbError> {
    let mut ctx = Engine::new().new_context();
    ctx.eval(source)?;
    Ok(ctx)
}
