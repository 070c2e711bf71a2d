//! Backtrace production for the interpreter.
//!
//! Two independent paths share the `Backtrace` class installed by
//! [`capture::install`]:
//!
//! * interpreter frames: [`walker`] walks the call-info stack from the
//!   capture point toward the base, [`formatter`] renders each scripted frame
//!   as `\t<file>:<line>:in <Class><sep><method>`;
//! * native frames: [`unwind`] wraps a platform stack unwinder behind a
//!   capability trait.

pub mod capture;
pub mod formatter;
pub mod source_map;
pub mod unwind;
pub mod walker;

pub use capture::{capture_interpreter_trace, print_interpreter_trace, print_native_trace};
pub use formatter::{FrameLocation, render, resolve};
pub use walker::CallChain;
