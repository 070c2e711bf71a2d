//! Native stack unwinding behind a capability trait.
//!
//! The walk is expressed against [`Unwinder`] and [`UnwindCursor`] so platform
//! unwinders, and scripted ones in tests, plug in the same way.

#[cfg(feature = "native-unwind")]
mod system;

#[cfg(feature = "native-unwind")]
pub use system::SystemUnwinder;

use thiserror::Error;

/// Machine registers a cursor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Ip,
    Sp,
}

/// Symbol covering a frame's instruction pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcName {
    pub name: String,
    /// Distance of the instruction pointer from the symbol start.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcInfo {
    pub start_ip: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnwindError {
    #[error("native unwinding is not available on this build")]
    Unavailable,
    #[error("register {0:?} could not be read")]
    NoRegister(Register),
    #[error("no symbol covers the current frame")]
    NoProcName,
    #[error("no procedure info for the current frame")]
    NoProcInfo,
    #[error("failed to step to the caller frame: {0}")]
    Step(String),
}

/// Source of native stack cursors.
pub trait Unwinder {
    /// Capture the current machine context and return a cursor positioned on
    /// the innermost frame.
    fn cursor(&self) -> Result<Box<dyn UnwindCursor + '_>, UnwindError>;
}

/// A position in a native call stack.
pub trait UnwindCursor {
    fn register(&self, register: Register) -> Result<usize, UnwindError>;

    fn proc_name(&self) -> Result<ProcName, UnwindError>;

    fn proc_info(&self) -> Result<ProcInfo, UnwindError>;

    /// Move to the caller. `Ok(false)` means the outermost frame was reached.
    fn step(&mut self) -> Result<bool, UnwindError>;
}

/// Unwinder for builds or platforms with no native unwinding.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableUnwinder;

impl Unwinder for UnavailableUnwinder {
    fn cursor(&self) -> Result<Box<dyn UnwindCursor + '_>, UnwindError> {
        Err(UnwindError::Unavailable)
    }
}

#[cfg(feature = "native-unwind")]
pub fn default_unwinder() -> Box<dyn Unwinder> {
    Box::new(SystemUnwinder::new())
}

#[cfg(not(feature = "native-unwind"))]
pub fn default_unwinder() -> Box<dyn Unwinder> {
    Box::new(UnavailableUnwinder)
}
