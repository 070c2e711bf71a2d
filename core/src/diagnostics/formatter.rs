use std::fmt;

use crate::errors::RuntimeError;
use crate::vm::Vm;
use crate::vm::bytecode::Irep;
use crate::vm::machine::CallInfoStack;

/// Filename shown when a code unit carries none.
pub const UNKNOWN_FILE: &str = "(unknown)";
/// Line shown when no line can be recovered.
pub const UNKNOWN_LINE: i64 = -1;

/// Where one scripted frame currently is, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLocation<'a> {
    pub file: &'a str,
    pub line: i64,
    pub class_name: Option<&'a str>,
    /// `.` for class/module function calls, `#` for instance method calls.
    pub separator: char,
    pub method: Option<&'a str>,
}

impl fmt::Display for FrameLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}:{}", self.file, self.line)?;
        match (self.method, self.class_name) {
            (Some(method), Some(class)) => write!(f, ":in {class}{}{method}", self.separator),
            (Some(method), None) => write!(f, ":in {method}"),
            (None, _) => Ok(()),
        }
    }
}

/// Resolve file, line, class, separator and method for the frame at `index`.
///
/// Native frames have no location and are rejected with
/// [`RuntimeError::NativeFrame`].
pub fn resolve(vm: &Vm, index: usize) -> Result<FrameLocation<'_>, RuntimeError> {
    let stack = vm.call_info();
    let frame = stack.frame(index)?;
    let irep = frame
        .proc
        .irep()
        .ok_or(RuntimeError::NativeFrame { index })?;

    let separator = if frame.target_class == frame.proc.target_class {
        '.'
    } else {
        '#'
    };

    Ok(FrameLocation {
        file: irep.filename.as_deref().unwrap_or(UNKNOWN_FILE),
        line: caller_line(stack, index, irep),
        class_name: frame.target_class.and_then(|class| vm.classes().name(class)),
        separator,
        method: frame.mid.and_then(|mid| vm.symbols().name(mid)),
    })
}

pub fn render(vm: &Vm, index: usize) -> Result<String, RuntimeError> {
    Ok(resolve(vm, index)?.to_string())
}

/// Line of the call instruction the frame at `index` is suspended on.
///
/// The resume pc lives in the frame pushed after it and points one past the
/// call, so the line comes from `pc - 1`.
fn caller_line(stack: &CallInfoStack, index: usize, irep: &Irep) -> i64 {
    let Some(pc) = stack.get(index + 1).and_then(|next| next.return_pc) else {
        return UNKNOWN_LINE;
    };
    if pc >= irep.iseq.len() || pc == 0 {
        return UNKNOWN_LINE;
    }
    irep.line_at(pc - 1).map_or(UNKNOWN_LINE, i64::from)
}
