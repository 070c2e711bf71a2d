use std::io::{self, Write};

use tracing::debug;

use super::formatter;
use super::unwind::{Register, Unwinder};
use super::walker::CallChain;
use crate::errors::RuntimeError;
use crate::vm::Vm;
use crate::vm::bytecode::Value;

pub const NATIVE_BANNER_OPEN: &str = "---- [backtrace] ---------------";
pub const NATIVE_BANNER_CLOSE: &str = "--------------------------------";
pub const INTERPRETER_TRACE_HEADER: &str = "backtrace:";
/// Upper bound on native frame lines per dump.
pub const MAX_NATIVE_FRAMES: usize = 64;

/// Dump the native machine stack, innermost frame first.
///
/// Writes nothing when the unwinder cannot start. Otherwise the frame lines
/// are framed by banners and stop at the first frame that cannot be
/// described.
pub fn print_native_trace(unwinder: &dyn Unwinder, out: &mut dyn Write) -> io::Result<()> {
    let mut cursor = match unwinder.cursor() {
        Ok(cursor) => cursor,
        Err(err) => {
            debug!(%err, "native unwinding unavailable");
            return Ok(());
        }
    };

    writeln!(out, "{NATIVE_BANNER_OPEN}")?;
    let mut written = 0;
    while written < MAX_NATIVE_FRAMES {
        let Ok(ip) = cursor.register(Register::Ip) else {
            break;
        };
        let Ok(_sp) = cursor.register(Register::Sp) else {
            break;
        };
        let Ok(proc_name) = cursor.proc_name() else {
            break;
        };
        if cursor.proc_info().is_err() {
            break;
        }
        writeln!(out, "{:#x} <{} + {:#x}>", ip, proc_name.name, proc_name.offset)?;
        written += 1;
        match cursor.step() {
            Ok(true) => {}
            Ok(false) | Err(_) => break,
        }
    }
    if written == MAX_NATIVE_FRAMES {
        debug!(limit = MAX_NATIVE_FRAMES, "native backtrace truncated");
    }
    writeln!(out, "{NATIVE_BANNER_CLOSE}")
}

/// Write `backtrace:` followed by one line per scripted frame below the
/// capture point.
pub fn print_interpreter_trace(vm: &Vm, out: &mut dyn Write) -> Result<(), RuntimeError> {
    writeln!(out, "{INTERPRETER_TRACE_HEADER}")?;
    for index in CallChain::new(vm.call_info()) {
        writeln!(out, "{}", formatter::resolve(vm, index?)?)?;
    }
    Ok(())
}

/// Rendered frames below the capture point, most recent first.
///
/// `None` when there is nothing to report.
pub fn capture_interpreter_trace(vm: &Vm) -> Result<Option<Vec<String>>, RuntimeError> {
    let entries = CallChain::new(vm.call_info())
        .map(|index| formatter::render(vm, index?))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(frames = entries.len(), "captured interpreter backtrace");
    Ok((!entries.is_empty()).then_some(entries))
}

/// Define the `Backtrace` class and its class methods on `vm`.
pub fn install(vm: &mut Vm) {
    let object = vm.classes().core().object;
    let class = match vm.classes().constant("Backtrace") {
        Some(existing) => existing,
        None => vm
            .classes_mut()
            .define(Some("Backtrace"), Some(object), false),
    };
    vm.define_native(class, "put_vm", backtrace_put_vm, true);
    vm.define_native(class, "put_rb", backtrace_put_rb, true);
    vm.define_native(class, "backtrace", backtrace_backtrace, true);
}

fn backtrace_put_vm(vm: &mut Vm, _recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    let mut buf = Vec::new();
    print_native_trace(vm.unwinder(), &mut buf)?;
    vm.output_mut().write_all(&buf)?;
    Ok(Value::Nil)
}

fn backtrace_put_rb(vm: &mut Vm, _recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    let mut buf = Vec::new();
    print_interpreter_trace(vm, &mut buf)?;
    vm.output_mut().write_all(&buf)?;
    Ok(Value::Nil)
}

fn backtrace_backtrace(vm: &mut Vm, _recv: Value, _args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(match capture_interpreter_trace(vm)? {
        Some(entries) => Value::Array(entries.into_iter().map(Value::String).collect()),
        None => Value::Nil,
    })
}
