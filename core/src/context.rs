use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::diagnostics::capture;
use crate::errors::{RbError, RuntimeError};
use crate::runtime::output::Output;
use crate::vm::Vm;
use crate::vm::bytecode::{Irep, Value};
use crate::vm::compiler::CompileOptions;
use crate::vm::machine::NativeFn;

/// Filename given to code evaluated from a string.
pub const EVAL_FILENAME: &str = "-";

/// An interpreter instance with the `Backtrace` class available.
pub struct Context {
    vm: Vm,
    debug_info: bool,
}

impl Context {
    pub fn new() -> Self {
        let mut vm = Vm::new();
        capture::install(&mut vm);
        Self {
            vm,
            debug_info: true,
        }
    }

    pub fn set_debug_info(&mut self, enabled: bool) {
        self.debug_info = enabled;
    }

    pub fn eval(&mut self, source: &str) -> Result<Value, RbError> {
        self.eval_named(source, Some(EVAL_FILENAME))
    }

    /// Evaluate `source` with `filename` recorded on every compiled unit.
    /// `None` leaves the units unnamed.
    pub fn eval_named(&mut self, source: &str, filename: Option<&str>) -> Result<Value, RbError> {
        let irep = self.compile(source, filename)?;
        Ok(self.execute(irep)?)
    }

    /// Compile without running, using this context's debug-info setting.
    pub fn compile(&mut self, source: &str, filename: Option<&str>) -> Result<Rc<Irep>, RbError> {
        let options = CompileOptions {
            filename: filename.map(str::to_string),
            debug_info: self.debug_info,
        };
        self.vm.compile(source, options)
    }

    pub fn execute(&mut self, irep: Rc<Irep>) -> Result<Value, RuntimeError> {
        self.vm.execute(irep)
    }

    pub fn eval_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Value, RbError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(RuntimeError::from)?;
        let filename = path.display().to_string();
        self.eval_named(&source, Some(&filename))
    }

    /// Define a native method on `Object`, callable from anywhere as `name(...)`.
    pub fn define_global_function(&mut self, name: &str, func: NativeFn) {
        let object = self.vm.classes().core().object;
        self.vm.define_native(object, name, func, false);
    }

    pub fn output(&self) -> &Output {
        self.vm.output()
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }

    pub fn vm_mut(&mut self) -> &mut Vm {
        &mut self.vm
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
