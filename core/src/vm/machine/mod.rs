mod call_info;
mod dispatch;
mod stack;

use std::rc::Rc;

use tracing::trace;

use crate::diagnostics::unwind::{self, Unwinder};
use crate::errors::{RbError, RuntimeError};
use crate::lexer;
use crate::parser;
use crate::runtime::builtins;
use crate::runtime::class::{ClassId, ClassTable};
use crate::runtime::output::Output;
use crate::runtime::symbol::{Sym, SymbolTable};
use crate::vm::bytecode::{Irep, Value};
use crate::vm::compiler::{CompileOptions, Compiler};

pub use call_info::{BASE, CallFrame, CallInfoStack, NativeFn, Proc, ProcBody};
pub use stack::Stack;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Interpreter state: the execution context every operation takes explicitly.
pub struct Vm {
    pub(crate) call_info: CallInfoStack,
    pub(crate) stack: Stack,
    pub(crate) classes: ClassTable,
    pub(crate) symbols: SymbolTable,
    pub(crate) output: Output,
    pub(crate) unwinder: Box<dyn Unwinder>,
    pub(crate) max_call_depth: usize,
    main: Value,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        let classes = ClassTable::new();
        let main = Value::Object(classes.core().object);
        let mut vm = Self {
            call_info: CallInfoStack::new(),
            stack: Stack::new(),
            classes,
            symbols: SymbolTable::new(),
            output: Output::Stdout,
            unwinder: unwind::default_unwinder(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            main,
        };
        builtins::install(&mut vm);
        vm
    }

    pub fn call_info(&self) -> &CallInfoStack {
        &self.call_info
    }

    /// Direct access for embedders that drive frames themselves.
    pub fn call_info_mut(&mut self) -> &mut CallInfoStack {
        &mut self.call_info
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassTable {
        &mut self.classes
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn intern(&mut self, name: &str) -> Sym {
        self.symbols.intern(name)
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    pub fn unwinder(&self) -> &dyn Unwinder {
        self.unwinder.as_ref()
    }

    pub fn set_unwinder(&mut self, unwinder: Box<dyn Unwinder>) {
        self.unwinder = unwinder;
    }

    pub fn set_max_call_depth(&mut self, depth: usize) {
        self.max_call_depth = depth;
    }

    /// The top-level `self`.
    pub fn main_object(&self) -> Value {
        self.main.clone()
    }

    /// Define a native method. Class methods get `class` as their target.
    pub fn define_native(&mut self, class: ClassId, name: &str, func: NativeFn, singleton: bool) {
        let mid = self.symbols.intern(name);
        if singleton {
            let proc = Rc::new(Proc::native(func, Some(class)));
            self.classes.define_class_method(class, mid, proc);
        } else {
            let proc = Rc::new(Proc::native(func, None));
            self.classes.define_method(class, mid, proc);
        }
    }

    /// Lex, parse and compile source into a top-level irep.
    pub fn compile(&mut self, source: &str, options: CompileOptions) -> Result<Rc<Irep>, RbError> {
        let tokens = lexer::lex(source)?;
        let program = parser::parse(tokens)?;
        let mut compiler = Compiler::new(&mut self.symbols, options);
        Ok(compiler.compile(&program)?)
    }

    /// Run a top-level irep. Frames pushed by the run are popped on return or error.
    pub fn execute(&mut self, irep: Rc<Irep>) -> Result<Value, RuntimeError> {
        let depth = self.call_info.len();
        let stack_len = self.stack.len();
        let frame = CallFrame {
            proc: Rc::new(Proc::scripted(irep.clone(), None)),
            target_class: Some(self.classes.core().object),
            mid: None,
            return_pc: None,
            receiver: self.main.clone(),
            stack_base: 0,
        };
        self.enter(frame, &irep, Vec::new())?;
        let result = self.dispatch(depth);
        if result.is_err() {
            self.unwind_to(depth, stack_len);
        }
        result
    }

    /// Call a method from native code, re-entering the dispatch loop for
    /// scripted bodies.
    pub fn funcall(&mut self, recv: Value, mid: Sym, args: &[Value]) -> Result<Value, RuntimeError> {
        let (owner, proc) = self.lookup(&recv, mid)?;
        match proc.body.clone() {
            ProcBody::Native(func) => self.call_native(func, proc, owner, mid, recv, args, None),
            ProcBody::Irep(body) => {
                let depth = self.call_info.len();
                let stack_len = self.stack.len();
                let frame = CallFrame {
                    proc: proc.clone(),
                    target_class: Some(owner),
                    mid: Some(mid),
                    return_pc: None,
                    receiver: recv,
                    stack_base: 0,
                };
                self.enter(frame, &body, args.to_vec())?;
                let result = self.dispatch(depth);
                if result.is_err() {
                    self.unwind_to(depth, stack_len);
                }
                result
            }
        }
    }

    /// Method lookup: class methods first for class receivers, then the
    /// instance methods of the receiver's class.
    pub fn find_method(&self, recv: &Value, mid: Sym) -> Option<(ClassId, Rc<Proc>)> {
        if let Value::Class(class) = recv
            && let Some(found) = self.classes.find_class_method(*class, mid)
        {
            return Some(found);
        }
        self.classes.find_method(recv.class_of(&self.classes), mid)
    }

    pub(crate) fn lookup(&self, recv: &Value, mid: Sym) -> Result<(ClassId, Rc<Proc>), RuntimeError> {
        self.find_method(recv, mid)
            .ok_or_else(|| RuntimeError::NoMethod {
                name: self.symbols.name(mid).unwrap_or("?").to_string(),
                receiver: recv.inspect(&self.classes),
            })
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn call_native(
        &mut self,
        func: NativeFn,
        proc: Rc<Proc>,
        owner: ClassId,
        mid: Sym,
        recv: Value,
        args: &[Value],
        return_pc: Option<usize>,
    ) -> Result<Value, RuntimeError> {
        let depth = self.call_info.len();
        self.push_frame(CallFrame {
            proc,
            target_class: Some(owner),
            mid: Some(mid),
            return_pc,
            receiver: recv.clone(),
            stack_base: self.stack.len(),
        })?;
        trace!(
            method = self.symbols.name(mid).unwrap_or("?"),
            depth, "native call"
        );
        let result = func(self, recv, args);
        self.call_info.truncate(depth);
        result
    }

    /// Push a scripted frame: arguments become the first locals, the rest start nil.
    pub(crate) fn enter(
        &mut self,
        mut frame: CallFrame,
        irep: &Irep,
        args: Vec<Value>,
    ) -> Result<(), RuntimeError> {
        if args.len() != irep.argc as usize {
            return Err(RuntimeError::ArityMismatch {
                expected: irep.argc as usize,
                given: args.len(),
            });
        }
        if self.call_info.len() >= self.max_call_depth {
            return Err(RuntimeError::StackTooDeep {
                depth: self.call_info.len(),
            });
        }
        frame.stack_base = self.stack.len();
        let padding = (irep.nlocals as usize).saturating_sub(args.len());
        for arg in args {
            self.stack.push(arg)?;
        }
        for _ in 0..padding {
            self.stack.push(Value::Nil)?;
        }
        self.call_info.push(frame);
        Ok(())
    }

    fn push_frame(&mut self, frame: CallFrame) -> Result<(), RuntimeError> {
        if self.call_info.len() >= self.max_call_depth {
            return Err(RuntimeError::StackTooDeep {
                depth: self.call_info.len(),
            });
        }
        self.call_info.push(frame);
        Ok(())
    }

    fn unwind_to(&mut self, depth: usize, stack_len: usize) {
        self.call_info.truncate(depth);
        self.stack.truncate(stack_len);
    }
}
