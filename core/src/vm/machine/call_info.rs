use std::fmt;
use std::rc::Rc;

use super::Vm;
use crate::errors::RuntimeError;
use crate::runtime::class::ClassId;
use crate::runtime::symbol::Sym;
use crate::vm::bytecode::{Irep, Value};

/// Built-in method implemented in Rust. Receives the receiver and arguments.
pub type NativeFn = fn(&mut Vm, Value, &[Value]) -> Result<Value, RuntimeError>;

#[derive(Clone)]
pub enum ProcBody {
    Irep(Rc<Irep>),
    Native(NativeFn),
}

impl fmt::Debug for ProcBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcBody::Irep(irep) => f
                .debug_tuple("Irep")
                .field(&irep.filename.as_deref().unwrap_or("(unknown)"))
                .finish(),
            ProcBody::Native(_) => f.write_str("Native(..)"),
        }
    }
}

/// Something callable: a compiled body or a native function.
#[derive(Debug, Clone)]
pub struct Proc {
    pub body: ProcBody,
    /// The class this proc runs as a class/module function of (`def self.m`,
    /// class bodies). `None` for instance methods and top-level code.
    pub target_class: Option<ClassId>,
}

impl Proc {
    pub fn scripted(irep: Rc<Irep>, target_class: Option<ClassId>) -> Self {
        Self {
            body: ProcBody::Irep(irep),
            target_class,
        }
    }

    pub fn native(func: NativeFn, target_class: Option<ClassId>) -> Self {
        Self {
            body: ProcBody::Native(func),
            target_class,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, ProcBody::Native(_))
    }

    pub fn irep(&self) -> Option<&Rc<Irep>> {
        match &self.body {
            ProcBody::Irep(irep) => Some(irep),
            ProcBody::Native(_) => None,
        }
    }
}

/// One activation record on the call-info stack.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub proc: Rc<Proc>,
    /// Class the method was found in, or whose body is running.
    pub target_class: Option<ClassId>,
    /// Method name; absent for top-level code and class bodies.
    pub mid: Option<Sym>,
    /// Where the previous frame resumes once this one returns, as an offset
    /// into the previous frame's `iseq`.
    pub return_pc: Option<usize>,
    pub receiver: Value,
    /// First value-stack slot owned by this frame (its locals).
    pub stack_base: usize,
}

impl CallFrame {
    pub fn new(proc: Rc<Proc>) -> Self {
        Self {
            proc,
            target_class: None,
            mid: None,
            return_pc: None,
            receiver: Value::Nil,
            stack_base: 0,
        }
    }

    pub fn with_target_class(mut self, class: ClassId) -> Self {
        self.target_class = Some(class);
        self
    }

    pub fn with_mid(mut self, mid: Sym) -> Self {
        self.mid = Some(mid);
        self
    }

    pub fn with_return_pc(mut self, pc: usize) -> Self {
        self.return_pc = Some(pc);
        self
    }

    pub fn is_native(&self) -> bool {
        self.proc.is_native()
    }
}

/// Index of the base frame: the outermost top-level activation.
pub const BASE: usize = 0;

/// The interpreter's stack of activations, base at index 0.
#[derive(Debug, Clone, Default)]
pub struct CallInfoStack {
    frames: Vec<CallFrame>,
}

impl CallInfoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: CallFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn base(&self) -> usize {
        BASE
    }

    /// Index of the most recent frame, `None` when nothing is running.
    pub fn top(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&CallFrame> {
        self.frames.get(index)
    }

    pub fn last(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Reject cursors outside `[base, top]`.
    pub fn check_cursor(&self, index: usize) -> Result<(), RuntimeError> {
        match self.top() {
            Some(top) if (BASE..=top).contains(&index) => Ok(()),
            Some(top) => Err(RuntimeError::InvalidCursor {
                index,
                range: format!("[{BASE}, {top}]"),
            }),
            None => Err(RuntimeError::InvalidCursor {
                index,
                range: "empty stack".to_string(),
            }),
        }
    }

    /// Bounds-checked frame access.
    pub fn frame(&self, index: usize) -> Result<&CallFrame, RuntimeError> {
        self.check_cursor(index)?;
        self.get(index).ok_or_else(|| RuntimeError::InvalidCursor {
            index,
            range: format!("[{BASE}, {}]", self.len()),
        })
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CallFrame> {
        self.frames.iter()
    }
}
