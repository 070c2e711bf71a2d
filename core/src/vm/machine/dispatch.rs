use std::rc::Rc;

use tracing::trace;

use super::{CallFrame, Proc, ProcBody, Vm};
use crate::errors::RuntimeError;
use crate::runtime::class::ClassId;
use crate::runtime::symbol::Sym;
use crate::vm::bytecode::{Irep, Opcode, Value};

impl Vm {
    /// Run until the frame at index `stop_depth` returns.
    pub(crate) fn dispatch(&mut self, stop_depth: usize) -> Result<Value, RuntimeError> {
        let mut irep = self.top_irep()?;
        let mut ip = 0usize;

        loop {
            let op = irep.iseq.get(ip).copied().unwrap_or(Opcode::Return);
            ip += 1;

            match op {
                Opcode::Nop => {}
                Opcode::LoadNil => self.stack.push(Value::Nil)?,
                Opcode::LoadSelf => {
                    let receiver = self.top_frame()?.receiver.clone();
                    self.stack.push(receiver)?;
                }
                Opcode::LoadInt(value) => self.stack.push(Value::Integer(value))?,
                Opcode::LoadString(idx) => {
                    let value = irep
                        .strings
                        .get(idx as usize)
                        .cloned()
                        .ok_or_else(|| RuntimeError::type_error("string pool index out of range"))?;
                    self.stack.push(Value::String(value))?;
                }
                Opcode::GetLocal(slot) => {
                    let base = self.top_frame()?.stack_base;
                    let value = self.stack.get(base + slot as usize)?;
                    self.stack.push(value)?;
                }
                Opcode::SetLocal(slot) => {
                    let base = self.top_frame()?.stack_base;
                    let value = self.stack.peek()?.clone();
                    self.stack.set(base + slot as usize, value)?;
                }
                Opcode::GetConst(sym) => {
                    let value = self.const_get(sym)?;
                    self.stack.push(value)?;
                }
                Opcode::Pop => {
                    self.stack.pop()?;
                }
                Opcode::Send { mid, argc } => {
                    let args = self.stack.pop_n(argc as usize)?;
                    let recv = self.stack.pop()?;
                    let (owner, proc) = self.lookup(&recv, mid)?;
                    trace!(
                        method = self.symbols.name(mid).unwrap_or("?"),
                        argc,
                        "send"
                    );
                    match proc.body.clone() {
                        ProcBody::Native(func) => {
                            let value =
                                self.call_native(func, proc, owner, mid, recv, &args, Some(ip))?;
                            self.stack.push(value)?;
                        }
                        ProcBody::Irep(body) => {
                            let frame = CallFrame {
                                proc,
                                target_class: Some(owner),
                                mid: Some(mid),
                                return_pc: Some(ip),
                                receiver: recv,
                                stack_base: 0,
                            };
                            self.enter(frame, &body, args)?;
                            irep = body;
                            ip = 0;
                        }
                    }
                }
                Opcode::Class {
                    name,
                    body,
                    is_module,
                } => {
                    let superclass = self.stack.pop()?;
                    let class = self.open_class(name, superclass, is_module)?;
                    let body = child_rep(&irep, body)?;
                    let frame = CallFrame {
                        proc: Rc::new(Proc::scripted(body.clone(), Some(class))),
                        target_class: Some(class),
                        mid: None,
                        return_pc: Some(ip),
                        receiver: Value::Class(class),
                        stack_base: 0,
                    };
                    self.enter(frame, &body, Vec::new())?;
                    irep = body;
                    ip = 0;
                }
                Opcode::Def {
                    mid,
                    body,
                    singleton,
                } => {
                    let body = child_rep(&irep, body)?;
                    self.define_scripted(mid, body, singleton)?;
                    self.stack.push(Value::Nil)?;
                }
                Opcode::Return => {
                    let value = self.stack.pop()?;
                    let frame = self
                        .call_info
                        .pop()
                        .ok_or_else(|| RuntimeError::type_error("return with empty call stack"))?;
                    self.stack.truncate(frame.stack_base);
                    if self.call_info.len() <= stop_depth {
                        return Ok(value);
                    }
                    self.stack.push(value)?;
                    ip = frame
                        .return_pc
                        .ok_or_else(|| RuntimeError::type_error("frame has no return address"))?;
                    irep = self.top_irep()?;
                }
            }
        }
    }

    fn top_frame(&self) -> Result<&CallFrame, RuntimeError> {
        self.call_info
            .last()
            .ok_or_else(|| RuntimeError::type_error("VM has no active frame"))
    }

    fn top_irep(&self) -> Result<Rc<Irep>, RuntimeError> {
        self.top_frame()?
            .proc
            .irep()
            .cloned()
            .ok_or_else(|| RuntimeError::type_error("active frame is not scripted"))
    }

    fn const_get(&self, sym: Sym) -> Result<Value, RuntimeError> {
        let name = self.symbols.name(sym).unwrap_or("?");
        self.classes
            .constant(name)
            .map(Value::Class)
            .ok_or_else(|| RuntimeError::UninitializedConstant {
                name: name.to_string(),
            })
    }

    fn open_class(
        &mut self,
        name: Sym,
        superclass: Value,
        is_module: bool,
    ) -> Result<ClassId, RuntimeError> {
        let name = self.symbols.name(name).unwrap_or("?").to_string();
        let superclass = match superclass {
            Value::Nil => None,
            Value::Class(id) => Some(id),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "superclass must be a Class ({} given)",
                    other.inspect(&self.classes)
                )));
            }
        };

        if let Some(existing) = self.classes.constant(&name) {
            let class = self
                .classes
                .get(existing)
                .ok_or_else(|| RuntimeError::type_error(format!("{name} is not a class")))?;
            if class.is_module != is_module {
                let kind = if is_module { "module" } else { "class" };
                return Err(RuntimeError::type_error(format!("{name} is not a {kind}")));
            }
            if superclass.is_some() && superclass != class.superclass {
                return Err(RuntimeError::type_error(format!(
                    "superclass mismatch for class {name}"
                )));
            }
            return Ok(existing);
        }

        let superclass = if is_module {
            None
        } else {
            superclass.or(Some(self.classes.core().object))
        };
        Ok(self.classes.define(Some(&name), superclass, is_module))
    }

    fn define_scripted(&mut self, mid: Sym, body: Rc<Irep>, singleton: bool) -> Result<(), RuntimeError> {
        let receiver = self.top_frame()?.receiver.clone();
        if singleton {
            let Value::Class(class) = receiver else {
                return Err(RuntimeError::type_error(format!(
                    "can't define singleton method on {}",
                    receiver.inspect(&self.classes)
                )));
            };
            let proc = Rc::new(Proc::scripted(body, Some(class)));
            self.classes.define_class_method(class, mid, proc);
        } else {
            let class = match receiver {
                Value::Class(class) | Value::Object(class) => class,
                other => other.class_of(&self.classes),
            };
            let proc = Rc::new(Proc::scripted(body, None));
            self.classes.define_method(class, mid, proc);
        }
        Ok(())
    }
}

fn child_rep(irep: &Irep, idx: u16) -> Result<Rc<Irep>, RuntimeError> {
    irep.reps
        .get(idx as usize)
        .cloned()
        .ok_or_else(|| RuntimeError::type_error("child irep index out of range"))
}
