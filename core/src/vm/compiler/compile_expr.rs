use super::Compiler;
use crate::errors::SyntaxError;
use crate::parser::ast::{Expr, ExprKind};
use crate::vm::bytecode::Opcode;

impl Compiler<'_> {
    pub(crate) fn compile_expr(&mut self, expr: &Expr) -> Result<(), SyntaxError> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Nil => self.emit(Opcode::LoadNil, line),
            ExprKind::Integer(value) => self.emit(Opcode::LoadInt(*value), line),
            ExprKind::Str(value) => {
                let idx = self.add_string(value, line)?;
                self.emit(Opcode::LoadString(idx), line);
            }
            ExprKind::SelfRef => self.emit(Opcode::LoadSelf, line),
            ExprKind::Const(name) => {
                let sym = self.intern(name);
                self.emit(Opcode::GetConst(sym), line);
            }
            ExprKind::Local(name) => match self.resolve_local(name) {
                Some(slot) => self.emit(Opcode::GetLocal(slot), line),
                None => self.emit(Opcode::LoadNil, line),
            },
            ExprKind::Assign { name, value } => {
                self.compile_expr(value)?;
                let slot = self.define_local(name, line)?;
                self.emit(Opcode::SetLocal(slot), line);
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                match receiver {
                    Some(receiver) => self.compile_expr(receiver)?,
                    None => self.emit(Opcode::LoadSelf, line),
                }
                for arg in args {
                    self.compile_expr(arg)?;
                }
                let argc = u8::try_from(args.len()).map_err(|_| {
                    SyntaxError::new(format!("too many arguments to '{method}'"), line, 0, 0)
                })?;
                let mid = self.intern(method);
                self.emit(Opcode::Send { mid, argc }, line);
            }
        }
        Ok(())
    }
}
