use super::Compiler;
use crate::errors::SyntaxError;
use crate::parser::ast::Stmt;
use crate::vm::bytecode::Opcode;

impl Compiler<'_> {
    pub(crate) fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), SyntaxError> {
        match stmt {
            Stmt::Expr(expr) => self.compile_expr(expr),
            Stmt::Class {
                name,
                superclass,
                is_module,
                body,
                line,
                end_line,
            } => {
                match superclass {
                    Some(superclass) => {
                        let sym = self.intern(superclass);
                        self.emit(Opcode::GetConst(sym), *line);
                    }
                    None => self.emit(Opcode::LoadNil, *line),
                }
                self.begin_scope(&[], *line)?;
                let compiled = self.compile_body(body, *end_line);
                let rep = self.end_scope();
                compiled?;
                let body = self.add_rep(rep, *line)?;
                let name = self.intern(name);
                self.emit(
                    Opcode::Class {
                        name,
                        body,
                        is_module: *is_module,
                    },
                    *line,
                );
                Ok(())
            }
            Stmt::Def {
                name,
                singleton,
                params,
                body,
                line,
                end_line,
            } => {
                self.begin_scope(params, *line)?;
                let compiled = self.compile_body(body, *end_line);
                let rep = self.end_scope();
                compiled?;
                let body = self.add_rep(rep, *line)?;
                let mid = self.intern(name);
                self.emit(
                    Opcode::Def {
                        mid,
                        body,
                        singleton: *singleton,
                    },
                    *line,
                );
                Ok(())
            }
        }
    }
}
