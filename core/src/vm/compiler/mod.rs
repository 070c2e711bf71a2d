mod compile_expr;
mod compile_stmt;

use std::mem;
use std::rc::Rc;

use crate::errors::SyntaxError;
use crate::parser::ast::{Program, Stmt};
use crate::runtime::symbol::SymbolTable;

use super::bytecode::{Irep, Opcode};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Recorded in every irep and shown in backtraces.
    pub filename: Option<String>,
    /// Emit per-instruction line tables.
    pub debug_info: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            filename: None,
            debug_info: true,
        }
    }
}

struct Scope {
    irep: Irep,
    locals: Vec<String>,
}

impl Scope {
    fn new(filename: Option<String>) -> Self {
        Self {
            irep: Irep::new(filename),
            locals: Vec::new(),
        }
    }
}

fn too_many(what: &str, line: usize) -> SyntaxError {
    SyntaxError::new(format!("too many {what}"), line, 0, 0)
}

pub struct Compiler<'a> {
    symbols: &'a mut SymbolTable,
    options: CompileOptions,
    scope: Scope,
    /// Scopes suspended while a nested class or method body compiles.
    enclosing: Vec<Scope>,
}

impl<'a> Compiler<'a> {
    pub fn new(symbols: &'a mut SymbolTable, options: CompileOptions) -> Self {
        let scope = Scope::new(options.filename.clone());
        Self {
            symbols,
            options,
            scope,
            enclosing: Vec::new(),
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<Rc<Irep>, SyntaxError> {
        self.enclosing.clear();
        self.scope = Scope::new(self.options.filename.clone());
        self.compile_body(&program.body, program.end_line)?;
        let root = mem::replace(&mut self.scope, Scope::new(self.options.filename.clone()));
        Ok(Rc::new(self.finish(root)))
    }

    /// Statements of one body; the value of the last one is returned.
    pub(crate) fn compile_body(&mut self, body: &[Stmt], end_line: usize) -> Result<(), SyntaxError> {
        if body.is_empty() {
            self.emit(Opcode::LoadNil, end_line);
        }
        for (idx, stmt) in body.iter().enumerate() {
            self.compile_stmt(stmt)?;
            if idx + 1 < body.len() {
                self.emit(Opcode::Pop, stmt_line(stmt));
            }
        }
        self.emit(Opcode::Return, end_line);
        Ok(())
    }

    pub(crate) fn begin_scope(&mut self, params: &[String], line: usize) -> Result<(), SyntaxError> {
        let argc = u16::try_from(params.len()).map_err(|_| too_many("parameters", line))?;
        let mut inner = Scope::new(self.options.filename.clone());
        inner.irep.argc = argc;
        inner.locals = params.to_vec();
        self.enclosing.push(mem::replace(&mut self.scope, inner));
        Ok(())
    }

    pub(crate) fn end_scope(&mut self) -> Irep {
        let outer = self
            .enclosing
            .pop()
            .unwrap_or_else(|| Scope::new(self.options.filename.clone()));
        let inner = mem::replace(&mut self.scope, outer);
        self.finish(inner)
    }

    fn finish(&self, scope: Scope) -> Irep {
        let mut irep = scope.irep;
        // define_local never hands out slot u16::MAX, so the count fits.
        irep.nlocals = u16::try_from(scope.locals.len()).unwrap_or(u16::MAX);
        if !self.options.debug_info {
            irep.lines = None;
        }
        irep
    }

    pub(crate) fn current(&mut self) -> &mut Irep {
        &mut self.scope.irep
    }

    pub(crate) fn emit(&mut self, op: Opcode, line: usize) {
        self.current().write(op, line as u32);
    }

    pub(crate) fn add_string(&mut self, value: &str, line: usize) -> Result<u16, SyntaxError> {
        self.current()
            .add_string(value.to_string())
            .ok_or_else(|| too_many("string literals", line))
    }

    pub(crate) fn add_rep(&mut self, rep: Irep, line: usize) -> Result<u16, SyntaxError> {
        self.current()
            .add_rep(rep)
            .ok_or_else(|| too_many("class and method bodies", line))
    }

    pub(crate) fn intern(&mut self, name: &str) -> crate::runtime::symbol::Sym {
        self.symbols.intern(name)
    }

    pub(crate) fn resolve_local(&self, name: &str) -> Option<u16> {
        self.scope
            .locals
            .iter()
            .position(|local| local == name)
            .and_then(|idx| u16::try_from(idx).ok())
    }

    pub(crate) fn define_local(&mut self, name: &str, line: usize) -> Result<u16, SyntaxError> {
        if let Some(slot) = self.resolve_local(name) {
            return Ok(slot);
        }
        let slot = u16::try_from(self.scope.locals.len())
            .ok()
            .filter(|&slot| slot < u16::MAX)
            .ok_or_else(|| too_many("local variables", line))?;
        self.scope.locals.push(name.to_string());
        Ok(slot)
    }
}

fn stmt_line(stmt: &Stmt) -> usize {
    match stmt {
        Stmt::Class { end_line, .. } | Stmt::Def { end_line, .. } => *end_line,
        Stmt::Expr(expr) => expr.line,
    }
}
