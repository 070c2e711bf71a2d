use std::fmt::Write;
use std::rc::Rc;

use super::Opcode;
use crate::runtime::symbol::SymbolTable;

/// A compiled code unit: one method body, class body or top-level script.
#[derive(Debug, Clone, Default)]
pub struct Irep {
    /// Source file the unit was compiled from.
    pub filename: Option<String>,
    pub iseq: Vec<Opcode>,
    /// Source line per instruction, parallel to `iseq`. `None` without debug info.
    pub lines: Option<Vec<u32>>,
    pub strings: Vec<String>,
    pub reps: Vec<Rc<Irep>>,
    /// Local slots, arguments first.
    pub nlocals: u16,
    pub argc: u16,
}

impl Irep {
    pub fn new(filename: Option<String>) -> Self {
        Self {
            filename,
            lines: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn write(&mut self, op: Opcode, line: u32) {
        self.iseq.push(op);
        if let Some(lines) = self.lines.as_mut() {
            lines.push(line);
        }
    }

    /// Pool index of the new string, or `None` once the pool has no u16 index left.
    pub fn add_string(&mut self, value: String) -> Option<u16> {
        let idx = u16::try_from(self.strings.len()).ok()?;
        self.strings.push(value);
        Some(idx)
    }

    pub fn add_rep(&mut self, rep: Irep) -> Option<u16> {
        let idx = u16::try_from(self.reps.len()).ok()?;
        self.reps.push(Rc::new(rep));
        Some(idx)
    }

    /// Source line recorded for the instruction at `offset`.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.as_ref()?.get(offset).copied()
    }

    pub fn disassemble(&self, symbols: &SymbolTable) -> String {
        let mut out = String::new();
        self.disassemble_into(&mut out, symbols, 0);
        out
    }

    fn disassemble_into(&self, out: &mut String, symbols: &SymbolTable, depth: usize) {
        let indent = "  ".repeat(depth);
        let name = |sym| symbols.name(sym).unwrap_or("?");
        let _ = writeln!(
            out,
            "{indent}irep {} nlocals={} argc={}",
            self.filename.as_deref().unwrap_or("(unknown)"),
            self.nlocals,
            self.argc
        );
        for (offset, op) in self.iseq.iter().enumerate() {
            let line = self
                .line_at(offset)
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            let text = match *op {
                Opcode::LoadString(idx) => format!(
                    "LoadString {:?}",
                    self.strings.get(idx as usize).map_or("?", String::as_str)
                ),
                Opcode::GetConst(sym) => format!("GetConst {}", name(sym)),
                Opcode::Send { mid, argc } => format!("Send :{} argc={argc}", name(mid)),
                Opcode::Class {
                    name: sym,
                    body,
                    is_module,
                } => format!(
                    "{} {} rep={body}",
                    if is_module { "Module" } else { "Class" },
                    name(sym)
                ),
                Opcode::Def {
                    mid,
                    body,
                    singleton,
                } => format!(
                    "Def {}{} rep={body}",
                    if singleton { "self." } else { "" },
                    name(mid)
                ),
                other => format!("{other:?}"),
            };
            let _ = writeln!(out, "{indent}  {offset:04} {line:>4}  {text}");
        }
        for rep in &self.reps {
            rep.disassemble_into(out, symbols, depth + 1);
        }
    }
}
