use crate::runtime::symbol::Sym;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    LoadNil,
    LoadSelf,
    LoadInt(i64),
    /// Push a copy of the irep's string pool entry.
    LoadString(u16),
    GetLocal(u16),
    /// Store the top of stack into a local, leaving it on the stack.
    SetLocal(u16),
    GetConst(Sym),
    /// Pops `argc` arguments and the receiver beneath them, pushes the result.
    Send { mid: Sym, argc: u8 },
    Pop,
    /// Pops the superclass (or nil), opens the class and runs child irep `body`.
    Class { name: Sym, body: u16, is_module: bool },
    /// Defines child irep `body` as a method on the current class.
    Def { mid: Sym, body: u16, singleton: bool },
    Return,
}
