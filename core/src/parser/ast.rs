/// A complete script: a list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    /// Line of the final token, used for the implicit top-level return.
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `class Name [< Super] ... end` or `module Name ... end`.
    Class {
        name: String,
        superclass: Option<String>,
        is_module: bool,
        body: Vec<Stmt>,
        line: usize,
        end_line: usize,
    },
    /// `def [self.]name[(params)] ... end`.
    Def {
        name: String,
        singleton: bool,
        params: Vec<String>,
        body: Vec<Stmt>,
        line: usize,
        end_line: usize,
    },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    Integer(i64),
    Str(String),
    SelfRef,
    Const(String),
    Local(String),
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, line: usize) -> Self {
        Self { kind, line }
    }
}
