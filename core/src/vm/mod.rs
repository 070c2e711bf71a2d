pub mod bytecode;
pub mod compiler;
pub mod machine;

pub use machine::Vm;
