pub mod builtins;
pub mod class;
pub mod output;
pub mod symbol;
