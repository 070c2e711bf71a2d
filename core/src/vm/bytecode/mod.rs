mod irep;
mod opcode;
mod value;

pub use irep::Irep;
pub use opcode::Opcode;
pub use value::Value;
