use crate::errors::RuntimeError;
use crate::vm::bytecode::Value;

const MAX_STACK: usize = 64 * 1024;

/// Operand and local-variable stack shared by all frames.
#[derive(Debug, Default)]
pub struct Stack {
    values: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.values.len() >= MAX_STACK {
            return Err(RuntimeError::type_error("VM stack overflow"));
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.values
            .pop()
            .ok_or_else(|| RuntimeError::type_error("VM stack underflow"))
    }

    /// Pop the top `n` values, preserving their order.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        let at = self
            .values
            .len()
            .checked_sub(n)
            .ok_or_else(|| RuntimeError::type_error("VM stack underflow"))?;
        Ok(self.values.split_off(at))
    }

    pub fn peek(&self) -> Result<&Value, RuntimeError> {
        self.values
            .last()
            .ok_or_else(|| RuntimeError::type_error("VM stack is empty"))
    }

    pub fn get(&self, index: usize) -> Result<Value, RuntimeError> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::type_error("VM stack slot out of bounds"))
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| RuntimeError::type_error("VM stack slot out of bounds"))?;
        *slot = value;
        Ok(())
    }

    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
