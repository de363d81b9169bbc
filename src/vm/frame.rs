use std::rc::Rc;

use crate::bytecode::CodeObject;
use crate::runtime::error::RuntimeError;
use crate::runtime::value::Value;

/// Value-stack capacity reserved per frame; the source language's expression
/// depth never approaches this.
const STACK_CAPACITY: usize = 1024;

/// Execution record for one invocation: instruction pointer, operand stack,
/// and a locals vector sized to the code object's varname table.
#[derive(Debug)]
pub struct Frame {
    pub code: Rc<CodeObject>,
    pub ip: usize,
    pub stack: Vec<Value>,
    pub locals: Vec<Value>,
}

impl Frame {
    pub fn new(code: Rc<CodeObject>) -> Self {
        let locals = vec![Value::None; code.varnames.len()];
        Self {
            code,
            ip: 0,
            stack: Vec::with_capacity(STACK_CAPACITY),
            locals,
        }
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }
}
