//! Data stack.
//!
//! The stack holds `Value`s and provides the primitive operations the
//! instruction set is built from.

use thiserror::Error;

use crate::value::Value;

/// Error type for stack operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StackError {
    /// Tried to take more values than the stack holds.
    #[error("stack underflow")]
    Underflow,
    /// Exceeded the maximum size.
    #[error("stack overflow")]
    Overflow,
}

/// The data stack.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    items: Vec<Value>,
    max_size: Option<usize>,
}

impl Stack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            max_size: None,
        }
    }

    /// Create a stack with a maximum size limit.
    pub fn with_max_size(max: usize) -> Self {
        Self {
            items: Vec::new(),
            max_size: Some(max),
        }
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: Value) -> Result<(), StackError> {
        if let Some(max) = self.max_size
            && self.items.len() >= max
        {
            return Err(StackError::Overflow);
        }
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, StackError> {
        self.items.pop().ok_or(StackError::Underflow)
    }

    /// Peek at the top of stack without removing it.
    pub fn top(&self) -> Result<&Value, StackError> {
        self.items.last().ok_or(StackError::Underflow)
    }

    /// Get a reference to an item at a given depth (0 = top).
    pub fn peek(&self, depth: usize) -> Result<&Value, StackError> {
        let len = self.items.len();
        if depth >= len {
            return Err(StackError::Underflow);
        }
        Ok(&self.items[len - 1 - depth])
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the contents with values taken earlier from `as_slice`.
    pub fn restore(&mut self, items: Vec<Value>) {
        self.items = items;
    }

    /// All items, bottom to top.
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn dup(&mut self) -> Result<(), StackError> {
        let top = self.top()?.clone();
        self.push(top)
    }

    pub fn drop(&mut self) -> Result<(), StackError> {
        self.pop()?;
        Ok(())
    }

    pub fn swap(&mut self) -> Result<(), StackError> {
        let len = self.items.len();
        if len < 2 {
            return Err(StackError::Underflow);
        }
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    /// Copy the second item to the top.
    pub fn over(&mut self) -> Result<(), StackError> {
        let value = self.peek(1)?.clone();
        self.push(value)
    }

    pub fn push_many(&mut self, values: impl IntoIterator<Item = Value>) -> Result<(), StackError> {
        for v in values {
            self.push(v)?;
        }
        Ok(())
    }

    /// Remove the top `count` items, returned bottom to top.
    pub fn split_off(&mut self, count: usize) -> Result<Vec<Value>, StackError> {
        let len = self.items.len();
        if count > len {
            return Err(StackError::Underflow);
        }
        Ok(self.items.split_off(len - count))
    }
}
