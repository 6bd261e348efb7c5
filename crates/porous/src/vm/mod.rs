//! Execution engine.
//!
//! A `Machine` borrows the session's data stack and output sink for the
//! duration of a run and executes resolved instructions against them.
//! It also holds the resolver, since generic function values are
//! specialized when a call first reaches them.

pub mod stack;

use std::{fmt, io::Write};

use log::{debug, trace};

use crate::{
    error::{Origin, RuntimeError},
    function::FunctionRef,
    instruction::{Instruction, InstructionKind},
    resolve::Resolver,
    types::Type,
    value::Value,
};
use stack::{Stack, StackError};

pub struct Machine<'a> {
    stack: &'a mut Stack,
    resolver: &'a Resolver<'a>,
    output: &'a mut dyn Write,
    depth: usize,
    max_call_depth: usize,
}

impl<'a> Machine<'a> {
    pub fn new(
        stack: &'a mut Stack,
        resolver: &'a Resolver<'a>,
        output: &'a mut dyn Write,
        max_call_depth: usize,
    ) -> Self {
        Self {
            stack,
            resolver,
            output,
            depth: 0,
            max_call_depth,
        }
    }

    pub fn stack(&self) -> &Stack {
        &*self.stack
    }

    // === Stack access ===

    fn stack_error(&self, err: StackError, origin: &Origin) -> RuntimeError {
        match err {
            StackError::Underflow => RuntimeError::StackUnderflow {
                origin: origin.clone(),
            },
            StackError::Overflow => RuntimeError::StackOverflow {
                limit: self.stack.max_size().unwrap_or(usize::MAX),
                origin: origin.clone(),
            },
        }
    }

    pub fn push(&mut self, value: Value, origin: &Origin) -> Result<(), RuntimeError> {
        self.stack.push(value).map_err(|e| self.stack_error(e, origin))
    }

    pub fn pop(&mut self, origin: &Origin) -> Result<Value, RuntimeError> {
        self.stack.pop().map_err(|e| self.stack_error(e, origin))
    }

    pub fn pop_int(&mut self, origin: &Origin) -> Result<i64, RuntimeError> {
        let value = self.pop(origin)?;
        value.as_int().ok_or_else(|| mismatch(&Type::INT, &value, origin))
    }

    pub fn pop_bool(&mut self, origin: &Origin) -> Result<bool, RuntimeError> {
        let value = self.pop(origin)?;
        value.as_bool().ok_or_else(|| mismatch(&Type::BOOL, &value, origin))
    }

    pub fn pop_char(&mut self, origin: &Origin) -> Result<char, RuntimeError> {
        let value = self.pop(origin)?;
        value.as_char().ok_or_else(|| mismatch(&Type::CHAR, &value, origin))
    }

    /// Write to the output sink.
    pub fn write(&mut self, args: fmt::Arguments<'_>, origin: &Origin) -> Result<(), RuntimeError> {
        self.output
            .write_fmt(args)
            .map_err(|e| RuntimeError::Output {
                message: e.to_string(),
                origin: origin.clone(),
            })
    }

    // === Execution ===

    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), RuntimeError> {
        let origin = &instruction.origin;
        match &instruction.kind {
            InstructionKind::Push(value) => self.push(value.clone(), origin),
            InstructionKind::PushDeferred(deferred) => {
                let function = deferred.fetch().ok_or_else(|| RuntimeError::ValueMismatch {
                    expected: "a specialized function".to_string(),
                    found: "an unfinished specialization".to_string(),
                    origin: origin.clone(),
                })?;
                self.push(Value::Function(function), origin)
            }
            InstructionKind::Arithmetic(op) => {
                let b = self.pop_int(origin)?;
                let a = self.pop_int(origin)?;
                let result = op.apply(a, b).ok_or_else(|| RuntimeError::DivisionByZero {
                    origin: origin.clone(),
                })?;
                self.push(Value::Int(result), origin)
            }
            InstructionKind::Comparison(op) => {
                let b = self.pop_int(origin)?;
                let a = self.pop_int(origin)?;
                self.push(Value::Bool(op.apply(a, b)), origin)
            }
            InstructionKind::Do { args } => {
                let callee = self.pop(origin)?;
                let function = self.callable(&callee, args, origin)?;
                self.call(&function, origin)?;
                self.push(callee, origin)
            }
            InstructionKind::Dup => self.stack.dup().map_err(|e| self.stack_error(e, origin)),
            InstructionKind::Drop => self.stack.drop().map_err(|e| self.stack_error(e, origin)),
            InstructionKind::Swap => self.stack.swap().map_err(|e| self.stack_error(e, origin)),
            InstructionKind::Over => self.stack.over().map_err(|e| self.stack_error(e, origin)),
            InstructionKind::Choose => {
                let flag = self.pop_bool(origin)?;
                let on_true = self.pop(origin)?;
                let on_false = self.pop(origin)?;
                self.push(if flag { on_true } else { on_false }, origin)
            }
            InstructionKind::Equals => {
                let b = self.pop(origin)?;
                let a = self.pop(origin)?;
                self.push(Value::Bool(a == b), origin)
            }
            InstructionKind::Not => {
                let b = self.pop_bool(origin)?;
                self.push(Value::Bool(!b), origin)
            }
            InstructionKind::Put => {
                let c = self.pop_char(origin)?;
                self.write(format_args!("{}", c), origin)
            }
            InstructionKind::While { args } => {
                let mut flag = self.pop_bool(origin)?;
                let callee = self.pop(origin)?;
                let function = self.callable(&callee, args, origin)?;
                let mut iterations = 0usize;
                while flag {
                    self.call(&function, origin)?;
                    flag = self.pop_bool(origin)?;
                    iterations += 1;
                }
                trace!("while at `{}` ran {} iterations", origin, iterations);
                self.push(callee, origin)
            }
            InstructionKind::Curry { args } => {
                let callee = self.pop(origin)?;
                let bound = self.pop(origin)?;
                let function = self.callable(&callee, args, origin)?;
                let before = function.effective_signature();
                function.bind(bound.clone());
                debug!(
                    "curried {} into {} -> {}",
                    bound,
                    before,
                    function.effective_signature()
                );
                self.push(Value::Function(function), origin)
            }
            InstructionKind::Extern(call) => call.invoke(self, origin),
        }
    }

    /// The function a callable value stands for, specializing generic
    /// function values for `args`.
    fn callable(
        &mut self,
        value: &Value,
        args: &[Type],
        origin: &Origin,
    ) -> Result<FunctionRef, RuntimeError> {
        match value {
            Value::Function(function) => Ok(function.clone()),
            Value::Generic(generic) => Ok(self.resolver.specialize(
                &generic.function,
                args,
                &generic.seed,
                origin,
            )?),
            other => Err(RuntimeError::NotCallable {
                found: other.type_of().to_string(),
                origin: origin.clone(),
            }),
        }
    }

    /// Run a function body. Curried values are re-supplied beneath the
    /// caller's inputs on every call and stay bound afterwards.
    pub fn call(&mut self, function: &FunctionRef, origin: &Origin) -> Result<(), RuntimeError> {
        if self.depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                origin: origin.clone(),
            });
        }

        let inputs = self
            .stack
            .split_off(function.arity())
            .map_err(|e| self.stack_error(e, origin))?;
        let curried = function.curried();
        self.stack
            .push_many(curried.into_iter().chain(inputs))
            .map_err(|e| self.stack_error(e, origin))?;

        self.depth += 1;
        let result = function
            .body()
            .iter()
            .try_for_each(|instruction| self.execute(instruction));
        self.depth -= 1;
        result
    }
}

fn mismatch(expected: &Type, found: &Value, origin: &Origin) -> RuntimeError {
    RuntimeError::ValueMismatch {
        expected: expected.to_string(),
        found: found.type_of().to_string(),
        origin: origin.clone(),
    }
}
