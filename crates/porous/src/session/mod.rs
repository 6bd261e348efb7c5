//! High-level interpreter API.
//!
//! [`Interpreter`] owns a program registry, the native-call registry, and
//! the data and type stacks of one session.
//!
//! # Quick Start
//!
//! ```
//! use porous::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.eval("1 2 +").unwrap();
//! assert_eq!(interp.typed_stack(), vec!["3:int".to_string()]);
//! ```

use std::io::{self, Write};

use log::{debug, trace};
use porous_core::ParseToken;

use crate::{
    config::InterpreterConfig,
    direction::{Direction, DirectionKind},
    error::{Error, Origin, ResolveError, RuntimeError},
    externs::ExternRegistry,
    instruction::Instruction,
    parse::{parse_program, parse_statements},
    program::Program,
    resolve::{Resolver, apply_signature},
    types::{Bindings, Type},
    value::Value,
    vm::{Machine, stack::Stack},
};

/// An interpreter session.
///
/// The type stack mirrors the data stack with the static type of every
/// value, and is what new statements are resolved against.
pub struct Interpreter {
    program: Program,
    externs: ExternRegistry,
    stack: Stack,
    types: Vec<Type>,
    output: Box<dyn Write>,
    config: InterpreterConfig,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with default configuration, the standard
    /// externs, and output to stdout.
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    /// Create an interpreter with custom configuration.
    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            program: Program::new(),
            externs: ExternRegistry::with_std(),
            stack: Stack::with_max_size(config.max_stack_depth),
            types: Vec::new(),
            output: Box::new(io::stdout()),
            config,
        }
    }

    /// Send `put` and extern output somewhere other than stdout.
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn externs(&self) -> &ExternRegistry {
        &self.externs
    }

    /// The native-call registry, for registering host calls.
    pub fn externs_mut(&mut self) -> &mut ExternRegistry {
        &mut self.externs
    }

    // === Loading ===

    /// Parse `source` as a program and register its definitions.
    pub fn load(&mut self, source: &str) -> Result<(), Error> {
        let globals = parse_program(source)?;
        self.load_tokens(&globals)?;
        Ok(())
    }

    /// Register already parsed definitions.
    pub fn load_tokens(&mut self, globals: &[ParseToken]) -> Result<(), ResolveError> {
        self.program.load(globals)
    }

    /// Turn statement tokens into directions, expanding macros.
    pub fn directions(&self, statements: &[ParseToken]) -> Result<Vec<Direction>, ResolveError> {
        self.program.directions(statements)
    }

    // === Execution ===

    /// Resolve one direction against the current type stack and execute it.
    pub fn step(&mut self, direction: &Direction) -> Result<(), Error> {
        let resolver = Resolver::new(&self.program, &self.externs);
        let instruction = resolver.resolve(direction, &self.types, &Bindings::new())?;
        let mut types = self.types.clone();
        apply_signature(&mut types, instruction.signature(), &direction.origin)?;
        trace!("step `{}` {}", direction.origin, instruction.signature());
        self.commit(std::slice::from_ref(&instruction), types)?;
        Ok(())
    }

    /// Evaluate statements. Everything is resolved before anything runs,
    /// except the bodies of generic function literals, which are checked
    /// when a `:`, `while` or `curry` first specializes them. Any error
    /// leaves both stacks as they were.
    pub fn eval(&mut self, source: &str) -> Result<(), Error> {
        let statements = parse_statements(source)?;
        self.eval_tokens(&statements)
    }

    /// Evaluate already parsed statements.
    pub fn eval_tokens(&mut self, statements: &[ParseToken]) -> Result<(), Error> {
        let directions = self.program.directions(statements)?;
        let resolver = Resolver::new(&self.program, &self.externs);
        let mut types = self.types.clone();
        let instructions = resolver.resolve_sequence(&directions, &mut types)?;
        self.commit(&instructions, types)?;
        Ok(())
    }

    /// Run the global `entry` on fresh stacks.
    ///
    /// The entry is resolved against an empty type stack and called; the
    /// callable itself is discarded afterwards, leaving its outputs. A
    /// failed run leaves both stacks empty.
    pub fn run(&mut self, entry: &str) -> Result<(), Error> {
        debug!("running {}", entry);
        self.reset();

        let origin = Origin::synthetic(entry);
        let resolver = Resolver::new(&self.program, &self.externs);
        let bindings = Bindings::new();
        let mut types = Vec::new();

        let global = Direction::new(DirectionKind::CallGlobal(entry.to_string()), origin.clone());
        let push = resolver.resolve(&global, &types, &bindings)?;
        apply_signature(&mut types, push.signature(), &origin)?;

        let call = Direction::new(DirectionKind::Do, origin.clone());
        let call = resolver.resolve(&call, &types, &bindings)?;
        apply_signature(&mut types, call.signature(), &origin)?;

        self.commit(&[push, call], types)?;
        self.types.pop();
        self.stack.pop().map_err(|_| RuntimeError::StackUnderflow { origin })?;
        Ok(())
    }

    /// Execute resolved instructions and adopt `types` as the new type
    /// stack. On failure the data stack is put back as it was, so the two
    /// stacks keep describing each other.
    fn commit(&mut self, instructions: &[Instruction], types: Vec<Type>) -> Result<(), RuntimeError> {
        let saved = self.stack.as_slice().to_vec();
        match self.execute(instructions) {
            Ok(()) => {
                self.types = types;
                Ok(())
            }
            Err(e) => {
                debug!("rolling back {} values after: {}", saved.len(), e);
                self.stack.restore(saved);
                Err(e)
            }
        }
    }

    fn execute(&mut self, instructions: &[Instruction]) -> Result<(), RuntimeError> {
        let resolver = Resolver::new(&self.program, &self.externs);
        let mut machine = Machine::new(
            &mut self.stack,
            &resolver,
            &mut *self.output,
            self.config.max_call_depth,
        );
        for instruction in instructions {
            trace!("execute `{}` {}", instruction.origin, instruction.signature());
            machine.execute(instruction)?;
        }
        self.output.flush().map_err(|e| RuntimeError::Output {
            message: e.to_string(),
            origin: Origin::synthetic("flush"),
        })
    }

    // === Inspection ===

    /// Data stack, bottom to top.
    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    /// Static types of the data stack, bottom to top.
    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// The data stack as `value:type` strings, bottom to top.
    pub fn typed_stack(&self) -> Vec<String> {
        self.stack
            .as_slice()
            .iter()
            .map(|v| format!("{}:{}", v, v.type_of()))
            .collect()
    }

    /// Clear both stacks. Definitions and cached specializations stay.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.types.clear();
    }
}
