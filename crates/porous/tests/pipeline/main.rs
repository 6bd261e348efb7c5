//! End-to-end tests: parse, resolve and execute through an `Interpreter`.
//!
//! Tests are organized into modules by functionality.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use porous::{Error, Interpreter, ResolveError, value::Value};

mod arithmetic;
mod control;
mod errors;
mod functions;
mod session;
mod stack;

// ============================================================================
// Test Helpers
// ============================================================================

/// An output sink the test keeps a handle to.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("output is utf-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An interpreter writing to a buffer, with `program` loaded.
pub fn interpreter(program: &str) -> (Interpreter, SharedBuffer) {
    let output = SharedBuffer::default();
    let mut interp = Interpreter::new().with_output(output.clone());
    interp
        .load(program)
        .unwrap_or_else(|e| panic!("load failed for '{}': {:?}", program, e));
    (interp, output)
}

/// Evaluate `code` against `program` and return the stack.
pub fn eval_values(program: &str, code: &str) -> Vec<Value> {
    let (mut interp, _) = interpreter(program);
    interp
        .eval(code)
        .unwrap_or_else(|e| panic!("eval failed for '{}': {:?}", code, e));
    interp.stack().to_vec()
}

/// Run the global `entry` of `program` and return the stack.
pub fn run_values(program: &str, entry: &str) -> Vec<Value> {
    let (mut interp, _) = interpreter(program);
    interp
        .run(entry)
        .unwrap_or_else(|e| panic!("run of '{}' failed: {:?}", entry, e));
    interp.stack().to_vec()
}

/// Check the non-function part of a stack.
pub fn assert_stack(program: &str, code: &str, expected: &[Value]) {
    let actual = eval_values(program, code);
    assert_eq!(actual, expected, "stack mismatch for '{}'", code);
}

/// Evaluate `code` and expect a resolution error matching `check`.
pub fn assert_resolve_error(program: &str, code: &str, check: impl Fn(&ResolveError) -> bool) {
    let (mut interp, _) = interpreter(program);
    match interp.eval(code) {
        Err(Error::Resolve(e)) => assert!(check(&e), "unexpected error for '{}': {:?}", code, e),
        other => panic!("expected a resolution error for '{}', got {:?}", code, other),
    }
}

/// Integer values for a stack literal.
pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}
