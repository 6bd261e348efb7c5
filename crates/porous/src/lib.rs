//! Porous: a statically typed stack language.
//!
//! Programs are sequences of words operating on an explicit value stack.
//! Functions carry explicit `(ins : outs)` signatures, optionally generic.
//! The pipeline:
//! - **Parse**: source text → tagged token tree
//! - **Process**: tokens → directions, expanding macros
//! - **Resolve**: directions → typed instructions, specializing generic
//!   functions per argument types and checking every stack effect
//! - **Execute**: instructions run against the data stack
//!
//! # Architecture
//!
//! ```text
//! Source → Tokens → Directions → Instructions → Machine
//!          (parse)   (program)    (resolve)      (vm)
//! ```
//!
//! # Example
//!
//! ```
//! use porous::{eval, value::Value};
//!
//! let result = eval("3 dup +").unwrap();
//! assert_eq!(result, vec![Value::Int(6)]);
//! ```

pub mod config;
pub mod direction;
pub mod error;
pub mod externs;
pub mod function;
pub mod instruction;
pub mod parse;
pub mod program;
pub mod resolve;
pub mod session;
pub mod types;
pub mod value;
pub mod vm;

pub use config::{ConfigError, InterpreterConfig};
pub use error::{Error, Origin, ParseError, ResolveError, RuntimeError};
pub use externs::ExternRegistry;
pub use session::Interpreter;

/// Evaluate statements in a fresh interpreter and return the stack.
///
/// Output from `put` and externs goes to stdout.
pub fn eval(source: &str) -> Result<Vec<value::Value>, Error> {
    let mut interp = Interpreter::new();
    interp.eval(source)?;
    Ok(interp.stack().to_vec())
}
