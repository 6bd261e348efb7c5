//! Session behavior: incremental evaluation, `run`, and inspection.

use super::{interpreter, run_values};
use porous::{
    Error, Interpreter, InterpreterConfig, ResolveError, RuntimeError, types::Type,
    value::Value,
};

#[test]
fn stack_persists_between_evals() {
    let mut interp = Interpreter::new();
    interp.eval("1 2").unwrap();
    interp.eval("+").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(3)]);
}

#[test]
fn failed_resolution_leaves_session_untouched() {
    let mut interp = Interpreter::new();
    interp.eval("1 'a'").unwrap();
    assert!(interp.eval("2 +").is_err());
    assert_eq!(interp.typed_stack(), vec!["1:int".to_string(), "'a':char".to_string()]);
    interp.eval("drop 2 +").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(3)]);
}

#[test]
fn typed_stack() {
    let (mut interp, _) = interpreter("inc = (int : int) { 1 + }");
    interp.eval("7 true 'z' inc").unwrap();
    assert_eq!(
        interp.typed_stack(),
        vec!["7:int", "true:bool", "'z':char", "(int : int):(int : int)"]
    );
}

#[test]
fn run_entry() {
    let stack = run_values("main = (: int int) { 6 7 * 1 }", "main");
    assert_eq!(stack, vec![Value::Int(42), Value::Int(1)]);
}

#[test]
fn run_resets_stacks() {
    let (mut interp, output) = interpreter("main = (:) { 'o' put 'k' put }");
    interp.eval("1 2 3").unwrap();
    interp.run("main").unwrap();
    assert!(interp.stack().is_empty());
    assert!(interp.types().is_empty());
    assert_eq!(output.contents(), "ok");
}

#[test]
fn run_requires_a_function() {
    let (mut interp, _) = interpreter("main = 5");
    assert!(interp.run("main").is_err());
    let (mut interp, _) = interpreter("");
    assert!(interp.run("main").is_err());
}

#[test]
fn macros_expand_inline() {
    let (mut interp, _) = interpreter("square % { dup * }");
    interp.eval("4 square 3 square +").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(25)]);
}

#[test]
fn definitions_accumulate() {
    let mut interp = Interpreter::new();
    interp.load("inc = (int : int) { 1 + }").unwrap();
    interp.load("twice = (int : int) { inc : drop inc : drop }").unwrap();
    interp.eval("5 twice : drop").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(7)]);
}

#[test]
fn config_from_toml() {
    let config = InterpreterConfig::from_toml_str("max_stack_depth = 2\nentry = \"start\"").unwrap();
    let mut interp = Interpreter::with_config(config);
    assert_eq!(interp.config().entry, "start");
    assert!(interp.eval("1 2").is_ok());
    assert!(interp.eval("3").is_err());
    assert_eq!(interp.stack().len(), 2);
    assert_eq!(interp.types().len(), 2);
}

#[test]
fn runtime_error_rolls_back_both_stacks() {
    let mut interp = Interpreter::new();
    interp.eval("7").unwrap();
    assert!(matches!(
        interp.eval("1 0 /"),
        Err(Error::Runtime(RuntimeError::DivisionByZero { .. }))
    ));
    assert_eq!(interp.stack(), &[Value::Int(7)]);
    assert_eq!(interp.types(), &[Type::INT]);
    interp.eval("5 +").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(12)]);
}

#[test]
fn failed_division_leaves_nothing_to_add_to() {
    let mut interp = Interpreter::new();
    assert!(interp.eval("1 0 /").is_err());
    assert_eq!(interp.stack().len(), interp.types().len());
    assert!(matches!(
        interp.eval("5 +"),
        Err(Error::Resolve(ResolveError::UnbalancedStack { .. }))
    ));
}

#[test]
fn generic_body_error_rolls_back() {
    let mut interp = Interpreter::new();
    let err = interp.eval("1 2 (<T> : T) { drop } :").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::Resolve(ResolveError::UnbalancedStack { .. }))
    ));
    assert_eq!(interp.stack(), &[Value::Int(1), Value::Int(2)]);
    assert_eq!(interp.types(), &[Type::INT, Type::INT]);
}

#[test]
fn failed_step_keeps_types() {
    let mut interp = Interpreter::new();
    interp.eval("4 0").unwrap();
    let statements = porous::parse::parse_statements("%").unwrap();
    let directions = interp.directions(&statements).unwrap();
    assert!(interp.step(&directions[0]).is_err());
    assert_eq!(interp.types(), &[Type::INT, Type::INT]);
    assert_eq!(interp.stack(), &[Value::Int(4), Value::Int(0)]);
}

#[test]
fn failed_run_leaves_empty_stacks() {
    let (mut interp, _) = interpreter("main = (: int) { 1 0 % }");
    interp.eval("9").unwrap();
    assert!(interp.run("main").is_err());
    assert!(interp.stack().is_empty());
    assert!(interp.types().is_empty());
}

#[test]
fn reset_keeps_definitions() {
    let (mut interp, _) = interpreter("one = (: int) { 1 }");
    interp.eval("one : drop").unwrap();
    interp.reset();
    assert!(interp.stack().is_empty());
    interp.eval("one : drop").unwrap();
    assert_eq!(interp.stack(), &[Value::Int(1)]);
}

#[test]
fn single_step() {
    let mut interp = Interpreter::new();
    let statements = porous::parse::parse_statements("2 3 *").unwrap();
    let directions = interp.directions(&statements).unwrap();
    interp.step(&directions[0]).unwrap();
    interp.step(&directions[1]).unwrap();
    assert_eq!(interp.typed_stack(), vec!["2:int", "3:int"]);
    interp.step(&directions[2]).unwrap();
    assert_eq!(interp.stack(), &[Value::Int(6)]);
    assert_eq!(interp.types(), &[Type::INT]);
}
