//! Error reporting across the pipeline.

use super::{assert_resolve_error, interpreter};
use porous::{Error, InterpreterConfig, Interpreter, ParseError, ResolveError, RuntimeError};
use porous_core::ErrorCode;

#[test]
fn unknown_extern_stops_before_execution() {
    let (mut interp, output) = interpreter("");
    let err = interp.eval("'a' put %!bogus").unwrap_err();
    assert!(matches!(
        err,
        Error::Resolve(ResolveError::UnknownExtern { ref name, .. }) if name == "bogus"
    ));
    assert_eq!(output.contents(), "");
    assert!(interp.stack().is_empty());
    assert!(interp.types().is_empty());
}

#[test]
fn unknown_word() {
    assert_resolve_error("", "1 frobnicate", |e| {
        matches!(e, ResolveError::UnknownDirection { name, .. } if name == "frobnicate")
    });
}

#[test]
fn type_mismatch() {
    assert_resolve_error("", "1 'a' +", |e| matches!(e, ResolveError::TypeMismatch { .. }));
    assert_resolve_error("", "1 2 'c' ?", |e| matches!(e, ResolveError::TypeMismatch { .. }));
}

#[test]
fn underflow_is_static() {
    assert_resolve_error("", "1 +", |e| matches!(e, ResolveError::UnbalancedStack { .. }));
}

#[test]
fn bad_body_is_reported() {
    assert_resolve_error("f = (int : bool) { 1 + }", "1 f :", |e| {
        matches!(e, ResolveError::SignatureMismatch { .. })
    });
}

#[test]
fn duplicate_definition() {
    let mut interp = Interpreter::new();
    let err = interp.load("f = (:) { }\nf = (:) { }").unwrap_err();
    assert!(matches!(err, Error::Resolve(ResolveError::InvalidGlobal { .. })));
}

#[test]
fn parse_errors() {
    let mut interp = Interpreter::new();
    assert!(matches!(interp.eval("1 $"), Err(Error::Parse(ParseError::UnrecognizedChar { .. }))));
    assert!(matches!(interp.eval("(int : int) { 1"), Err(Error::Parse(_))));
}

#[test]
fn division_by_zero() {
    let (mut interp, _) = interpreter("");
    let err = interp.eval("1 0 /").unwrap_err();
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { .. })));
    assert_eq!(err.code(), ErrorCode::E302);
}

#[test]
fn call_depth_exceeded() {
    let config = InterpreterConfig {
        max_call_depth: 32,
        ..InterpreterConfig::default()
    };
    let mut interp = Interpreter::with_config(config);
    interp.load("loop = (int : int) { loop : drop }").unwrap();
    let err = interp.eval("1 loop :").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::CallDepthExceeded { limit: 32, .. })
    ));
}

#[test]
fn stack_overflow() {
    let config = InterpreterConfig {
        max_stack_depth: 4,
        ..InterpreterConfig::default()
    };
    let mut interp = Interpreter::with_config(config);
    let err = interp.eval("1 2 3 4 5").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::StackOverflow { limit: 4, .. })
    ));
}

#[test]
fn extern_failure() {
    let (mut interp, _) = interpreter("");
    let err = interp.eval("12 %!dtc").unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::Extern { ref name, .. }) if name == "dtc"
    ));
}

#[test]
fn diagnostics_point_at_source() {
    let source = "1\n'a' +";
    let mut interp = Interpreter::new();
    let err = interp.eval(source).unwrap_err();
    let rendered = err.to_diagnostic().render(source);
    assert!(rendered.starts_with("error[E202]"), "{}", rendered);
    assert!(rendered.contains("2:5"), "{}", rendered);
}

#[test]
fn missing_entry_names_it() {
    let (mut interp, _) = interpreter("");
    let err = interp.run("main").unwrap_err();
    match err {
        Error::Resolve(ResolveError::UnknownGlobal { name, origin }) => {
            assert_eq!(name, "main");
            assert_eq!(&*origin.text, "main");
        }
        other => panic!("expected an unknown global, got {:?}", other),
    }
}
