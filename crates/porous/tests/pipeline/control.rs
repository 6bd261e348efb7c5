//! `while`, branching through `?`, recursion, and output.

use super::{eval_values, interpreter, ints};
use porous::value::Value;

const TICK: &str = "tick = (int : int bool) { 1 - dup %!printInt dup 0 > }";

const FACT: &str = "fact = (int : int) {
    dup 1 >
    (int : int) { drop 1 } swap
    (int : int) { dup 1 - fact : drop * } swap
    ? : drop
}";

#[test]
fn while_false_runs_nothing() {
    let (mut interp, output) = interpreter(TICK);
    interp.eval("0 tick false while").unwrap();
    assert_eq!(interp.stack()[0], Value::Int(0));
    assert_eq!(interp.stack().len(), 2);
    assert_eq!(output.contents(), "");
}

#[test]
fn while_counts_down() {
    let (mut interp, output) = interpreter(TICK);
    interp.eval("3 tick true while drop").unwrap();
    assert_eq!(interp.stack(), ints(&[0]).as_slice());
    assert_eq!(output.contents(), "210");
}

#[test]
fn while_with_literal_body() {
    // sum 1..=4 keeping (counter total) on the stack
    let stack = eval_values(
        "",
        "4 0 (int int : int int bool) { over + swap 1 - swap over 0 > } true while drop",
    );
    assert_eq!(stack, ints(&[0, 10]));
}

#[test]
fn factorial() {
    let stack = eval_values(FACT, "5 fact : drop 1 fact : drop 0 fact : drop");
    assert_eq!(stack, ints(&[120, 1, 1]));
}

#[test]
fn factorial_via_run() {
    let program = format!("{}\nmain = (: int) {{ 6 fact : drop }}", FACT);
    let (mut interp, _) = interpreter(&program);
    interp.run("main").unwrap();
    assert_eq!(interp.stack(), ints(&[720]).as_slice());
}

#[test]
fn put_writes_chars() {
    let (mut interp, output) = interpreter("");
    interp.eval("'h' put 'i' put '\\n' put").unwrap();
    assert_eq!(output.contents(), "hi\n");
    assert!(interp.stack().is_empty());
}

#[test]
fn extern_calls() {
    let (mut interp, output) = interpreter("");
    interp
        .eval("42 %!printInt %!nl true %!printBool 7 %!dtc 'A' %!ord")
        .unwrap();
    assert_eq!(output.contents(), "42\ntrue");
    assert_eq!(interp.stack(), &[Value::Char('7'), Value::Int(65)]);
}

#[test]
fn choose_between_functions() {
    let program = "inc = (int : int) { 1 + }\ndec = (int : int) { 1 - }";
    let stack = eval_values(program, "10 inc dec false ? : drop 10 inc dec true ? : drop");
    assert_eq!(stack, ints(&[11, 9]));
}
