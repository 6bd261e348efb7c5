//! Function values: literals, globals, `:` and `curry`.

use super::{assert_stack, eval_values, ints};
use porous::value::Value;

const ADD: &str = "add = (int int : int) { + }";

/// Split a stack into its leading integers and the function on top.
fn ints_then_function(stack: &[Value]) -> (Vec<i64>, &Value) {
    let (top, rest) = stack.split_last().expect("non-empty stack");
    assert!(top.as_function().is_some(), "expected a function on top, got {}", top);
    let rest = rest.iter().map(|v| v.as_int().expect("int")).collect();
    (rest, top)
}

#[test]
fn do_leaves_callable() {
    let stack = eval_values(ADD, "1 2 add :");
    let (values, _) = ints_then_function(&stack);
    assert_eq!(values, vec![3]);
}

#[test]
fn literal_call() {
    let stack = eval_values("", "4 (int : int) { dup * } : drop");
    assert_eq!(stack, ints(&[16]));
}

#[test]
fn generic_call() {
    let program = "double = (<T> : T T) { dup }";
    let stack = eval_values(program, "'x' double : drop 7 double : drop");
    assert_eq!(
        stack,
        vec![Value::Char('x'), Value::Char('x'), Value::Int(7), Value::Int(7)]
    );
}

#[test]
fn global_alias() {
    let program = "plus = add\nadd = (int int : int) { + }";
    let stack = eval_values(program, "2 5 plus : drop");
    assert_eq!(stack, ints(&[7]));
}

#[test]
fn same_specialization_is_shared() {
    let stack = eval_values(ADD, "add add");
    let (a, b) = (stack[0].as_function().unwrap(), stack[1].as_function().unwrap());
    assert!(std::rc::Rc::ptr_eq(a, b));
    assert_eq!(stack[0], stack[1]);
}

#[test]
fn curry_then_call() {
    let stack = eval_values(ADD, "3 5 add curry :");
    let (values, top) = ints_then_function(&stack);
    assert_eq!(values, vec![8]);
    assert_eq!(top.type_of().to_string(), "(int : int)");
}

#[test]
fn curried_values_come_first() {
    let program = "sub = (int int : int) { - }";
    // 10 is bound as the left operand; 3 is supplied at the call.
    let stack = eval_values(program, "3 10 sub curry : drop");
    assert_eq!(stack, ints(&[7]));
}

#[test]
fn curry_state_is_shared() {
    // Currying mutates the cached specialization, so a later `add`
    // already carries the 5.
    let stack = eval_values(ADD, "5 add curry drop 10 3 add :");
    let (values, _) = ints_then_function(&stack);
    assert_eq!(values, vec![10, 8]);
}

#[test]
fn curried_function_keeps_its_values() {
    let stack = eval_values(ADD, "1 add curry 2 swap : 3 swap : drop");
    assert_eq!(stack, ints(&[3, 4]));
}

#[test]
fn generic_curry() {
    let program = "pick = (<T> <T> bool : T) { ? }";
    // first input is bound to 'a', leaving (char bool : char)
    let stack = eval_values(program, "'b' true 'a' pick curry : drop");
    assert_eq!(stack, vec![Value::Char('b')]);
}

#[test]
fn function_equality_is_identity() {
    let program = "one = (: int) { 1 }\ntwo = (: int) { 1 }";
    assert_stack(program, "one one ==", &[Value::Bool(true)]);
    assert_stack(program, "one two ==", &[Value::Bool(false)]);
}
