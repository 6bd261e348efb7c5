//! Integer arithmetic and comparison.

use super::{assert_stack, eval_values, ints};
use porous::value::Value;

#[test]
fn add() {
    assert_stack("", "1 2 +", &ints(&[3]));
}

#[test]
fn operand_order() {
    assert_stack("", "10 3 -", &ints(&[7]));
    assert_stack("", "10 3 /", &ints(&[3]));
    assert_stack("", "10 3 %", &ints(&[1]));
}

#[test]
fn negative_literals() {
    assert_stack("", "-4 6 *", &ints(&[-24]));
    assert_stack("", "-7 2 /", &ints(&[-3]));
}

#[test]
fn overflow_wraps() {
    assert_stack("", "9223372036854775807 1 +", &ints(&[i64::MIN]));
}

#[test]
fn comparisons() {
    assert_eq!(eval_values("", "5 0 <"), vec![Value::Bool(false)]);
    assert_eq!(eval_values("", "5 0 >"), vec![Value::Bool(true)]);
    assert_eq!(eval_values("", "3 3 <="), vec![Value::Bool(true)]);
    assert_eq!(eval_values("", "3 4 >="), vec![Value::Bool(false)]);
}

#[test]
fn equality() {
    assert_eq!(
        eval_values("", "'a' 'a' == 1 2 == true not"),
        vec![Value::Bool(true), Value::Bool(false), Value::Bool(false)]
    );
}
