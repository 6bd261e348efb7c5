//! Stack manipulation.

use super::{assert_stack, ints};
use porous::value::Value;

#[test]
fn dup() {
    assert_stack("", "3 dup +", &ints(&[6]));
}

#[test]
fn drop() {
    assert_stack("", "1 2 3 drop", &ints(&[1, 2]));
}

#[test]
fn swap() {
    // 3 4 swap - = 4 3 -
    assert_stack("", "3 4 swap -", &ints(&[1]));
}

#[test]
fn over() {
    assert_stack("", "5 'x' over", &[Value::Int(5), Value::Char('x'), Value::Int(5)]);
}

#[test]
fn choose() {
    assert_stack("", "10 20 true ?", &ints(&[20]));
    assert_stack("", "10 20 false ?", &ints(&[10]));
}
