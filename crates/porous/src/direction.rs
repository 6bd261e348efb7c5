//! Directions: untyped operations, one per source occurrence.

use std::rc::Rc;

use crate::{error::Origin, function::GenericFunction};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" => Some(ArithOp::Mul),
            "/" => Some(ArithOp::Div),
            "%" => Some(ArithOp::Rem),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    /// Wrapping arithmetic; `None` on division by zero.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithOp::Add => Some(a.wrapping_add(b)),
            ArithOp::Sub => Some(a.wrapping_sub(b)),
            ArithOp::Mul => Some(a.wrapping_mul(b)),
            ArithOp::Div if b == 0 => None,
            ArithOp::Div => Some(a.wrapping_div(b)),
            ArithOp::Rem if b == 0 => None,
            ArithOp::Rem => Some(a.wrapping_rem(b)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            "<=" => Some(CompareOp::Le),
            ">=" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }

    pub fn apply(self, a: i64, b: i64) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Gt => a > b,
            CompareOp::Le => a <= b,
            CompareOp::Ge => a >= b,
        }
    }
}

#[derive(Clone, Debug)]
pub enum DirectionKind {
    PushInt(i64),
    PushChar(char),
    PushBool(bool),
    PushFunction(Rc<GenericFunction>),
    Arithmetic(ArithOp),
    Comparison(CompareOp),
    Do,
    Dup,
    Drop,
    Swap,
    Over,
    Choose,
    Equals,
    Not,
    Put,
    While,
    Curry,
    CallGlobal(String),
    Extern(String),
}

impl DirectionKind {
    /// Builtin words, as opposed to operators and literals.
    pub fn builtin(word: &str) -> Option<Self> {
        match word {
            "dup" => Some(DirectionKind::Dup),
            "drop" => Some(DirectionKind::Drop),
            "swap" => Some(DirectionKind::Swap),
            "over" => Some(DirectionKind::Over),
            "not" => Some(DirectionKind::Not),
            "put" => Some(DirectionKind::Put),
            "while" => Some(DirectionKind::While),
            "curry" => Some(DirectionKind::Curry),
            _ => None,
        }
    }
}

/// An untyped operation and the source it came from. Immutable once built.
#[derive(Clone, Debug)]
pub struct Direction {
    pub kind: DirectionKind,
    pub origin: Origin,
}

impl Direction {
    pub fn new(kind: DirectionKind, origin: Origin) -> Self {
        Self { kind, origin }
    }
}
