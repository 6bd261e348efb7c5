//! Runtime values.
//!
//! Porous has three primitive value kinds plus callables:
//! - `Int`, `Char`, `Bool`
//! - `Function`: a specialized function, shared by reference
//! - `Generic`: a function literal whose signature still has generics,
//!   specialized when a `do`, `while` or `curry` reaches it

use std::{fmt, rc::Rc};

use crate::{
    function::{FunctionRef, GenericFunction},
    types::{Bindings, Signature, Type},
};

/// An unspecialized function value together with the generic bindings of
/// the function it was pushed from.
#[derive(Clone, Debug)]
pub struct GenericValue {
    pub function: Rc<GenericFunction>,
    pub seed: Bindings,
    pub signature: Signature,
}

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Char(char),
    Bool(bool),
    Function(FunctionRef),
    Generic(GenericValue),
}

impl Value {
    /// The runtime type of the value. For curried functions this is the
    /// remaining signature.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Int(_) => Type::INT,
            Value::Char(_) => Type::CHAR,
            Value::Bool(_) => Type::BOOL,
            Value::Function(f) => Type::signature(f.effective_signature()),
            Value::Generic(g) => Type::signature(g.signature.clone()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// Primitives compare by value, callables by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Generic(a), Value::Generic(b)) => {
                Rc::ptr_eq(&a.function, &b.function) && a.seed == b.seed
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Function(func) => write!(f, "{}", func.effective_signature()),
            Value::Generic(g) => write!(f, "{}", g.signature),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
