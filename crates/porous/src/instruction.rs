//! Instructions: resolved, concretely typed operations.

use std::rc::{Rc, Weak};

use crate::{
    direction::{ArithOp, CompareOp},
    error::Origin,
    externs::ExternCall,
    function::{FunctionRef, GenericFunction, SpecKey},
    types::{Signature, Type},
    value::Value,
};

/// A push of a function whose specialization was still in progress when
/// the push was resolved. The cached function is fetched when it runs.
#[derive(Clone, Debug)]
pub struct DeferredFunction {
    pub function: Weak<GenericFunction>,
    pub key: SpecKey,
}

impl DeferredFunction {
    pub fn new(function: &Rc<GenericFunction>, key: SpecKey) -> Self {
        Self {
            function: Rc::downgrade(function),
            key,
        }
    }

    pub fn fetch(&self) -> Option<FunctionRef> {
        self.function.upgrade()?.cached(&self.key)
    }
}

impl PartialEq for DeferredFunction {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.function, &other.function) && self.key == other.key
    }
}

/// What an instruction does when executed.
///
/// `args` on the calling instructions are the callee's input types as
/// resolved, used to specialize generic function values at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum InstructionKind {
    Push(Value),
    PushDeferred(DeferredFunction),
    Arithmetic(ArithOp),
    Comparison(CompareOp),
    Do { args: Vec<Type> },
    Dup,
    Drop,
    Swap,
    Over,
    Choose,
    Equals,
    Not,
    Put,
    While { args: Vec<Type> },
    Curry { args: Vec<Type> },
    Extern(ExternCall),
}

/// A resolved operation with a fixed stack effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub signature: Signature,
    pub origin: Origin,
}

impl Instruction {
    pub(crate) fn new(kind: InstructionKind, signature: Signature, origin: Origin) -> Self {
        Self {
            kind,
            signature,
            origin,
        }
    }

    /// The stack effect.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}
