//! Generic functions and their concrete specializations.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt,
    rc::Rc,
};

use crate::{
    direction::Direction,
    error::Origin,
    instruction::Instruction,
    types::{Bindings, Signature, Type},
    value::Value,
};

pub type FunctionRef = Rc<Function>;

/// Cache key for one specialization.
///
/// `args` are the concrete input types, bottom-to-top. `seed` holds the
/// bindings inherited from the enclosing function and is empty for
/// top-level definitions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecKey {
    pub args: Vec<Type>,
    pub seed: Bindings,
}

impl SpecKey {
    pub fn new(args: impl Into<Vec<Type>>, seed: Bindings) -> Self {
        Self {
            args: args.into(),
            seed,
        }
    }
}

/// A function as written: declared signature, unresolved body, and the
/// specializations produced from it so far.
pub struct GenericFunction {
    signature: Signature,
    body: Vec<Direction>,
    origin: Origin,
    cache: RefCell<HashMap<SpecKey, FunctionRef>>,
    pending: RefCell<HashSet<SpecKey>>,
}

impl GenericFunction {
    pub fn new(signature: Signature, body: Vec<Direction>, origin: Origin) -> Self {
        Self {
            signature,
            body,
            origin,
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashSet::new()),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn body(&self) -> &[Direction] {
        &self.body
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn cached(&self, key: &SpecKey) -> Option<FunctionRef> {
        self.cache.borrow().get(key).cloned()
    }

    /// Number of specializations produced so far.
    pub fn specializations(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Entries are only ever added; a key is stored at most once.
    pub(crate) fn store(&self, key: SpecKey, function: FunctionRef) {
        self.cache.borrow_mut().entry(key).or_insert(function);
    }

    pub fn is_pending(&self, key: &SpecKey) -> bool {
        self.pending.borrow().contains(key)
    }

    pub(crate) fn begin(&self, key: SpecKey) {
        self.pending.borrow_mut().insert(key);
    }

    pub(crate) fn finish(&self, key: &SpecKey) {
        self.pending.borrow_mut().remove(key);
    }
}

impl fmt::Debug for GenericFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericFunction")
            .field("signature", &self.signature.to_string())
            .field("origin", &self.origin)
            .field("directions", &self.body.len())
            .field("specializations", &self.specializations())
            .finish()
    }
}

/// A specialized function value.
///
/// The curry buffer belongs to the instance: every alias of the same
/// `FunctionRef` sees values bound through any other.
#[derive(Debug)]
pub struct Function {
    signature: Signature,
    body: Vec<Instruction>,
    origin: Origin,
    curry: RefCell<Vec<Value>>,
}

impl Function {
    pub fn new(signature: Signature, body: Vec<Instruction>, origin: Origin) -> Self {
        Self {
            signature,
            body,
            origin,
            curry: RefCell::new(Vec::new()),
        }
    }

    /// The signature the function was specialized with.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The signature left after removing curried inputs.
    pub fn effective_signature(&self) -> Signature {
        let bound = self.curry.borrow().len().min(self.signature.ins.len());
        Signature {
            ins: self.signature.ins[bound..].iter().cloned().collect(),
            outs: self.signature.outs.clone(),
        }
    }

    /// Inputs a caller still has to supply.
    pub fn arity(&self) -> usize {
        self.signature.ins.len().saturating_sub(self.curry.borrow().len())
    }

    pub fn body(&self) -> &[Instruction] {
        &self.body
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Copies of the curried values, in the order they were bound.
    pub fn curried(&self) -> Vec<Value> {
        self.curry.borrow().clone()
    }

    /// Bind the next leading input.
    pub fn bind(&self, value: Value) {
        self.curry.borrow_mut().push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_sig() -> Signature {
        Signature::new([Type::INT, Type::INT], [Type::INT])
    }

    #[test]
    fn curry_shrinks_effective_signature() {
        let f = Function::new(add_sig(), Vec::new(), Origin::default());
        assert_eq!(f.arity(), 2);
        f.bind(Value::Int(5));
        assert_eq!(f.arity(), 1);
        assert_eq!(f.effective_signature(), Signature::new([Type::INT], [Type::INT]));
        assert_eq!(f.signature(), &add_sig());
        assert_eq!(f.curried(), vec![Value::Int(5)]);
    }

    #[test]
    fn cache_is_monotonic() {
        let g = GenericFunction::new(add_sig(), Vec::new(), Origin::default());
        let key = SpecKey::new(vec![Type::INT, Type::INT], Bindings::new());
        let first = Rc::new(Function::new(add_sig(), Vec::new(), Origin::default()));
        let second = Rc::new(Function::new(add_sig(), Vec::new(), Origin::default()));

        g.store(key.clone(), first.clone());
        g.store(key.clone(), second);
        let cached = g.cached(&key).unwrap();
        assert!(Rc::ptr_eq(&cached, &first));
        assert_eq!(g.specializations(), 1);
    }

    #[test]
    fn pending_keys() {
        let g = GenericFunction::new(add_sig(), Vec::new(), Origin::default());
        let key = SpecKey::new(vec![Type::INT, Type::INT], Bindings::new());
        assert!(!g.is_pending(&key));
        g.begin(key.clone());
        assert!(g.is_pending(&key));
        g.finish(&key);
        assert!(!g.is_pending(&key));
    }
}
