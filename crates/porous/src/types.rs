//! The type model.
//!
//! Types are primitives, generic placeholders, or function signatures.
//! This module provides:
//! - Structural equality and hashing (generics compare by name)
//! - Substitution of bound generics
//! - Generic matching against concrete types

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use smallvec::SmallVec;
use thiserror::Error;

use crate::error::{Origin, ResolveError};

/// Generic name to bound type.
pub type Bindings = BTreeMap<Rc<str>, Type>;

/// Inline storage for signature inputs and outputs.
pub type TypeList = SmallVec<[Type; 4]>;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Primitive {
    Int,
    Char,
    Bool,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Primitive::Int),
            "char" => Some(Primitive::Char),
            "bool" => Some(Primitive::Bool),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Char => "char",
            Primitive::Bool => "bool",
        }
    }
}

/// An unresolved placeholder.
///
/// `binding` marks the determining occurrence (`<T>` in source). It only
/// affects display and which names a nested function literal rebinds;
/// equality and hashing go by name alone.
#[derive(Clone, Debug)]
pub struct Generic {
    pub name: Rc<str>,
    pub binding: bool,
}

impl PartialEq for Generic {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Generic {}

impl Hash for Generic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(Primitive),
    Generic(Generic),
    Signature(Rc<Signature>),
}

impl Type {
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const CHAR: Type = Type::Primitive(Primitive::Char);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);

    pub fn generic(name: impl Into<Rc<str>>, binding: bool) -> Self {
        Type::Generic(Generic {
            name: name.into(),
            binding,
        })
    }

    pub fn signature(signature: Signature) -> Self {
        Type::Signature(Rc::new(signature))
    }

    /// The signature, if this is a function type.
    pub fn as_signature(&self) -> Option<&Signature> {
        match self {
            Type::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// Replace every bound generic, recursing through signatures. A nested
    /// signature that rebinds a name with `<T>` keeps its own `T`.
    pub fn substitute(&self, bindings: &Bindings) -> Type {
        match self {
            Type::Primitive(_) => self.clone(),
            Type::Generic(g) => bindings.get(&g.name).cloned().unwrap_or_else(|| self.clone()),
            Type::Signature(sig) => {
                let own = sig.binding_names();
                if own.is_empty() {
                    return Type::Signature(Rc::new(sig.substitute(bindings)));
                }
                let outer: Bindings = bindings
                    .iter()
                    .filter(|(name, _)| !own.contains(*name))
                    .map(|(name, ty)| (name.clone(), ty.clone()))
                    .collect();
                Type::Signature(Rc::new(sig.substitute(&outer)))
            }
        }
    }

    /// True when no free generic occurs in the type. A function type that
    /// binds all of its own generics, like `(<T> : T)`, is concrete.
    pub fn is_concrete(&self) -> bool {
        let mut names = BTreeSet::new();
        self.collect_free(&mut names);
        names.is_empty()
    }

    fn collect_free(&self, names: &mut BTreeSet<Rc<str>>) {
        match self {
            Type::Primitive(_) => {}
            Type::Generic(g) => {
                names.insert(g.name.clone());
            }
            Type::Signature(sig) => {
                let mut inner = sig.free_generics();
                for name in sig.binding_names() {
                    inner.remove(&name);
                }
                names.extend(inner);
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => f.write_str(p.name()),
            Type::Generic(g) if g.binding => write!(f, "<{}>", g.name),
            Type::Generic(g) => f.write_str(&g.name),
            Type::Signature(sig) => write!(f, "{}", sig),
        }
    }
}

// ============================================================================
// Signatures
// ============================================================================

/// A function type: inputs bottom-to-top, outputs bottom-to-top.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    pub ins: TypeList,
    pub outs: TypeList,
}

impl Signature {
    pub fn new(ins: impl IntoIterator<Item = Type>, outs: impl IntoIterator<Item = Type>) -> Self {
        Self {
            ins: ins.into_iter().collect(),
            outs: outs.into_iter().collect(),
        }
    }

    pub fn substitute(&self, bindings: &Bindings) -> Signature {
        Signature {
            ins: self.ins.iter().map(|t| t.substitute(bindings)).collect(),
            outs: self.outs.iter().map(|t| t.substitute(bindings)).collect(),
        }
    }

    /// True when the signature has no free generics, its own `<T>`
    /// occurrences included.
    pub fn is_concrete(&self) -> bool {
        self.free_generics().is_empty()
    }

    /// Generic names that matching against this signature's inputs has to
    /// bind. Names a nested signature rebinds are not free.
    pub fn free_generics(&self) -> BTreeSet<Rc<str>> {
        let mut names = BTreeSet::new();
        for ty in self.ins.iter().chain(&self.outs) {
            ty.collect_free(&mut names);
        }
        names
    }

    /// Names with a determining (`<T>`) occurrence directly in the inputs
    /// or outputs.
    pub fn binding_names(&self) -> BTreeSet<Rc<str>> {
        self.ins
            .iter()
            .chain(&self.outs)
            .filter_map(|ty| match ty {
                Type::Generic(g) if g.binding => Some(g.name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for ty in &self.ins {
            write!(f, "{} ", ty)?;
        }
        f.write_str(":")?;
        for ty in &self.outs {
            write!(f, " {}", ty)?;
        }
        f.write_str(")")
    }
}

/// Render a type sequence for messages, bottom-to-top.
pub fn format_types(types: &[Type]) -> String {
    if types.is_empty() {
        return "nothing".to_string();
    }
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Generic matching
// ============================================================================

/// Failure to unify a declared type with an actual one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Type, found: Type },

    #[error("expected {expected}, found {found}")]
    ArityMismatch { expected: Type, found: Type },
}

impl MatchError {
    /// Attach the origin of the direction being resolved.
    pub fn at(self, origin: &Origin) -> ResolveError {
        match self {
            MatchError::TypeMismatch { expected, found } => ResolveError::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                origin: origin.clone(),
            },
            MatchError::ArityMismatch { expected, found } => ResolveError::ArityMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                origin: origin.clone(),
            },
        }
    }
}

/// Unify `declared` with `actual`, recording generic bindings.
///
/// A generic name that is already bound must see an equal type again;
/// an unbound one is bound to `actual`.
pub fn match_generics(
    declared: &Type,
    actual: &Type,
    bindings: &mut Bindings,
) -> Result<(), MatchError> {
    match (declared, actual) {
        (Type::Generic(g), _) => match bindings.get(&g.name) {
            Some(bound) if bound != actual => Err(MatchError::TypeMismatch {
                expected: bound.clone(),
                found: actual.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                bindings.insert(g.name.clone(), actual.clone());
                Ok(())
            }
        },
        (Type::Primitive(a), Type::Primitive(b)) if a == b => Ok(()),
        (Type::Primitive(_), _) => Err(MatchError::TypeMismatch {
            expected: declared.clone(),
            found: actual.clone(),
        }),
        (Type::Signature(d), Type::Signature(a)) => {
            if d.ins.len() != a.ins.len() || d.outs.len() != a.outs.len() {
                return Err(MatchError::ArityMismatch {
                    expected: declared.clone(),
                    found: actual.clone(),
                });
            }
            for (d, a) in d.ins.iter().zip(&a.ins).chain(d.outs.iter().zip(&a.outs)) {
                match_generics(d, a, bindings)?;
            }
            Ok(())
        }
        (Type::Signature(_), _) => Err(MatchError::ArityMismatch {
            expected: declared.clone(),
            found: actual.clone(),
        }),
    }
}

/// Match declared inputs against the top of an abstract stack.
///
/// `actual` holds exactly as many types as `declared`, bottom-to-top.
/// Matching runs top-of-stack first, so the last declared input is the
/// first to bind its generics.
pub fn match_inputs(
    declared: &[Type],
    actual: &[Type],
    bindings: &mut Bindings,
) -> Result<(), MatchError> {
    for (d, a) in declared.iter().rev().zip(actual.iter().rev()) {
        match_generics(d, a, bindings)?;
    }
    Ok(())
}
