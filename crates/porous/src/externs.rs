//! Registry of host-provided native calls.
//!
//! The registry maintains a mapping from call name to its signature and
//! action. Programs reach entries with `%!name`.
//!
//! # Example
//!
//! ```ignore
//! let mut externs = ExternRegistry::with_std();
//! externs.register("twice", Signature::new([Type::INT], [Type::INT]), |m, origin| {
//!     let n = m.pop_int(origin)?;
//!     m.push(Value::Int(n * 2), origin)
//! });
//! ```

use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    error::{Origin, RuntimeError},
    types::{Signature, Type},
    value::Value,
    vm::Machine,
};

/// Native action. It must pop exactly the inputs and push exactly the
/// outputs of the signature it was registered with.
pub type ExternAction = Rc<dyn Fn(&mut Machine<'_>, &Origin) -> Result<(), RuntimeError>>;

/// One registered native call.
#[derive(Clone)]
pub struct ExternCall {
    name: Rc<str>,
    signature: Signature,
    action: ExternAction,
}

impl ExternCall {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn invoke(&self, machine: &mut Machine<'_>, origin: &Origin) -> Result<(), RuntimeError> {
        (self.action)(machine, origin)
    }
}

impl PartialEq for ExternCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.signature == other.signature
    }
}

impl fmt::Debug for ExternCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternCall")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// Native calls by name.
#[derive(Clone, Default)]
pub struct ExternRegistry {
    calls: HashMap<String, ExternCall>,
}

impl ExternRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard calls: `printInt`, `printBool`,
    /// `nl`, `dtc`, `ctd`, `ord` and `chr`.
    pub fn with_std() -> Self {
        let mut externs = Self::new();
        register_std(&mut externs);
        externs
    }

    /// Register a call, replacing any previous one of the same name.
    pub fn register<F>(&mut self, name: &str, signature: Signature, action: F)
    where
        F: Fn(&mut Machine<'_>, &Origin) -> Result<(), RuntimeError> + 'static,
    {
        log::debug!("registered extern {} {}", name, signature);
        self.calls.insert(
            name.to_string(),
            ExternCall {
                name: Rc::from(name),
                signature,
                action: Rc::new(action),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ExternCall> {
        self.calls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.calls.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn extern_failure(name: &str, message: String, origin: &Origin) -> RuntimeError {
    RuntimeError::Extern {
        name: name.to_string(),
        message,
        origin: origin.clone(),
    }
}

fn register_std(externs: &mut ExternRegistry) {
    externs.register("printInt", Signature::new([Type::INT], []), |m, origin| {
        let n = m.pop_int(origin)?;
        m.write(format_args!("{}", n), origin)
    });

    externs.register("printBool", Signature::new([Type::BOOL], []), |m, origin| {
        let b = m.pop_bool(origin)?;
        m.write(format_args!("{}", b), origin)
    });

    externs.register("nl", Signature::default(), |m, origin| {
        m.write(format_args!("\n"), origin)
    });

    externs.register("dtc", Signature::new([Type::INT], [Type::CHAR]), |m, origin| {
        let n = m.pop_int(origin)?;
        let c = u32::try_from(n)
            .ok()
            .and_then(|d| char::from_digit(d, 10))
            .ok_or_else(|| extern_failure("dtc", format!("{} is not a digit", n), origin))?;
        m.push(Value::Char(c), origin)
    });

    externs.register("ctd", Signature::new([Type::CHAR], [Type::INT]), |m, origin| {
        let c = m.pop_char(origin)?;
        let d = c
            .to_digit(10)
            .ok_or_else(|| extern_failure("ctd", format!("{:?} is not a digit", c), origin))?;
        m.push(Value::Int(i64::from(d)), origin)
    });

    externs.register("ord", Signature::new([Type::CHAR], [Type::INT]), |m, origin| {
        let c = m.pop_char(origin)?;
        m.push(Value::Int(i64::from(u32::from(c))), origin)
    });

    externs.register("chr", Signature::new([Type::INT], [Type::CHAR]), |m, origin| {
        let n = m.pop_int(origin)?;
        let c = u32::try_from(n)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                extern_failure("chr", format!("{} is not a character", n), origin)
            })?;
        m.push(Value::Char(c), origin)
    });
}
