//! Program registry.
//!
//! Holds the top-level definitions of a program:
//! - Global name to its root direction
//! - Header names, visible before their definitions are resolved
//! - Macro name to its unexpanded body block
//!
//! It also turns statement tokens into directions. Macros are expanded
//! here, so they leave nothing behind for the resolver.

use std::{
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

use log::{debug, trace};
use porous_core::{ParseToken, Tag};

use crate::{
    direction::{ArithOp, CompareOp, Direction, DirectionKind},
    error::{Origin, ResolveError},
    function::GenericFunction,
    types::{Primitive, Signature, Type},
};

#[derive(Clone, Debug, Default)]
pub struct Program {
    globals: HashMap<String, Direction>,
    headers: BTreeSet<String>,
    macros: HashMap<String, ParseToken>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register top-level definitions.
    ///
    /// All names are registered first, so definitions may refer to each
    /// other in any order. Nothing is registered if any definition fails.
    pub fn load(&mut self, globals: &[ParseToken]) -> Result<(), ResolveError> {
        let mut next = self.clone();

        for token in globals {
            let (name, body) = split_global(token)?;
            if next.headers.contains(name) || next.macros.contains_key(name) {
                return Err(invalid_global(name, "defined more than once", token));
            }
            if DirectionKind::builtin(name).is_some() {
                return Err(invalid_global(name, "shadows a builtin word", token));
            }
            if token.is(Tag::Macro) {
                debug!("registered macro {}", name);
                next.macros.insert(name.to_string(), body.clone());
            } else {
                debug!("registered global {}", name);
                next.headers.insert(name.to_string());
            }
        }

        for token in globals.iter().filter(|t| !t.is(Tag::Macro)) {
            let (name, body) = split_global(token)?;
            let mut directions = next.directions(std::slice::from_ref(body))?;
            if directions.len() != 1 {
                let reason = format!(
                    "must process to exactly one direction, found {}",
                    directions.len()
                );
                return Err(invalid_global(name, &reason, token));
            }
            if let Some(direction) = directions.pop() {
                next.globals.insert(name.to_string(), direction);
            }
        }

        *self = next;
        Ok(())
    }

    /// Process statement tokens into directions, expanding macros.
    pub fn directions(&self, statements: &[ParseToken]) -> Result<Vec<Direction>, ResolveError> {
        let mut expander = Expander {
            program: self,
            active: Vec::new(),
        };
        let mut out = Vec::with_capacity(statements.len());
        for statement in statements {
            expander.process(statement, &mut out)?;
        }
        Ok(out)
    }

    pub fn global(&self, name: &str) -> Option<&Direction> {
        self.globals.get(name)
    }

    pub fn is_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    pub fn is_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Global names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str)
    }
}

fn split_global(token: &ParseToken) -> Result<(&str, &ParseToken), ResolveError> {
    match (token.is(Tag::Global), token.child(0), token.child(1)) {
        (true, Some(name), Some(body)) => Ok((name.content.as_str(), body)),
        _ => Err(malformed(token, "global definition")),
    }
}

fn invalid_global(name: &str, reason: &str, token: &ParseToken) -> ResolveError {
    ResolveError::InvalidGlobal {
        name: name.to_string(),
        reason: reason.to_string(),
        origin: Origin::from_token(token),
    }
}

fn malformed(token: &ParseToken, what: &str) -> ResolveError {
    ResolveError::UnknownDirection {
        name: format!("malformed {} `{}`", what, token),
        origin: Origin::from_token(token),
    }
}

struct Expander<'p> {
    program: &'p Program,
    /// Macros currently being expanded, outermost first.
    active: Vec<String>,
}

impl Expander<'_> {
    fn process(&mut self, token: &ParseToken, out: &mut Vec<Direction>) -> Result<(), ResolveError> {
        let origin = Origin::from_token(token);
        let content = token.content.as_str();

        let kind = if token.is(Tag::BlockType) {
            DirectionKind::PushFunction(Rc::new(self.function(token)?))
        } else if token.is(Tag::Int) {
            let n = content.parse().map_err(|_| malformed(token, "integer"))?;
            DirectionKind::PushInt(n)
        } else if token.is(Tag::Char) {
            let mut chars = content.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => DirectionKind::PushChar(c),
                _ => return Err(malformed(token, "character")),
            }
        } else if token.is(Tag::Bool) {
            match content {
                "true" => DirectionKind::PushBool(true),
                "false" => DirectionKind::PushBool(false),
                _ => return Err(malformed(token, "boolean")),
            }
        } else if token.is(Tag::Oper) {
            if let Some(op) = ArithOp::from_symbol(content) {
                DirectionKind::Arithmetic(op)
            } else if let Some(op) = CompareOp::from_symbol(content) {
                DirectionKind::Comparison(op)
            } else {
                return Err(unknown(token));
            }
        } else if token.is(Tag::BoolOp) {
            match content {
                "==" => DirectionKind::Equals,
                "?" => DirectionKind::Choose,
                ":" => DirectionKind::Do,
                _ => return Err(unknown(token)),
            }
        } else if token.is(Tag::Extern) {
            DirectionKind::Extern(content.to_string())
        } else if token.is(Tag::Word) {
            return self.word(token, origin, out);
        } else {
            return Err(unknown(token));
        };

        out.push(Direction::new(kind, origin));
        Ok(())
    }

    /// Builtins first, then globals, then macros.
    fn word(
        &mut self,
        token: &ParseToken,
        origin: Origin,
        out: &mut Vec<Direction>,
    ) -> Result<(), ResolveError> {
        let name = token.content.as_str();
        if let Some(kind) = DirectionKind::builtin(name) {
            out.push(Direction::new(kind, origin));
        } else if self.program.is_header(name) {
            out.push(Direction::new(DirectionKind::CallGlobal(name.to_string()), origin));
        } else if let Some(body) = self.program.macros.get(name) {
            if self.active.iter().any(|m| m == name) {
                return Err(ResolveError::RecursiveMacro {
                    name: name.to_string(),
                    origin,
                });
            }
            trace!("expanding macro {}", name);
            self.active.push(name.to_string());
            for statement in &body.children {
                self.process(statement, out)?;
            }
            self.active.pop();
        } else {
            return Err(unknown(token));
        }
        Ok(())
    }

    fn function(&mut self, token: &ParseToken) -> Result<GenericFunction, ResolveError> {
        let (Some(sig), Some(block)) = (token.child(0), token.child(1)) else {
            return Err(malformed(token, "function literal"));
        };
        let signature = signature_of(sig)?;
        let mut body = Vec::with_capacity(block.children.len());
        for statement in &block.children {
            self.process(statement, &mut body)?;
        }
        Ok(GenericFunction::new(signature, body, Origin::from_token(token)))
    }
}

fn unknown(token: &ParseToken) -> ResolveError {
    ResolveError::UnknownDirection {
        name: token.content.clone(),
        origin: Origin::from_token(token),
    }
}

/// Build a signature from a `sig` token whose children are the input and
/// output type lists.
pub fn signature_of(token: &ParseToken) -> Result<Signature, ResolveError> {
    let (Some(ins), Some(outs)) = (token.child(0), token.child(1)) else {
        return Err(malformed(token, "signature"));
    };
    let ins = ins.children.iter().map(type_of).collect::<Result<Vec<_>, _>>()?;
    let outs = outs.children.iter().map(type_of).collect::<Result<Vec<_>, _>>()?;
    Ok(Signature::new(ins, outs))
}

fn type_of(token: &ParseToken) -> Result<Type, ResolveError> {
    if token.is(Tag::Sig) {
        return Ok(Type::signature(signature_of(token)?));
    }
    if token.is(Tag::Generic) {
        return Ok(Type::generic(token.content.as_str(), true));
    }
    Ok(match Primitive::from_name(&token.content) {
        Some(p) => Type::Primitive(p),
        None => Type::generic(token.content.as_str(), false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_program, parse_statements};

    fn load(source: &str) -> Result<Program, ResolveError> {
        let mut program = Program::new();
        program.load(&parse_program(source).unwrap())?;
        Ok(program)
    }

    fn kinds(program: &Program, source: &str) -> Vec<String> {
        program
            .directions(&parse_statements(source).unwrap())
            .unwrap()
            .iter()
            .map(|d| match &d.kind {
                DirectionKind::PushFunction(f) => format!("fn{}", f.signature()),
                other => format!("{:?}", other),
            })
            .collect()
    }

    #[test]
    fn literals_and_operators() {
        let program = Program::new();
        assert_eq!(
            kinds(&program, "1 'a' false + <= == ? : %!nl"),
            vec![
                "PushInt(1)",
                "PushChar('a')",
                "PushBool(false)",
                "Arithmetic(Add)",
                "Comparison(Le)",
                "Equals",
                "Choose",
                "Do",
                "Extern(\"nl\")"
            ]
        );
    }

    #[test]
    fn words_classified() {
        let program = load("five = 5 twice % { dup + }").unwrap();
        assert_eq!(
            kinds(&program, "five twice curry"),
            vec![
                "CallGlobal(\"five\")",
                "Dup",
                "Arithmetic(Add)",
                "Curry"
            ]
        );
    }

    #[test]
    fn forward_references() {
        let program = load("a = (:) { b : drop } b = (:) { }").unwrap();
        assert!(program.is_header("a"));
        assert!(program.is_header("b"));
        assert!(matches!(
            program.global("a").map(|d| &d.kind),
            Some(DirectionKind::PushFunction(_))
        ));
        assert_eq!(program.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn function_literal_body() {
        let program = Program::new();
        let directions = program
            .directions(&parse_statements("(<T> : T T) { dup }").unwrap())
            .unwrap();
        let DirectionKind::PushFunction(function) = &directions[0].kind else {
            panic!("expected a function literal");
        };
        assert_eq!(function.signature().to_string(), "(<T> : T T)");
        assert_eq!(function.body().len(), 1);
        assert!(matches!(function.body()[0].kind, DirectionKind::Dup));
    }

    #[test]
    fn unknown_word() {
        let program = Program::new();
        let err = program
            .directions(&parse_statements("1 frob").unwrap())
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownDirection { ref name, .. } if name == "frob"));
    }

    #[test]
    fn recursive_macro() {
        let program = load("a % { 1 b } b % { a }").unwrap();
        assert!(program.is_macro("a") && !program.is_header("a"));
        let err = program
            .directions(&parse_statements("a").unwrap())
            .unwrap_err();
        assert!(matches!(err, ResolveError::RecursiveMacro { ref name, .. } if name == "a"));
    }

    #[test]
    fn duplicate_global() {
        let err = load("x = 1 x = 2").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGlobal { ref name, .. } if name == "x"));
    }

    #[test]
    fn global_must_be_one_direction() {
        let err = load("pair % { 1 2 } x = pair").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGlobal { ref name, .. } if name == "x"));

        let err = load("nothing % { } x = nothing").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGlobal { .. }));
    }

    #[test]
    fn builtin_cannot_be_redefined() {
        let err = load("dup = 1").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidGlobal { .. }));
    }

    #[test]
    fn failed_load_registers_nothing() {
        let mut program = load("a = 1").unwrap();
        let err = program.load(&parse_program("b = 2 c = frob").unwrap());
        assert!(err.is_err());
        assert!(!program.is_header("b"));
        assert!(program.is_header("a"));
    }
}
