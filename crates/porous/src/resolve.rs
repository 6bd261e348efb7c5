//! Resolution and specialization.
//!
//! The resolver turns a direction into an instruction given the abstract
//! stack of types in scope, and specializes generic functions for concrete
//! argument types. A function body is checked once per specialization:
//! every instruction's stack effect is applied to a check stack seeded
//! with the inputs, and what remains must be exactly the declared outputs.

use std::rc::Rc;

use log::{debug, trace};

use crate::{
    direction::{Direction, DirectionKind},
    error::{Origin, ResolveError},
    externs::ExternRegistry,
    function::{Function, FunctionRef, GenericFunction, SpecKey},
    instruction::{DeferredFunction, Instruction, InstructionKind},
    program::Program,
    types::{Bindings, Signature, Type, format_types, match_generics, match_inputs},
    value::{GenericValue, Value},
};

pub struct Resolver<'a> {
    program: &'a Program,
    externs: &'a ExternRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a Program, externs: &'a ExternRegistry) -> Self {
        Self { program, externs }
    }

    /// Resolve `direction` against `stack` (bottom to top). `bindings` are
    /// the generic bindings of the function being specialized.
    pub fn resolve(
        &self,
        direction: &Direction,
        stack: &[Type],
        bindings: &Bindings,
    ) -> Result<Instruction, ResolveError> {
        let origin = &direction.origin;
        let instruction = |kind: InstructionKind,
                           ins: &[Type],
                           outs: &[Type]|
         -> Result<Instruction, ResolveError> {
            Ok(Instruction::new(
                kind,
                Signature::new(ins.iter().cloned(), outs.iter().cloned()),
                origin.clone(),
            ))
        };

        match &direction.kind {
            DirectionKind::PushInt(n) => {
                instruction(InstructionKind::Push(Value::Int(*n)), &[], &[Type::INT])
            }
            DirectionKind::PushChar(c) => {
                instruction(InstructionKind::Push(Value::Char(*c)), &[], &[Type::CHAR])
            }
            DirectionKind::PushBool(b) => {
                instruction(InstructionKind::Push(Value::Bool(*b)), &[], &[Type::BOOL])
            }
            DirectionKind::PushFunction(function) => self.push_function(function, bindings, origin),
            DirectionKind::Arithmetic(op) => {
                let ops = operands(stack, 2, origin)?;
                expect(&Type::INT, &ops[0], origin)?;
                expect(&Type::INT, &ops[1], origin)?;
                instruction(InstructionKind::Arithmetic(*op), &[Type::INT, Type::INT], &[Type::INT])
            }
            DirectionKind::Comparison(op) => {
                let ops = operands(stack, 2, origin)?;
                expect(&Type::INT, &ops[0], origin)?;
                expect(&Type::INT, &ops[1], origin)?;
                instruction(InstructionKind::Comparison(*op), &[Type::INT, Type::INT], &[Type::BOOL])
            }
            DirectionKind::Do => {
                let callee_type = operands(stack, 1, origin)?[0].clone();
                let callee = callable(&callee_type, origin)?;
                let called = apply_callee(callee, &stack[..stack.len() - 1], origin)?;
                let mut ins = called.ins.to_vec();
                let mut outs = called.outs.to_vec();
                ins.push(callee_type.clone());
                outs.push(callee_type);
                let args = called.ins.to_vec();
                instruction(InstructionKind::Do { args }, &ins, &outs)
            }
            DirectionKind::Dup => {
                let t = &operands(stack, 1, origin)?[0];
                instruction(InstructionKind::Dup, &[t.clone()], &[t.clone(), t.clone()])
            }
            DirectionKind::Drop => {
                let t = &operands(stack, 1, origin)?[0];
                instruction(InstructionKind::Drop, &[t.clone()], &[])
            }
            DirectionKind::Swap => {
                let ops = operands(stack, 2, origin)?;
                let (a, b) = (&ops[0], &ops[1]);
                instruction(InstructionKind::Swap, &[a.clone(), b.clone()], &[b.clone(), a.clone()])
            }
            DirectionKind::Over => {
                let ops = operands(stack, 2, origin)?;
                let (a, b) = (&ops[0], &ops[1]);
                instruction(
                    InstructionKind::Over,
                    &[a.clone(), b.clone()],
                    &[a.clone(), b.clone(), a.clone()],
                )
            }
            DirectionKind::Choose => {
                let ops = operands(stack, 3, origin)?;
                expect(&Type::BOOL, &ops[2], origin)?;
                expect(&ops[0], &ops[1], origin)?;
                let t = &ops[0];
                instruction(
                    InstructionKind::Choose,
                    &[t.clone(), t.clone(), Type::BOOL],
                    &[t.clone()],
                )
            }
            DirectionKind::Equals => {
                let ops = operands(stack, 2, origin)?;
                expect(&ops[0], &ops[1], origin)?;
                let t = &ops[0];
                instruction(InstructionKind::Equals, &[t.clone(), t.clone()], &[Type::BOOL])
            }
            DirectionKind::Not => {
                expect(&Type::BOOL, &operands(stack, 1, origin)?[0], origin)?;
                instruction(InstructionKind::Not, &[Type::BOOL], &[Type::BOOL])
            }
            DirectionKind::Put => {
                expect(&Type::CHAR, &operands(stack, 1, origin)?[0], origin)?;
                instruction(InstructionKind::Put, &[Type::CHAR], &[])
            }
            DirectionKind::While => {
                let ops = operands(stack, 2, origin)?;
                let callee_type = ops[0].clone();
                expect(&Type::BOOL, &ops[1], origin)?;
                let callee = callable(&callee_type, origin)?;
                let called = apply_callee(callee, &stack[..stack.len() - 2], origin)?;

                let mut looped = called.ins.to_vec();
                looped.push(Type::BOOL);
                if called.outs.as_slice() != looped.as_slice() {
                    return Err(ResolveError::TypeMismatch {
                        expected: Signature::new(called.ins.iter().cloned(), looped).to_string(),
                        found: called.to_string(),
                        origin: origin.clone(),
                    });
                }

                let mut ins = called.ins.to_vec();
                let mut outs = called.ins.to_vec();
                ins.extend([callee_type.clone(), Type::BOOL]);
                outs.push(callee_type);
                let args = called.ins.to_vec();
                instruction(InstructionKind::While { args }, &ins, &outs)
            }
            DirectionKind::Curry => {
                let ops = operands(stack, 2, origin)?;
                let (bound, callee_type) = (&ops[0], &ops[1]);
                let callee = callable(callee_type, origin)?;
                let Some(first) = callee.ins.first() else {
                    return Err(ResolveError::TypeMismatch {
                        expected: "a function with at least one input".to_string(),
                        found: callee.to_string(),
                        origin: origin.clone(),
                    });
                };

                let mut matched = Bindings::new();
                match_generics(first, bound, &mut matched).map_err(|e| e.at(origin))?;
                let called = callee.substitute(&matched);
                let remaining = Signature::new(called.ins[1..].iter().cloned(), called.outs.iter().cloned());
                if !remaining.is_concrete() {
                    return Err(ResolveError::TypeMismatch {
                        expected: "a concrete signature after currying".to_string(),
                        found: remaining.to_string(),
                        origin: origin.clone(),
                    });
                }

                let args = called.ins.to_vec();
                instruction(
                    InstructionKind::Curry { args },
                    &[bound.clone(), callee_type.clone()],
                    &[Type::signature(remaining)],
                )
            }
            DirectionKind::CallGlobal(name) => {
                let target = self.follow_global(name, origin)?;
                self.resolve(target, stack, &Bindings::new())
            }
            DirectionKind::Extern(name) => {
                let call = self
                    .externs
                    .get(name)
                    .ok_or_else(|| ResolveError::UnknownExtern {
                        name: name.clone(),
                        origin: origin.clone(),
                    })?;
                Ok(Instruction::new(
                    InstructionKind::Extern(call.clone()),
                    call.signature().clone(),
                    origin.clone(),
                ))
            }
        }
    }

    /// Resolve a sequence of directions in order, applying each stack
    /// effect to `stack`. Used for top-level statements, which have no
    /// enclosing generics.
    pub fn resolve_sequence(
        &self,
        directions: &[Direction],
        stack: &mut Vec<Type>,
    ) -> Result<Vec<Instruction>, ResolveError> {
        let bindings = Bindings::new();
        let mut instructions = Vec::with_capacity(directions.len());
        for direction in directions {
            let instruction = self.resolve(direction, stack, &bindings)?;
            apply_signature(stack, instruction.signature(), &direction.origin)?;
            instructions.push(instruction);
        }
        Ok(instructions)
    }

    /// Follow a chain of globals that name other globals.
    fn follow_global(&self, name: &str, origin: &Origin) -> Result<&'a Direction, ResolveError> {
        let program = self.program;
        let mut seen = vec![name];
        let mut direction = program
            .global(name)
            .ok_or_else(|| ResolveError::UnknownGlobal {
                name: name.to_string(),
                origin: origin.clone(),
            })?;
        while let DirectionKind::CallGlobal(next) = &direction.kind {
            if seen.contains(&next.as_str()) {
                return Err(ResolveError::InvalidGlobal {
                    name: name.to_string(),
                    reason: format!("refers to itself through `{}`", next),
                    origin: origin.clone(),
                });
            }
            seen.push(next);
            direction = program
                .global(next)
                .ok_or_else(|| ResolveError::UnknownGlobal {
                    name: next.clone(),
                    origin: origin.clone(),
                })?;
        }
        Ok(direction)
    }

    /// A function literal pushed inside a function specialized with
    /// `bindings`. Names the literal rebinds with `<T>` are its own.
    fn push_function(
        &self,
        function: &Rc<GenericFunction>,
        bindings: &Bindings,
        origin: &Origin,
    ) -> Result<Instruction, ResolveError> {
        let own = function.signature().binding_names();
        let seed: Bindings = bindings
            .iter()
            .filter(|(name, _)| !own.contains(*name))
            .map(|(name, ty)| (name.clone(), ty.clone()))
            .collect();
        let signature = function.signature().substitute(&seed);
        let pushed = Type::signature(signature.clone());

        let kind = if signature.is_concrete() {
            let key = SpecKey::new(signature.ins.to_vec(), seed.clone());
            if function.is_pending(&key) {
                trace!("deferring push of {} at `{}`", signature, origin);
                InstructionKind::PushDeferred(DeferredFunction::new(function, key))
            } else {
                let specialized = self.specialize(function, &signature.ins, &seed, origin)?;
                InstructionKind::Push(Value::Function(specialized))
            }
        } else {
            InstructionKind::Push(Value::Generic(GenericValue {
                function: function.clone(),
                seed,
                signature,
            }))
        };

        Ok(Instruction::new(kind, Signature::new([], [pushed]), origin.clone()))
    }

    /// Specialize `function` for `args` (bottom to top), reusing the cached
    /// specialization for the same arguments and seed if there is one.
    pub fn specialize(
        &self,
        function: &Rc<GenericFunction>,
        args: &[Type],
        seed: &Bindings,
        origin: &Origin,
    ) -> Result<FunctionRef, ResolveError> {
        let key = SpecKey::new(args, seed.clone());
        if let Some(cached) = function.cached(&key) {
            trace!("cache hit for {} at ({})", function.signature(), format_types(args));
            return Ok(cached);
        }
        // Pushes of a pending key become `PushDeferred` before reaching
        // here, so this only trips on a direct call during specialization.
        if function.is_pending(&key) {
            return Err(ResolveError::CyclicSpecialization {
                args: format_types(args),
                origin: function.origin().clone(),
            });
        }

        let declared = function.signature();
        if declared.ins.len() != args.len() {
            return Err(ResolveError::ArityMismatch {
                expected: declared.to_string(),
                found: format_types(args),
                origin: origin.clone(),
            });
        }
        let mut bindings = seed.clone();
        match_inputs(&declared.ins, args, &mut bindings).map_err(|e| e.at(origin))?;
        let signature = declared.substitute(&bindings);
        debug!(
            "specializing {} at `{}` as {}",
            declared,
            function.origin(),
            signature
        );

        function.begin(key.clone());
        let body = self.check_body(function, &signature, &bindings);
        function.finish(&key);

        let specialized = Rc::new(Function::new(signature, body?, function.origin().clone()));
        function.store(key, specialized.clone());
        Ok(specialized)
    }

    fn check_body(
        &self,
        function: &GenericFunction,
        signature: &Signature,
        bindings: &Bindings,
    ) -> Result<Vec<Instruction>, ResolveError> {
        let mut stack: Vec<Type> = signature.ins.to_vec();
        let mut body = Vec::with_capacity(function.body().len());
        for direction in function.body() {
            let instruction = self.resolve(direction, &stack, bindings)?;
            apply_signature(&mut stack, instruction.signature(), &direction.origin)?;
            body.push(instruction);
        }

        let origin = function.origin();
        if stack.len() < signature.outs.len() {
            return Err(ResolveError::UnbalancedStack {
                detail: format!(
                    "declares {} outputs but leaves {}",
                    signature.outs.len(),
                    format_types(&stack)
                ),
                origin: origin.clone(),
            });
        }
        let produced = stack.split_off(stack.len() - signature.outs.len());
        if produced.as_slice() != signature.outs.as_slice() {
            return Err(ResolveError::SignatureMismatch {
                declared: format_types(&signature.outs),
                found: format_types(&produced),
                origin: origin.clone(),
            });
        }
        if !stack.is_empty() {
            return Err(ResolveError::UnbalancedStack {
                detail: format!("{} left over", format_types(&stack)),
                origin: origin.clone(),
            });
        }
        Ok(body)
    }
}

/// Apply a stack effect to an abstract stack, checking the consumed types.
pub fn apply_signature(
    stack: &mut Vec<Type>,
    signature: &Signature,
    origin: &Origin,
) -> Result<(), ResolveError> {
    let consumed = operands(stack, signature.ins.len(), origin)?;
    for (expected, found) in signature.ins.iter().zip(consumed).rev() {
        if expected != found {
            return Err(ResolveError::StackTypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
                origin: origin.clone(),
            });
        }
    }
    stack.truncate(stack.len() - signature.ins.len());
    stack.extend(signature.outs.iter().cloned());
    Ok(())
}

/// The top `count` types, bottom to top.
fn operands<'s>(stack: &'s [Type], count: usize, origin: &Origin) -> Result<&'s [Type], ResolveError> {
    if stack.len() < count {
        return Err(ResolveError::UnbalancedStack {
            detail: format!("needs {} values, found {}", count, format_types(stack)),
            origin: origin.clone(),
        });
    }
    Ok(&stack[stack.len() - count..])
}

fn expect(expected: &Type, found: &Type, origin: &Origin) -> Result<(), ResolveError> {
    if expected == found {
        return Ok(());
    }
    Err(ResolveError::TypeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
        origin: origin.clone(),
    })
}

fn callable<'t>(ty: &'t Type, origin: &Origin) -> Result<&'t Signature, ResolveError> {
    ty.as_signature().ok_or_else(|| ResolveError::NotCallable {
        found: ty.to_string(),
        origin: origin.clone(),
    })
}

/// Match a callee's inputs against the types below it and return the
/// callee with every generic substituted.
fn apply_callee(callee: &Signature, below: &[Type], origin: &Origin) -> Result<Signature, ResolveError> {
    let actual = operands(below, callee.ins.len(), origin)?;
    let mut bindings = Bindings::new();
    match_inputs(&callee.ins, actual, &mut bindings).map_err(|e| e.at(origin))?;

    let unbound: Vec<String> = callee
        .free_generics()
        .into_iter()
        .filter(|name| !bindings.contains_key(name))
        .map(|name| name.to_string())
        .collect();
    if !unbound.is_empty() {
        return Err(ResolveError::TypeMismatch {
            expected: format!("inputs that determine {}", unbound.join(" ")),
            found: callee.to_string(),
            origin: origin.clone(),
        });
    }
    Ok(callee.substitute(&bindings))
}
