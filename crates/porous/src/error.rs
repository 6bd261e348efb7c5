//! Error types for every phase: parsing, resolution and execution.

use std::{fmt, rc::Rc};

use porous_core::{Diagnostic, ErrorCode, ParseToken, Span};
use thiserror::Error;

/// Where a direction or instruction came from: its span and source text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Origin {
    pub span: Span,
    pub text: Rc<str>,
}

impl Origin {
    pub fn new(span: Span, text: impl Into<Rc<str>>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    /// Origin for code the interpreter synthesizes itself, such as the
    /// implicit call of the entry point.
    pub fn synthetic(text: impl Into<Rc<str>>) -> Self {
        Self::new(Span::DUMMY, text)
    }

    pub fn from_token(token: &ParseToken) -> Self {
        Self::new(token.span, token.display())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Errors raised while turning source text into a token tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unrecognized character `{ch}`")]
    UnrecognizedChar { ch: char, span: Span },

    #[error("unterminated {what} literal")]
    Unterminated { what: &'static str, span: Span },

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unclosed `{open}`")]
    Unclosed { open: char, span: Span },

    #[error("invalid {what} literal `{text}`")]
    InvalidLiteral {
        what: &'static str,
        text: String,
        span: Span,
    },
}

impl ParseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::UnrecognizedChar { .. } => ErrorCode::E001,
            ParseError::Unterminated { .. } => ErrorCode::E002,
            ParseError::UnexpectedToken { .. } => ErrorCode::E100,
            ParseError::Unclosed { .. } => ErrorCode::E101,
            ParseError::InvalidLiteral { .. } => ErrorCode::E102,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnrecognizedChar { span, .. }
            | ParseError::Unterminated { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::Unclosed { span, .. }
            | ParseError::InvalidLiteral { span, .. } => *span,
        }
    }
}

/// Errors raised while registering globals, expanding macros, resolving
/// directions and specializing functions. All of them abort before the
/// affected code runs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown direction `{name}`")]
    UnknownDirection { name: String, origin: Origin },

    #[error("unknown extern `{name}`")]
    UnknownExtern { name: String, origin: Origin },

    #[error("type mismatch at `{origin}`: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        origin: Origin,
    },

    #[error("arity mismatch at `{origin}`: expected {expected}, found {found}")]
    ArityMismatch {
        expected: String,
        found: String,
        origin: Origin,
    },

    #[error("function at `{origin}` declares outputs {declared} but leaves {found}")]
    SignatureMismatch {
        declared: String,
        found: String,
        origin: Origin,
    },

    #[error("unbalanced stack at `{origin}`: {detail}")]
    UnbalancedStack { detail: String, origin: Origin },

    #[error("`{origin}` needs a function on top of the stack, found {found}")]
    NotCallable { found: String, origin: Origin },

    #[error("stack type mismatch at `{origin}`: expected {expected}, found {found}")]
    StackTypeMismatch {
        expected: String,
        found: String,
        origin: Origin,
    },

    #[error("macro `{name}` expands to itself")]
    RecursiveMacro { name: String, origin: Origin },

    #[error("invalid global `{name}`: {reason}")]
    InvalidGlobal {
        name: String,
        reason: String,
        origin: Origin,
    },

    #[error("no global named `{name}`")]
    UnknownGlobal { name: String, origin: Origin },

    #[error("function at `{origin}` is already being specialized for ({args})")]
    CyclicSpecialization { args: String, origin: Origin },
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::UnknownDirection { .. } => ErrorCode::E200,
            ResolveError::UnknownExtern { .. } => ErrorCode::E201,
            ResolveError::TypeMismatch { .. } => ErrorCode::E202,
            ResolveError::ArityMismatch { .. } => ErrorCode::E203,
            ResolveError::SignatureMismatch { .. } => ErrorCode::E204,
            ResolveError::UnbalancedStack { .. } => ErrorCode::E205,
            ResolveError::NotCallable { .. } => ErrorCode::E206,
            ResolveError::StackTypeMismatch { .. } => ErrorCode::E207,
            ResolveError::RecursiveMacro { .. } => ErrorCode::E208,
            ResolveError::InvalidGlobal { .. } => ErrorCode::E209,
            ResolveError::UnknownGlobal { .. } => ErrorCode::E210,
            ResolveError::CyclicSpecialization { .. } => ErrorCode::E211,
        }
    }

    pub fn origin(&self) -> Option<&Origin> {
        match self {
            ResolveError::UnknownDirection { origin, .. }
            | ResolveError::UnknownExtern { origin, .. }
            | ResolveError::TypeMismatch { origin, .. }
            | ResolveError::ArityMismatch { origin, .. }
            | ResolveError::SignatureMismatch { origin, .. }
            | ResolveError::UnbalancedStack { origin, .. }
            | ResolveError::NotCallable { origin, .. }
            | ResolveError::StackTypeMismatch { origin, .. }
            | ResolveError::RecursiveMacro { origin, .. }
            | ResolveError::InvalidGlobal { origin, .. }
            | ResolveError::UnknownGlobal { origin, .. }
            | ResolveError::CyclicSpecialization { origin, .. } => Some(origin),
        }
    }
}

/// Errors raised while executing instructions.
///
/// Apart from `DivisionByZero`, extern failures and runtime specialization
/// of generic function values, these indicate a broken invariant: resolved
/// code does not underflow or see a value of the wrong type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("stack underflow at `{origin}`")]
    StackUnderflow { origin: Origin },

    #[error("stack overflow at `{origin}`: more than {limit} values")]
    StackOverflow { limit: usize, origin: Origin },

    #[error("division by zero at `{origin}`")]
    DivisionByZero { origin: Origin },

    #[error("call depth exceeded {limit} at `{origin}`")]
    CallDepthExceeded { limit: usize, origin: Origin },

    #[error("value mismatch at `{origin}`: expected {expected}, found {found}")]
    ValueMismatch {
        expected: String,
        found: String,
        origin: Origin,
    },

    #[error("`{origin}` cannot call {found}")]
    NotCallable { found: String, origin: Origin },

    #[error("extern `{name}` failed: {message}")]
    Extern {
        name: String,
        message: String,
        origin: Origin,
    },

    #[error("failed to write output at `{origin}`: {message}")]
    Output { message: String, origin: Origin },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::StackUnderflow { .. } => ErrorCode::E300,
            RuntimeError::StackOverflow { .. } => ErrorCode::E301,
            RuntimeError::DivisionByZero { .. } => ErrorCode::E302,
            RuntimeError::CallDepthExceeded { .. } => ErrorCode::E303,
            RuntimeError::ValueMismatch { .. } | RuntimeError::NotCallable { .. } => {
                ErrorCode::E304
            }
            RuntimeError::Extern { .. } => ErrorCode::E305,
            RuntimeError::Output { .. } => ErrorCode::E306,
            RuntimeError::Resolve(e) => e.code(),
        }
    }

    pub fn origin(&self) -> Option<&Origin> {
        match self {
            RuntimeError::StackUnderflow { origin }
            | RuntimeError::StackOverflow { origin, .. }
            | RuntimeError::DivisionByZero { origin }
            | RuntimeError::CallDepthExceeded { origin, .. }
            | RuntimeError::ValueMismatch { origin, .. }
            | RuntimeError::NotCallable { origin, .. }
            | RuntimeError::Extern { origin, .. }
            | RuntimeError::Output { origin, .. } => Some(origin),
            RuntimeError::Resolve(e) => e.origin(),
        }
    }
}

/// Any error the interpreter can report.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Parse(e) => e.code(),
            Error::Resolve(e) => e.code(),
            Error::Runtime(e) => e.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Parse(e) => Some(e.span()),
            Error::Resolve(e) => e.origin().map(|o| o.span),
            Error::Runtime(e) => e.origin().map(|o| o.span),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code(), self.to_string());
        match self.span() {
            Some(span) if !span.is_empty() => diagnostic.with_span(span),
            _ => diagnostic,
        }
    }
}
