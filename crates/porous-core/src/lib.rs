//! Core types shared by the Porous front end and language core.
//!
//! This crate provides the boundary types every phase agrees on:
//! - Source positions and spans
//! - The tagged token tree produced by the parser
//! - Error codes and renderable diagnostics

pub mod core;
pub mod error;
pub mod token;

// Re-export commonly used types at crate root
pub use core::{LineCol, Pos, Span};
pub use error::{Diagnostic, ErrorCode, Severity};
pub use token::{ParseToken, Tag};
