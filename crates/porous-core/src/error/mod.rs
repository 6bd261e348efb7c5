mod code;
mod diagnostic;

pub use code::ErrorCode;
pub use diagnostic::{Diagnostic, Severity};
