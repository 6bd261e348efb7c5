use thiserror::Error;

/// Stable error codes for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Error)]
pub enum ErrorCode {
    // Lexical errors (E001-E099)
    #[error("unrecognized character")]
    E001,
    #[error("unterminated literal")]
    E002,

    // Parse errors (E100-E199)
    #[error("unexpected token")]
    E100,
    #[error("unclosed construct")]
    E101,
    #[error("invalid literal")]
    E102,

    // Resolution errors (E200-E299)
    #[error("unknown direction")]
    E200,
    #[error("unknown extern")]
    E201,
    #[error("type mismatch")]
    E202,
    #[error("arity mismatch")]
    E203,
    #[error("signature mismatch")]
    E204,
    #[error("unbalanced stack")]
    E205,
    #[error("not callable")]
    E206,
    #[error("stack type mismatch")]
    E207,
    #[error("recursive macro")]
    E208,
    #[error("invalid global definition")]
    E209,
    #[error("unknown global")]
    E210,
    #[error("cyclic specialization")]
    E211,

    // Runtime errors (E300-E399)
    #[error("stack underflow")]
    E300,
    #[error("stack overflow")]
    E301,
    #[error("division by zero")]
    E302,
    #[error("call depth exceeded")]
    E303,
    #[error("value does not match its static type")]
    E304,
    #[error("extern call failed")]
    E305,
    #[error("output failed")]
    E306,
}

impl ErrorCode {
    /// The error code as a string (e.g., "E001").
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            ErrorCode::E209 => "E209",
            ErrorCode::E210 => "E210",
            ErrorCode::E211 => "E211",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
        }
    }

    /// True for codes raised while executing, as opposed to before it.
    pub fn is_runtime(self) -> bool {
        self.as_str().starts_with("E3")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::E001.as_str(), "E001");
        assert_eq!(ErrorCode::E201.as_str(), "E201");
        assert_eq!(ErrorCode::E305.as_str(), "E305");
    }

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::E200.to_string(), "unknown direction");
        assert_eq!(ErrorCode::E205.to_string(), "unbalanced stack");
    }

    #[test]
    fn runtime_codes() {
        assert!(ErrorCode::E302.is_runtime());
        assert!(!ErrorCode::E202.is_runtime());
        assert!(!ErrorCode::E100.is_runtime());
    }
}
