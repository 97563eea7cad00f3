use std::fmt;

use crate::ast::Origin;

/// The main error type for SIGIL lexing, parsing, and resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum SigilError {
    /// Raised for malformed input: lexer trouble, grammar violations,
    /// strict-mode rejections.
    Parse {
        message: String,
        origin: Origin,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a path expression is malformed.
    BadPath {
        path: String,
        message: String,
        origin: Origin,
        code: Option<u32>,
    },
    /// Raised when a file or include target cannot be acquired.
    Io {
        message: String,
        origin: Origin,
        code: Option<u32>,
    },
    /// Raised during substitution resolution: missing references,
    /// reference cycles, non-scalar interpolation.
    Resolve {
        message: String,
        origin: Origin,
        hint: Option<String>,
        code: Option<u32>,
    },
}

impl fmt::Display for SigilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigilError::Parse { message, origin, hint, code } =>
                write!(f, "[SIGIL] Parse Error at {}: {}{}{}",
                    origin, message,
                    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
                    code.map_or(String::new(), |c| format!(" Code: {}", c))
                ),
            SigilError::BadPath { path, message, origin, code } =>
                write!(f, "[SIGIL] Bad Path '{}' at {}: {}{}",
                    path, origin, message,
                    code.map_or(String::new(), |c| format!(" Code: {}", c))
                ),
            SigilError::Io { message, origin, code } =>
                write!(f, "[SIGIL] I/O Error at {}: {}{}",
                    origin, message,
                    code.map_or(String::new(), |c| format!(" Code: {}", c))
                ),
            SigilError::Resolve { message, origin, hint, code } =>
                write!(f, "[SIGIL] Resolve Error at {}: {}{}{}",
                    origin, message,
                    hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
                    code.map_or(String::new(), |c| format!(" Code: {}", c))
                ),
        }
    }
}

impl std::error::Error for SigilError {}
