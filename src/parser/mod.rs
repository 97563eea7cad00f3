use indexmap::IndexMap;

use crate::ast::{Origin, Segment, Substitution, Value, ValueKind};
use crate::error::SigilError;
use crate::include::{FsIncluder, IncludeHandler, NoIncludes};
use crate::lexer::{Lexer, Token};
use crate::path::{Path, PathBuilder};

mod array;
mod document;
mod object;
mod paths;
mod value;

pub use paths::parse_path;

/// Parsing mode, fixed for a whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain JSON: quoted keys only, no unquoted text, no substitutions,
    /// duplicate keys are errors.
    Strict,
    /// The full language.
    Permissive,
}

/// Pick a mode from a file name: `.json` means strict, everything else
/// gets the full language.
pub fn mode_from_extension(path: &std::path::Path) -> Mode {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Mode::Strict,
        _ => Mode::Permissive,
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    buffer: Vec<Token>,
    line: usize,
    mode: Mode,
    includer: &'a mut dyn IncludeHandler,
}

impl<'a> Parser<'a> {
    pub fn new(
        input: &'a str,
        description: &str,
        mode: Mode,
        includer: &'a mut dyn IncludeHandler,
    ) -> Self {
        Parser {
            lexer: Lexer::new(input, description),
            buffer: Vec::new(),
            line: 1,
            mode,
            includer,
        }
    }

    pub fn parse_document(&mut self) -> Result<Value, SigilError> {
        document::parse_document(self)
    }

    /// Position for errors and new values. The line only advances when a
    /// newline token is actually consumed, so tokens replayed from the
    /// pushback buffer never rewind it.
    pub(crate) fn line_origin(&self) -> Origin {
        Origin::with_line(self.lexer.description(), self.line)
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, SigilError> {
        let token = match self.buffer.pop() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        if self.mode == Mode::Strict {
            match &token {
                Token::UnquotedText { .. } => {
                    return Err(SigilError::Parse {
                        message: format!("Token not allowed in strict mode: {}", token),
                        origin: self.line_origin(),
                        hint: Some("Quote the text, or parse with Mode::Permissive".into()),
                        code: Some(201),
                    });
                }
                Token::Substitution { .. } => {
                    return Err(SigilError::Parse {
                        message: "Substitutions (${} syntax) are not allowed in strict mode".into(),
                        origin: self.line_origin(),
                        hint: None,
                        code: Some(202),
                    });
                }
                _ => {}
            }
        }
        Ok(token)
    }

    /// Put a token back; it comes out again before anything else. Any
    /// number of tokens can be stacked up.
    pub(crate) fn put_back(&mut self, token: Token) {
        self.buffer.push(token);
    }

    pub(crate) fn next_token_ignoring_newline(&mut self) -> Result<Token, SigilError> {
        let mut token = self.next_token()?;
        while let Token::Newline(line) = token {
            self.line = line;
            token = self.next_token()?;
        }
        Ok(token)
    }
}

/// Parse a complete document from a string. Includes are refused; use
/// [`parse_str_named`] with a handler or [`parse_file`] when a document
/// pulls other documents in.
///
/// # Examples
/// ```
/// use sigil_cfg::{parse_str, Mode};
///
/// let root = parse_str(r#"{ server.port: 8080 }"#, Mode::Permissive)
///     .expect("Failed to parse");
/// assert!(root.as_object().is_some());
/// ```
pub fn parse_str(input: &str, mode: Mode) -> Result<Value, SigilError> {
    let mut includer = NoIncludes;
    Parser::new(input, "string", mode, &mut includer).parse_document()
}

/// Parse a string with an explicit source description and include handler.
pub fn parse_str_named(
    input: &str,
    description: &str,
    mode: Mode,
    includer: &mut dyn IncludeHandler,
) -> Result<Value, SigilError> {
    Parser::new(input, description, mode, includer).parse_document()
}

/// Read and parse a file. `.json` files parse strictly; anything else gets
/// the full language. Includes resolve relative to the file's directory.
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Value, SigilError> {
    let path = path.as_ref();
    let description = path.display().to_string();
    let input = std::fs::read_to_string(path).map_err(|e| SigilError::Io {
        message: format!("Failed to read file: {}", e),
        origin: Origin::new(description.clone()),
        code: Some(401),
    })?;
    let mode = mode_from_extension(path);
    let base_dir = path.parent().unwrap_or(std::path::Path::new(""));
    let mut includer = FsIncluder::new(base_dir);
    Parser::new(&input, &description, mode, &mut includer).parse_document()
}
