// License: MIT

use std::fmt;
use std::str::Chars;

use crate::ast::{Origin, Value, ValueKind};
use crate::SigilError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- sentinels ---
    Start,
    End,

    // --- structure ---
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Colon,
    Equals,

    // --- layout ---
    /// Carries the line number the input continues on.
    Newline(usize),

    // --- values ---
    /// A fully lexed literal: quoted string, number, true/false, null.
    Value(Value),
    /// Permissive-mode bare text, including the whitespace runs that glue
    /// two values on one line.
    UnquotedText { text: String, origin: Origin },
    /// `${path}` or `${?path}`; the inner expression stays as raw tokens
    /// until path parsing.
    Substitution {
        expression: Vec<Token>,
        optional: bool,
        origin: Origin,
    },
}

impl Token {
    /// Tokens that can take part in a single gluable value run.
    pub(crate) fn is_value_shaped(&self) -> bool {
        matches!(
            self,
            Token::Value(_) | Token::UnquotedText { .. } | Token::Substitution { .. }
        )
    }

    pub(crate) fn is_unquoted_whitespace(&self) -> bool {
        matches!(self, Token::UnquotedText { text, .. } if text.chars().all(char::is_whitespace))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Start => write!(f, "start of input"),
            Token::End => write!(f, "end of input"),
            Token::OpenBrace => write!(f, "'{{'"),
            Token::CloseBrace => write!(f, "'}}'"),
            Token::OpenBracket => write!(f, "'['"),
            Token::CloseBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Equals => write!(f, "'='"),
            Token::Newline(_) => write!(f, "newline"),
            Token::Value(v) => match v.kind() {
                ValueKind::Substitution(sub) => write!(f, "'{}'", sub),
                _ => match v.render_scalar() {
                    Some(text) => write!(f, "'{}'", text),
                    None => write!(f, "{} value", v.type_name()),
                },
            },
            Token::UnquotedText { text, .. } => write!(f, "'{}'", text),
            Token::Substitution { expression, optional, .. } => {
                write!(f, "'${{")?;
                if *optional {
                    write!(f, "?")?;
                }
                for token in expression {
                    match token {
                        Token::UnquotedText { text, .. } => write!(f, "{}", text)?,
                        Token::Value(v) => match v.render_scalar() {
                            Some(text) => write!(f, "{}", text)?,
                            None => write!(f, "{}", v.type_name())?,
                        },
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "}}'")
            }
        }
    }
}

pub struct Lexer<'a> {
    input: Chars<'a>,
    peek: Option<char>,
    line: usize,
    description: String,
    started: bool,
    last_was_simple: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, description: &str) -> Self {
        let mut lexer = Lexer {
            input: input.chars(),
            peek: None,
            line: 1,
            description: description.to_string(),
            started: false,
            last_was_simple: false,
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn origin_here(&self) -> Origin {
        Origin::with_line(self.description.as_str(), self.line)
    }

    /// Produce the next token. The first call always yields `Token::Start`;
    /// once the input runs out every call yields `Token::End`.
    pub fn next_token(&mut self) -> Result<Token, SigilError> {
        if !self.started {
            self.started = true;
            return Ok(Token::Start);
        }
        tokenizer::next_token(self)
    }
}
