use super::*;
use super::scanner::{bump, peek_second};

/// Characters that can never appear in unquoted text.
const RESERVED: &str = "$\"{}[]:=,+#`^?!@*&\\";

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, SigilError> {
    let token = dispatch(lexer)?;
    lexer.last_was_simple = token.is_value_shaped();
    Ok(token)
}

fn dispatch(lexer: &mut Lexer) -> Result<Token, SigilError> {
    loop {
        return match lexer.peek {
            None => Ok(Token::End),
            Some('\n') => {
                bump(lexer);
                Ok(Token::Newline(lexer.line))
            }
            Some(' ') | Some('\t') | Some('\r') => {
                match tokenize_whitespace(lexer) {
                    Some(token) => Ok(token),
                    None => continue,
                }
            }
            Some('#') => {
                skip_comment(lexer);
                continue;
            }
            Some('/') if peek_second(lexer) == Some('/') => {
                skip_comment(lexer);
                continue;
            }
            Some('{') => {
                bump(lexer);
                Ok(Token::OpenBrace)
            }
            Some('}') => {
                bump(lexer);
                Ok(Token::CloseBrace)
            }
            Some('[') => {
                bump(lexer);
                Ok(Token::OpenBracket)
            }
            Some(']') => {
                bump(lexer);
                Ok(Token::CloseBracket)
            }
            Some(',') => {
                bump(lexer);
                Ok(Token::Comma)
            }
            Some(':') => {
                bump(lexer);
                Ok(Token::Colon)
            }
            Some('=') => {
                bump(lexer);
                Ok(Token::Equals)
            }
            Some('"') => tokenize_string(lexer),
            Some('$') => tokenize_substitution(lexer),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(tokenize_number(lexer)),
            Some(c) if is_unquoted_char(c) => Ok(tokenize_unquoted(lexer)),
            Some(c) => {
                let origin = lexer.origin_here();
                bump(lexer);
                Err(SigilError::Parse {
                    message: format!("Unexpected character '{}'", c),
                    origin,
                    hint: Some("Reserved characters are only legal inside quoted strings".into()),
                    code: Some(101),
                })
            }
        };
    }
}

fn is_unquoted_char(c: char) -> bool {
    !c.is_whitespace() && !RESERVED.contains(c)
}

/// Comments run to end of line; the newline itself stays for the parser.
fn skip_comment(lexer: &mut Lexer) {
    while let Some(c) = lexer.peek {
        if c == '\n' {
            break;
        }
        bump(lexer);
    }
}

/// A whitespace run becomes a token only when it glues two simple values
/// on the same line; everywhere else it is dropped here.
fn tokenize_whitespace(lexer: &mut Lexer) -> Option<Token> {
    let origin = lexer.origin_here();
    let mut text = String::new();
    while let Some(c) = lexer.peek {
        if c == ' ' || c == '\t' || c == '\r' {
            text.push(c);
            bump(lexer);
        } else {
            break;
        }
    }
    if lexer.last_was_simple && next_starts_simple_value(lexer) {
        Some(Token::UnquotedText { text, origin })
    } else {
        None
    }
}

fn next_starts_simple_value(lexer: &Lexer) -> bool {
    match lexer.peek {
        Some('"') | Some('$') => true,
        Some('/') => peek_second(lexer) != Some('/'),
        Some(c) => c.is_ascii_digit() || c == '-' || is_unquoted_char(c),
        None => false,
    }
}

/// Numbers lex as one maximal run; a run that is not a valid number falls
/// back to unquoted text, so `1.2.3` stays text. A period only joins the
/// run when a digit follows, so the dot in `10.key` stays a separator.
fn tokenize_number(lexer: &mut Lexer) -> Token {
    let origin = lexer.origin_here();
    let mut text = String::new();
    while let Some(c) = lexer.peek {
        let take = match c {
            '.' => peek_second(lexer).is_some_and(|next| next.is_ascii_digit()),
            'e' | 'E' | '+' | '-' => true,
            _ => c.is_ascii_digit(),
        };
        if take {
            text.push(c);
            bump(lexer);
        } else {
            break;
        }
    }
    match text.parse::<f64>() {
        Ok(n) => Token::Value(Value::new(ValueKind::Number(n), origin)),
        Err(_) => Token::UnquotedText { text, origin },
    }
}

fn tokenize_unquoted(lexer: &mut Lexer) -> Token {
    let origin = lexer.origin_here();
    let mut text = String::new();
    while let Some(c) = lexer.peek {
        if c == '/' {
            if peek_second(lexer) == Some('/') {
                break;
            }
            text.push(c);
            bump(lexer);
        } else if is_unquoted_char(c) {
            text.push(c);
            bump(lexer);
        } else {
            break;
        }
    }
    match text.as_str() {
        "true" => Token::Value(Value::new(ValueKind::Bool(true), origin)),
        "false" => Token::Value(Value::new(ValueKind::Bool(false), origin)),
        "null" => Token::Value(Value::new(ValueKind::Null, origin)),
        _ => Token::UnquotedText { text, origin },
    }
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, SigilError> {
    let origin = lexer.origin_here();
    bump(lexer); // consume the opening quote
    let mut content = String::new();
    loop {
        match bump(lexer) {
            None => {
                return Err(SigilError::Parse {
                    message: "String literal was never closed".into(),
                    origin,
                    hint: None,
                    code: Some(102),
                });
            }
            Some('"') => break,
            Some('\n') => {
                return Err(SigilError::Parse {
                    message: "String literal must not span lines".into(),
                    origin,
                    hint: Some("Use \\n for a line break".into()),
                    code: Some(104),
                });
            }
            Some('\\') => content.push(read_escape(lexer, &origin)?),
            Some(c) => content.push(c),
        }
    }
    Ok(Token::Value(Value::new(ValueKind::String(content), origin)))
}

fn read_escape(lexer: &mut Lexer, origin: &Origin) -> Result<char, SigilError> {
    match bump(lexer) {
        Some('"') => Ok('"'),
        Some('\\') => Ok('\\'),
        Some('/') => Ok('/'),
        Some('b') => Ok('\u{0008}'),
        Some('f') => Ok('\u{000C}'),
        Some('n') => Ok('\n'),
        Some('r') => Ok('\r'),
        Some('t') => Ok('\t'),
        Some('u') => read_unicode_escape(lexer, origin),
        Some(other) => Err(SigilError::Parse {
            message: format!("Invalid escape sequence '\\{}'", other),
            origin: origin.clone(),
            hint: None,
            code: Some(103),
        }),
        None => Err(SigilError::Parse {
            message: "String literal was never closed".into(),
            origin: origin.clone(),
            hint: Some("Trailing backslash in string".into()),
            code: Some(102),
        }),
    }
}

fn read_unicode_escape(lexer: &mut Lexer, origin: &Origin) -> Result<char, SigilError> {
    let first = read_hex4(lexer, origin)?;
    // Characters outside the basic plane arrive as a surrogate pair of
    // two \u escapes.
    if (0xD800..=0xDBFF).contains(&first) {
        if bump(lexer) != Some('\\') || bump(lexer) != Some('u') {
            return Err(SigilError::Parse {
                message: "Lone surrogate in \\u escape".into(),
                origin: origin.clone(),
                hint: Some("A high surrogate must be followed by a \\u low surrogate".into()),
                code: Some(103),
            });
        }
        let second = read_hex4(lexer, origin)?;
        if !(0xDC00..=0xDFFF).contains(&second) {
            return Err(SigilError::Parse {
                message: "Invalid low surrogate in \\u escape".into(),
                origin: origin.clone(),
                hint: None,
                code: Some(103),
            });
        }
        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        return char::from_u32(combined).ok_or_else(|| SigilError::Parse {
            message: "Invalid \\u escape".into(),
            origin: origin.clone(),
            hint: None,
            code: Some(103),
        });
    }
    char::from_u32(first).ok_or_else(|| SigilError::Parse {
        message: "Invalid \\u escape".into(),
        origin: origin.clone(),
        hint: None,
        code: Some(103),
    })
}

fn read_hex4(lexer: &mut Lexer, origin: &Origin) -> Result<u32, SigilError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = bump(lexer)
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| SigilError::Parse {
                message: "\\u escape needs four hex digits".into(),
                origin: origin.clone(),
                hint: None,
                code: Some(103),
            })?;
        code = code * 16 + digit;
    }
    Ok(code)
}

fn tokenize_substitution(lexer: &mut Lexer) -> Result<Token, SigilError> {
    let origin = lexer.origin_here();
    bump(lexer); // consume '$'
    if lexer.peek != Some('{') {
        return Err(SigilError::Parse {
            message: "'$' must be followed by '{'".into(),
            origin,
            hint: Some("Write ${path}, or quote the text if you meant a literal dollar".into()),
            code: Some(105),
        });
    }
    bump(lexer); // consume '{'
    let optional = lexer.peek == Some('?');
    if optional {
        bump(lexer);
    }
    // Whitespace right after the brace never glues onto anything.
    lexer.last_was_simple = false;
    let mut expression = Vec::new();
    loop {
        match next_token(lexer)? {
            Token::CloseBrace => break,
            Token::End => {
                return Err(SigilError::Parse {
                    message: "Expecting a close brace '}' in substitution, got end of input".into(),
                    origin,
                    hint: None,
                    code: Some(106),
                });
            }
            Token::Newline(_) => {
                return Err(SigilError::Parse {
                    message: "Substitution must not span lines".into(),
                    origin,
                    hint: None,
                    code: Some(106),
                });
            }
            token => expression.push(token),
        }
    }
    Ok(Token::Substitution { expression, optional, origin })
}
