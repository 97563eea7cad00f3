use super::*;

/// Build one object, starting just after its open brace. Fields are
/// comma separated; newlines are skipped everywhere except inside a key
/// or value run.
pub(super) fn parse_object(parser: &mut Parser) -> Result<Value, SigilError> {
    let object_origin = parser.line_origin();
    let mut entries: IndexMap<String, Value> = IndexMap::new();
    let mut after_comma = false;

    loop {
        let token = parser.next_token_ignoring_newline()?;
        if token == Token::CloseBrace {
            if after_comma {
                return Err(SigilError::Parse {
                    message: "Expecting a field name after a comma, got a close brace '}'".into(),
                    origin: parser.line_origin(),
                    hint: Some("Remove the trailing comma".into()),
                    code: Some(208),
                });
            }
            break;
        }

        if parser.mode == Mode::Permissive && is_include_keyword(&token) {
            parse_include(parser, &mut entries)?;
        } else {
            let path = paths::parse_key(parser, token)?;
            let after_key = parser.next_token_ignoring_newline()?;
            let separator_ok = after_key == Token::Colon
                || (parser.mode == Mode::Permissive && after_key == Token::Equals);
            if !separator_ok {
                return Err(SigilError::Parse {
                    message: format!("Key '{}' may not be followed by token: {}", path, after_key),
                    origin: parser.line_origin(),
                    hint: None,
                    code: Some(205),
                });
            }

            value::consolidate_value_tokens(parser)?;
            let value_token = parser.next_token_ignoring_newline()?;
            let new_value = value::parse_value(parser, value_token)?;
            store_under_path(parser, &mut entries, path, new_value)?;
        }

        // after a field or an include, only '}' or ',' may follow
        match parser.next_token_ignoring_newline()? {
            Token::CloseBrace => break,
            Token::Comma => {
                after_comma = true;
            }
            other => {
                return Err(SigilError::Parse {
                    message: format!("Expecting a close brace '}}' or a comma, got: {}", other),
                    origin: parser.line_origin(),
                    hint: None,
                    code: Some(207),
                });
            }
        }
    }

    Ok(Value::new(ValueKind::Object(entries), object_origin))
}

fn is_include_keyword(token: &Token) -> bool {
    matches!(token, Token::UnquotedText { text, .. } if text == "include")
}

/// `include "name"` splices the named object's fields into the object
/// being built. Per key, the included field wins over one already
/// declared, which is kept as its fallback.
fn parse_include(
    parser: &mut Parser,
    entries: &mut IndexMap<String, Value>,
) -> Result<(), SigilError> {
    let mut token = parser.next_token_ignoring_newline()?;
    while token.is_unquoted_whitespace() {
        token = parser.next_token_ignoring_newline()?;
    }

    let name = match &token {
        Token::Value(v) => v.as_str().map(str::to_string),
        _ => None,
    };
    let name = match name {
        Some(name) => name,
        None => {
            return Err(SigilError::Parse {
                message: format!(
                    "The include keyword is not followed by a quoted string, but by: {}",
                    token
                ),
                origin: parser.line_origin(),
                hint: None,
                code: Some(209),
            });
        }
    };

    let included = parser.includer.include(&name)?;
    for (key, value) in included {
        let merged = match entries.get(&key).cloned() {
            Some(existing) => value.with_fallback(existing),
            None => value,
        };
        entries.insert(key, merged);
    }
    Ok(())
}

/// Store a parsed field. A dotted key becomes nested single-key objects;
/// a repeat of an existing key merges over it, or is refused outright in
/// strict mode.
fn store_under_path(
    parser: &Parser,
    entries: &mut IndexMap<String, Value>,
    path: Path,
    new_value: Value,
) -> Result<(), SigilError> {
    let key = path.first().to_string();
    let value = match path.remainder() {
        None => new_value,
        Some(remaining) => {
            if parser.mode == Mode::Strict {
                unreachable!("multi-element path in strict mode");
            }
            create_value_under_path(&remaining, new_value)
        }
    };

    match entries.get(&key).cloned() {
        Some(existing) => {
            if parser.mode == Mode::Strict {
                return Err(SigilError::Parse {
                    message: format!(
                        "Strict mode does not allow duplicate fields: '{}' was already seen at {}",
                        key,
                        existing.origin()
                    ),
                    origin: parser.line_origin(),
                    hint: None,
                    code: Some(206),
                });
            }
            entries.insert(key, value.with_fallback(existing));
        }
        None => {
            entries.insert(key, value);
        }
    }
    Ok(())
}

/// Wrap a value in nested single-key objects, innermost first, so the
/// dotted key `a.b.c` stores `{b: {c: value}}` under `a`.
fn create_value_under_path(remaining: &Path, value: Value) -> Value {
    let mut current = value;
    for key in remaining.keys().iter().rev() {
        let origin = current.origin().clone();
        let mut entries = IndexMap::new();
        entries.insert(key.clone(), current);
        current = Value::new(ValueKind::Object(entries), origin);
    }
    current
}
