use once_cell::sync::Lazy;

use super::*;

static API_ORIGIN: Lazy<Origin> = Lazy::new(|| Origin::new("path parameter"));

struct PathElement {
    text: String,
    can_be_empty: bool,
}

fn joined_text(elements: &[PathElement]) -> String {
    elements
        .iter()
        .map(|element| element.text.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Append raw text to the element list, splitting on periods unless the
/// text came from a quoted string. The list always holds at least one
/// element.
fn add_path_text(elements: &mut Vec<PathElement>, was_quoted: bool, new_text: &str) {
    if was_quoted {
        if let Some(current) = elements.last_mut() {
            current.text.push_str(new_text);
            // only a quoted "" makes an intentionally empty element
            if current.text.is_empty() {
                current.can_be_empty = true;
            }
        }
        return;
    }
    for (i, piece) in new_text.split('.').enumerate() {
        if i == 0 {
            if let Some(current) = elements.last_mut() {
                current.text.push_str(piece);
            }
        } else {
            elements.push(PathElement {
                text: piece.to_string(),
                can_be_empty: false,
            });
        }
    }
}

/// Interpret a run of tokens as a path. Quoted strings contribute their
/// text verbatim while everything else is split on periods, so
/// `a."b.c"` has two keys and `a.b.c` has three.
pub(super) fn parse_path_expression(
    tokens: &[Token],
    origin: &Origin,
) -> Result<Path, SigilError> {
    if tokens.is_empty() {
        return Err(SigilError::BadPath {
            path: String::new(),
            message: "Expecting a field name or path here, but got nothing".into(),
            origin: origin.clone(),
            code: Some(303),
        });
    }

    let mut elements = vec![PathElement {
        text: String::new(),
        can_be_empty: false,
    }];
    for token in tokens {
        match token {
            Token::End => {}
            Token::Value(value) => match value.kind() {
                ValueKind::String(text) => add_path_text(&mut elements, true, text),
                _ => match value.render_scalar() {
                    Some(text) => add_path_text(&mut elements, false, &text),
                    None => {
                        return Err(SigilError::BadPath {
                            path: joined_text(&elements),
                            message: format!("Token not allowed in path expression: {}", token),
                            origin: origin.clone(),
                            code: Some(302),
                        });
                    }
                },
            },
            Token::UnquotedText { text, .. } => add_path_text(&mut elements, false, text),
            other => {
                return Err(SigilError::BadPath {
                    path: joined_text(&elements),
                    message: format!("Token not allowed in path expression: {}", other),
                    origin: origin.clone(),
                    code: Some(302),
                });
            }
        }
    }

    let mut builder = PathBuilder::new();
    for element in &elements {
        if element.text.is_empty() && !element.can_be_empty {
            return Err(SigilError::BadPath {
                path: joined_text(&elements),
                message: "path has a leading, trailing, or two adjacent period '.' (use quoted \"\" if you want an empty element)".into(),
                origin: origin.clone(),
                code: Some(301),
            });
        }
        builder.append_key(element.text.clone());
    }
    Ok(builder.result())
}

/// Recognize the common letters-and-periods case without running the
/// lexer. Declines anything it is not sure about.
fn speculative_fast_parse_path(path: &str) -> Option<Path> {
    let text = path.trim();
    if text.is_empty() {
        return None;
    }
    if !text.chars().all(|c| c.is_alphabetic() || c == '.') {
        return None;
    }
    if text.starts_with('.') || text.ends_with('.') || text.contains("..") {
        return None;
    }

    let mut builder = PathBuilder::new();
    for key in text.split('.') {
        builder.append_key(key.to_string());
    }
    Some(builder.result())
}

/// Parse a path written as text, for use with API calls that take a
/// path argument. Same rules as a key in a document: periods separate
/// keys, quoted sections are kept whole.
pub fn parse_path(text: &str) -> Result<Path, SigilError> {
    if let Some(path) = speculative_fast_parse_path(text) {
        return Ok(path);
    }

    let mut lexer = Lexer::new(text, "path parameter");
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::Start => continue,
            Token::End => break,
            other => tokens.push(other),
        }
    }
    parse_path_expression(&tokens, &API_ORIGIN)
}

/// Parse the key of a field. Strict mode takes exactly one quoted
/// string; permissive mode gathers the whole run of value-shaped text
/// up to the separator and reads it as a path expression.
pub(super) fn parse_key(parser: &mut Parser, token: Token) -> Result<Path, SigilError> {
    if parser.mode == Mode::Strict {
        if let Token::Value(value) = &token {
            if let ValueKind::String(key) = value.kind() {
                return Ok(Path::from_key(key.clone()));
            }
        }
        Err(SigilError::Parse {
            message: format!("Expecting a close brace '}}' or a field name, got: {}", token),
            origin: parser.line_origin(),
            hint: None,
            code: Some(204),
        })
    } else {
        let origin = parser.line_origin();
        let mut expression = vec![token];
        // gather the key without crossing a newline
        loop {
            let next = parser.next_token()?;
            match next {
                Token::Value(_) | Token::UnquotedText { .. } => expression.push(next),
                other => {
                    parser.put_back(other);
                    break;
                }
            }
        }
        parse_path_expression(&expression, &origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_unquoted_periods() {
        let path = parse_path("a.b.c").expect("Failed to parse path");
        assert_eq!(path.keys(), ["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_section_stays_whole() {
        let path = parse_path(r#"a."b.c""#).expect("Failed to parse path");
        assert_eq!(path.keys(), ["a", "b.c"]);
    }

    #[test]
    fn test_number_joins_surrounding_text() {
        let path = parse_path("a.57").expect("Failed to parse path");
        assert_eq!(path.keys(), ["a", "57"]);
    }

    #[test]
    fn test_number_key_splits_before_following_text() {
        let path = parse_path("10.a").expect("Failed to parse path");
        assert_eq!(path.keys(), ["10", "a"]);
    }

    #[test]
    fn test_adjacent_periods_are_refused() {
        for bad in [".a", "a.", "a..b"] {
            let err = parse_path(bad).expect_err("Expected a path error");
            match err {
                SigilError::BadPath { code, .. } => assert_eq!(code, Some(301)),
                other => panic!("Expected BadPath, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_text_is_refused() {
        let err = parse_path("").expect_err("Expected a path error");
        match err {
            SigilError::BadPath { code, .. } => assert_eq!(code, Some(303)),
            other => panic!("Expected BadPath, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_empty_element_is_allowed() {
        let path = parse_path(r#"a."".b"#).expect("Failed to parse path");
        assert_eq!(path.keys(), ["a", "", "b"]);
    }

    #[test]
    fn test_fast_and_general_parses_agree() {
        for text in ["foo", "foo.bar", "foo.bar.baz"] {
            let fast = speculative_fast_parse_path(text).expect("Fast path declined");
            assert_eq!(fast, parse_path(text).expect("Failed to parse path"));
        }
    }

    #[test]
    fn test_hyphens_take_the_general_parser() {
        assert!(speculative_fast_parse_path("foo-bar.baz").is_none());
        let path = parse_path("foo-bar.baz").expect("Failed to parse path");
        assert_eq!(path.keys(), ["foo-bar", "baz"]);
    }
}
