use super::*;

/// Build one array, starting just after its open bracket. Elements are
/// comma separated, a trailing comma is refused.
pub(super) fn parse_array(parser: &mut Parser) -> Result<Value, SigilError> {
    let array_origin = parser.line_origin();
    let mut elements: Vec<Value> = Vec::new();

    value::consolidate_value_tokens(parser)?;
    let token = parser.next_token_ignoring_newline()?;

    // special-case the first element
    match token {
        Token::CloseBracket => {
            return Ok(Value::new(ValueKind::Array(elements), array_origin));
        }
        Token::Value(_) | Token::OpenBrace | Token::OpenBracket => {
            elements.push(value::parse_value(parser, token)?);
        }
        other => {
            return Err(SigilError::Parse {
                message: format!(
                    "List should have ']' or a first element after the open '[', got: {}",
                    other
                ),
                origin: parser.line_origin(),
                hint: None,
                code: Some(210),
            });
        }
    }

    loop {
        match parser.next_token_ignoring_newline()? {
            Token::CloseBracket => {
                return Ok(Value::new(ValueKind::Array(elements), array_origin));
            }
            Token::Comma => {
                value::consolidate_value_tokens(parser)?;
                let token = parser.next_token_ignoring_newline()?;
                match token {
                    Token::Value(_) | Token::OpenBrace | Token::OpenBracket => {
                        elements.push(value::parse_value(parser, token)?);
                    }
                    other => {
                        return Err(SigilError::Parse {
                            message: format!(
                                "List should have a new element after the comma, got: {}",
                                other
                            ),
                            origin: parser.line_origin(),
                            hint: None,
                            code: Some(210),
                        });
                    }
                }
            }
            other => {
                return Err(SigilError::Parse {
                    message: format!(
                        "List should have ended with ']' or had a comma, got: {}",
                        other
                    ),
                    origin: parser.line_origin(),
                    hint: None,
                    code: Some(210),
                });
            }
        }
    }
}
