use super::*;

/// Drive a whole parse: exactly one object or array at the root, nothing
/// but newlines around it.
pub(super) fn parse_document(parser: &mut Parser) -> Result<Value, SigilError> {
    let first = parser.next_token()?;
    if first != Token::Start {
        panic!("token stream did not begin with the start sentinel, got {}", first);
    }

    let root = match parser.next_token_ignoring_newline()? {
        Token::OpenBrace => object::parse_object(parser)?,
        Token::OpenBracket => array::parse_array(parser)?,
        Token::End => {
            return Err(SigilError::Parse {
                message: "Empty document".into(),
                origin: parser.line_origin(),
                hint: None,
                code: Some(211),
            });
        }
        other => {
            return Err(SigilError::Parse {
                message: format!("Document must have an object or array at root, got: {}", other),
                origin: parser.line_origin(),
                hint: None,
                code: Some(212),
            });
        }
    };

    match parser.next_token_ignoring_newline()? {
        Token::End => Ok(root),
        other => Err(SigilError::Parse {
            message: format!("Document has trailing tokens after the root value: {}", other),
            origin: parser.line_origin(),
            hint: None,
            code: Some(213),
        }),
    }
}
