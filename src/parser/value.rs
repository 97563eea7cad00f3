use super::*;

/// Turn the token in value position into a value. Braces and brackets
/// recurse into their builders.
pub(super) fn parse_value(parser: &mut Parser, token: Token) -> Result<Value, SigilError> {
    match token {
        Token::Value(value) => Ok(value),
        Token::OpenBrace => object::parse_object(parser),
        Token::OpenBracket => array::parse_array(parser),
        other => Err(SigilError::Parse {
            message: format!("Expecting a value but got wrong token: {}", other),
            origin: parser.line_origin(),
            hint: None,
            code: Some(203),
        }),
    }
}

/// Fold a run of adjacent value-shaped tokens on one line into a single
/// value token and push it back for the caller to pull.
///
/// `a: 42 foo` folds to the string "42 foo"; a run containing `${...}`
/// folds to a substitution with literal and reference segments. The
/// token that ends the run goes back on the stream after the folded
/// value. Strict mode never has adjacent values, so this does nothing.
pub(super) fn consolidate_value_tokens(parser: &mut Parser) -> Result<(), SigilError> {
    if parser.mode == Mode::Strict {
        return Ok(());
    }

    let mut values: Vec<Token> = Vec::new();
    // the run may start on a later line, but must not span one
    let mut token = parser.next_token_ignoring_newline()?;
    while token.is_value_shaped() {
        values.push(token);
        token = parser.next_token()?;
    }
    // terminator first, so the folded value comes off the stream before it
    parser.put_back(token);

    if values.is_empty() {
        return Ok(());
    }
    if let [Token::Value(_)] = values.as_slice() {
        if let Some(only) = values.pop() {
            parser.put_back(only);
        }
        return Ok(());
    }

    let origin = token_origin(&values[0]);
    let mut segments: Vec<Segment> = Vec::new();
    let mut partial = String::new();

    for token in values {
        match token {
            Token::Value(value) => match value.render_scalar() {
                Some(text) => partial.push_str(&text),
                None => panic!(
                    "should not be trying to consolidate a {} value",
                    value.type_name()
                ),
            },
            Token::UnquotedText { text, .. } => partial.push_str(&text),
            Token::Substitution {
                expression,
                optional,
                origin,
            } => {
                if !partial.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut partial)));
                }
                let path = paths::parse_path_expression(&expression, &origin)?;
                segments.push(Segment::Reference { path, optional });
            }
            other => panic!("should not be trying to consolidate token: {}", other),
        }
    }
    if !partial.is_empty() {
        segments.push(Segment::Literal(partial));
    }

    let consolidated = if segments.is_empty() {
        panic!("trying to consolidate values to nothing");
    } else if segments.len() == 1 {
        match segments.pop() {
            Some(Segment::Literal(text)) => Value::new(ValueKind::String(text), origin),
            Some(reference) => Value::new(
                ValueKind::Substitution(Substitution::new(vec![reference])),
                origin,
            ),
            None => unreachable!(),
        }
    } else {
        Value::new(ValueKind::Substitution(Substitution::new(segments)), origin)
    };
    parser.put_back(Token::Value(consolidated));
    Ok(())
}

fn token_origin(token: &Token) -> Origin {
    match token {
        Token::Value(value) => value.origin().clone(),
        Token::UnquotedText { origin, .. } => origin.clone(),
        Token::Substitution { origin, .. } => origin.clone(),
        other => panic!("token has no origin: {}", other),
    }
}
