use super::*;

/// Advance the character cursor, counting lines.
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = lexer.peek;
    if curr == Some('\n') {
        lexer.line += 1;
    }
    lexer.peek = lexer.input.next();
    curr
}

/// Look one character past the current one without consuming anything.
pub(super) fn peek_second(lexer: &Lexer) -> Option<char> {
    lexer.input.clone().next()
}
