use nanoc_lex::TokenKind;
use thiserror::Error;

/// The parser never attempts to synchronize — the first syntax error is
/// fatal.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token {found} at byte {offset}, expected {expected}")]
    UnexpectedToken {
        offset: u32,
        found: &'static str,
        expected: &'static str,
    },

    #[error("unexpected end of input, expected {expected}")]
    Eof { expected: &'static str },
}

impl ParseError {
    pub fn unexpected(found: TokenKind, offset: u32, expected: &'static str) -> Self {
        if found == TokenKind::Eof {
            ParseError::Eof { expected }
        } else {
            ParseError::UnexpectedToken {
                offset,
                found: found.name(),
                expected,
            }
        }
    }
}
