use thiserror::Error;

/// The lexer's single failure mode: a byte with no transition out of
/// whichever state the DFA was in. Always fatal — there is no recovery
/// in this compiler.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("unexpected character '{}' (0x{byte:02x}) at byte {offset}", *byte as char)]
    UnexpectedChar { offset: u32, byte: u8 },
}

impl LexError {
    pub fn offset(&self) -> u32 {
        match self {
            LexError::UnexpectedChar { offset, .. } => *offset,
        }
    }
}
