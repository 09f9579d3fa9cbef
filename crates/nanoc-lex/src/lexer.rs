//! The tokenizer: a deterministic finite automaton over source bytes.
//!
//! `Empty` is the resting state between tokens, `Num`/`Ident` accumulate
//! a multi-byte lexeme, and `Equal`/`Not`/`Lt`/`Gt` are the one-byte
//! lookahead states used to decide between a one- and two-character
//! operator. There is no `End` state in this implementation — reaching
//! end of input while in `Empty` simply terminates the scan loop and the
//! caller appends `Eof`.

use nanoc_util::Span;

use crate::error::LexError;
use crate::token::{keyword, Token, TokenKind};

/// Source text longer than this is truncated before lexing begins.
pub const MAX_INPUT_BYTES: usize = 10_240;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Empty,
    Num,
    Ident,
    Equal,
    Not,
    Lt,
    Gt,
}

/// Tokenize `source`, capping it at [`MAX_INPUT_BYTES`] and stopping
/// early at a trailing NUL.
///
/// Returns tokens beginning with `Root` and ending with `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let bytes = source.as_bytes();
    let end = bytes[..bytes.len().min(MAX_INPUT_BYTES)]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or_else(|| bytes.len().min(MAX_INPUT_BYTES));

    let mut tokens = vec![Token::new(TokenKind::Root, Span::DUMMY)];
    let mut state = State::Empty;
    let mut token_start = 0usize;
    let mut pos = 0usize;

    macro_rules! push {
        ($kind:expr, $start:expr, $end:expr) => {
            tokens.push(Token::new($kind, Span::new($start as u32, $end as u32)))
        };
    }

    while pos < end {
        let c = bytes[pos];

        match state {
            State::Empty => {
                token_start = pos;
                match c {
                    b' ' | b'\t' | b'\r' | b'\n' => {
                        pos += 1;
                    }
                    b'(' => {
                        push!(TokenKind::LParen, pos, pos + 1);
                        pos += 1;
                    }
                    b')' => {
                        push!(TokenKind::RParen, pos, pos + 1);
                        pos += 1;
                    }
                    b'[' => {
                        push!(TokenKind::LBracket, pos, pos + 1);
                        pos += 1;
                    }
                    b']' => {
                        push!(TokenKind::RBracket, pos, pos + 1);
                        pos += 1;
                    }
                    b'{' => {
                        push!(TokenKind::LBrace, pos, pos + 1);
                        pos += 1;
                    }
                    b'}' => {
                        push!(TokenKind::RBrace, pos, pos + 1);
                        pos += 1;
                    }
                    b';' => {
                        push!(TokenKind::Semi, pos, pos + 1);
                        pos += 1;
                    }
                    b',' => {
                        push!(TokenKind::Comma, pos, pos + 1);
                        pos += 1;
                    }
                    b'+' => {
                        push!(TokenKind::Plus, pos, pos + 1);
                        pos += 1;
                    }
                    b'-' => {
                        push!(TokenKind::Minus, pos, pos + 1);
                        pos += 1;
                    }
                    b'*' => {
                        push!(TokenKind::Star, pos, pos + 1);
                        pos += 1;
                    }
                    b'/' => {
                        push!(TokenKind::Slash, pos, pos + 1);
                        pos += 1;
                    }
                    b'=' => {
                        state = State::Equal;
                        pos += 1;
                    }
                    b'!' => {
                        state = State::Not;
                        pos += 1;
                    }
                    b'<' => {
                        state = State::Lt;
                        pos += 1;
                    }
                    b'>' => {
                        state = State::Gt;
                        pos += 1;
                    }
                    b'0'..=b'9' => {
                        state = State::Num;
                        pos += 1;
                    }
                    b'a'..=b'z' => {
                        state = State::Ident;
                        pos += 1;
                    }
                    other => {
                        return Err(LexError::UnexpectedChar {
                            offset: pos as u32,
                            byte: other,
                        });
                    }
                }
            }

            State::Num => {
                if c.is_ascii_digit() {
                    pos += 1;
                } else {
                    push!(TokenKind::Num, token_start, pos);
                    state = State::Empty;
                }
            }

            State::Ident => {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    pos += 1;
                } else {
                    commit_ident(&mut tokens, source, token_start, pos);
                    state = State::Empty;
                }
            }

            State::Equal => {
                if c == b'=' {
                    push!(TokenKind::Eq, token_start, pos + 1);
                    pos += 1;
                } else {
                    push!(TokenKind::Assign, token_start, pos);
                }
                state = State::Empty;
            }

            State::Not => {
                if c == b'=' {
                    push!(TokenKind::Ne, token_start, pos + 1);
                    pos += 1;
                    state = State::Empty;
                } else {
                    return Err(LexError::UnexpectedChar {
                        offset: token_start as u32,
                        byte: b'!',
                    });
                }
            }

            State::Lt => {
                if c == b'=' {
                    push!(TokenKind::Le, token_start, pos + 1);
                    pos += 1;
                } else {
                    push!(TokenKind::Lt, token_start, pos);
                }
                state = State::Empty;
            }

            State::Gt => {
                if c == b'=' {
                    push!(TokenKind::Ge, token_start, pos + 1);
                    pos += 1;
                } else {
                    push!(TokenKind::Gt, token_start, pos);
                }
                state = State::Empty;
            }
        }
    }

    // Flush whatever multi-byte token was in progress when input ended.
    match state {
        State::Empty => {}
        State::Num => push!(TokenKind::Num, token_start, end),
        State::Ident => commit_ident(&mut tokens, source, token_start, end),
        State::Equal => push!(TokenKind::Assign, token_start, end),
        State::Lt => push!(TokenKind::Lt, token_start, end),
        State::Gt => push!(TokenKind::Gt, token_start, end),
        State::Not => {
            return Err(LexError::UnexpectedChar {
                offset: token_start as u32,
                byte: b'!',
            })
        }
    }

    tokens.push(Token::new(TokenKind::Eof, Span::new(end as u32, end as u32)));
    Ok(tokens)
}

/// Commit an `Ident`/`Num` run, checking the reserved-word table first —
/// `let`, `return`, `fun`, `if`, `else`, and `loop` are recognized here by
/// longest-match rather than as their own DFA states.
fn commit_ident(tokens: &mut Vec<Token>, source: &str, start: usize, end: usize) {
    let span = Span::new(start as u32, end as u32);
    let lexeme = span.slice(source);
    let kind = keyword(lexeme).unwrap_or(TokenKind::Ident);
    tokens.push(Token::new(kind, span));
}

/// Render the token stream in the `-d` debug-dump format:
/// `<kind>: pos = <offset>, chars = <lexeme>` per line.
pub fn dump(tokens: &[Token], source: &str) -> String {
    let mut out = String::new();
    for tok in tokens {
        let lexeme = if tok.kind == TokenKind::Root || tok.kind == TokenKind::Eof {
            ""
        } else {
            tok.lexeme(source)
        };
        out.push_str(&format!(
            "{}: pos = {}, chars = {}\n",
            tok.kind.name(),
            tok.span.lo,
            lexeme
        ));
    }
    out
}
