use thiserror::Error;

use nanoc_gen::EmitError;
use nanoc_lex::LexError;
use nanoc_par::ParseError;

/// Everything that can make a compile attempt fail. Every variant is
/// fatal and reported on the error stream with a nonzero exit — there
/// are no warnings in this compiler.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read input: {0}")]
    Read(#[source] std::io::Error),

    #[error("could not open output: {0}")]
    Write(#[source] std::io::Error),

    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Emit(#[from] EmitError),
}
