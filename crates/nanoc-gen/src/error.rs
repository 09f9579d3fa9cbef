use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write IR: {0}")]
    Io(#[from] std::io::Error),
}
