use thiserror::Error;

pub type MegaResult<T> = Result<T, MegaError>;

#[derive(Debug, Error)]
pub enum MegaError {
    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
