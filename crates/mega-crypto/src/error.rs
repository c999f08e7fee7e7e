use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Contract and decoding failures of the protocol primitives.
///
/// Attribute decryption against the wrong key is not an error; see
/// [`crate::attrs::decrypt_attributes`].
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: &'static str, actual: usize },

    #[error("invalid data length: {len} bytes is not a multiple of the 16-byte block size")]
    InvalidDataLength { len: usize },

    #[error("invalid word count: expected {expected}, got {actual}")]
    InvalidWordCount { expected: &'static str, actual: usize },

    #[error("base64 decode: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("character {0:?} cannot be encoded as Latin-1")]
    NotLatin1(char),

    #[error("modular inverse does not exist")]
    NoInverse,

    #[error("malformed MPI: {0}")]
    Mpi(String),

    #[error("folder key has no file IV or meta-MAC")]
    NotAFileKey,

    #[error("file MAC does not match the node key's meta-MAC")]
    MacMismatch,
}

impl From<CryptoError> for mega_core::MegaError {
    fn from(e: CryptoError) -> Self {
        mega_core::MegaError::Crypto(e.to_string())
    }
}
