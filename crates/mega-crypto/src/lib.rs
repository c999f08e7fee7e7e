//! mega-crypto: the cloud-storage protocol's client-side cryptography
//!
//! Everything here is fixed by wire compatibility: AES-CBC with an all-zero
//! IV, big-endian 32-bit word arrays ("a32"), unpadded base64url, and the
//! iterated AES password KDF.
//!
//! Key hierarchy:
//! ```text
//! Password --derive_master_key--> Master Key (4 words)
//!   ├── wrap_key / unwrap_key: account key, node keys, RSA private key blob
//!   ├── string_hash(email): login challenge
//!   └── Node Key (4 words folder / 8 words file)
//!       ├── attributes: "MEGA" || JSON, AES-CBC
//!       └── file payload: AES-CTR + chunk MACs (mega-chunks)
//! ```
//!
//! All functions are pure and synchronous; none hold state between calls.

pub mod attrs;
pub mod cipher;
pub mod codec;
pub mod error;
pub mod ids;
pub mod kdf;
pub mod keys;
pub mod rsa;

pub use attrs::{decrypt_attributes, encrypt_attributes, NodeAttributes};
pub use cipher::{cbc_decrypt, cbc_decrypt_words, cbc_encrypt, cbc_encrypt_words, BlockKey};
pub use codec::{
    base64_to_words, base64_url_decode, base64_url_encode, bytes_to_latin1, bytes_to_words,
    latin1_to_bytes, words_to_base64, words_to_bytes,
};
pub use error::{CryptoError, CryptoResult};
pub use ids::{make_id, make_request_id};
pub use kdf::{derive_master_key, prepare_password_key, string_hash};
pub use keys::{generate_key, unwrap_key, wrap_key, Key128, NodeKey};
pub use rsa::{decode_mpi, decode_private_key, extended_gcd, modular_inverse, read_mpi, RsaPrivateKey};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;
