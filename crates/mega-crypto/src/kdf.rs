//! Password key derivation and the login challenge hash
//!
//! Both are iterated AES-128 constructions fixed by the service. They are
//! compute-bound on purpose; run them off latency-sensitive threads.

use tracing::debug;

use crate::cipher::BlockKey;
use crate::codec::{bytes_to_words, latin1_to_bytes, words_to_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::Key128;

/// Starting accumulator of the password key derivation.
pub const PASSWORD_KEY_SEED: [u32; 4] = [0x93C467E3, 0x7DB0C7A4, 0xD1BE3F81, 0x0152CB56];

/// Outer rounds of [`derive_master_key`].
pub const PASSWORD_KEY_ROUNDS: u32 = 0x10000;

/// Self-encryption rounds of [`string_hash`].
pub const LOGIN_HASH_ROUNDS: u32 = 0x4000;

/// Derive the 4-word master key from password words.
///
/// `password_words.len()` must be a multiple of 4. Each round encrypts the
/// accumulator once per 4-word group, using the group as the AES key.
pub fn derive_master_key(password_words: &[u32]) -> CryptoResult<Key128> {
    if password_words.len() % 4 != 0 {
        return Err(CryptoError::InvalidWordCount {
            expected: "a multiple of 4 words",
            actual: password_words.len(),
        });
    }

    let ciphers: Vec<BlockKey> = password_words
        .chunks_exact(4)
        .map(|c| BlockKey::new(&Key128::new([c[0], c[1], c[2], c[3]])))
        .collect();

    debug!(
        blocks = ciphers.len(),
        rounds = PASSWORD_KEY_ROUNDS,
        "deriving password key"
    );

    let mut acc = PASSWORD_KEY_SEED;
    for _ in 0..PASSWORD_KEY_ROUNDS {
        for cipher in &ciphers {
            acc = cipher.encrypt_words(acc);
        }
    }

    Ok(Key128::new(acc))
}

/// Derive the master key straight from a password string.
///
/// The password is Latin-1 encoded, split into words and zero-padded to a
/// whole number of 4-word groups.
pub fn prepare_password_key(password: &str) -> CryptoResult<Key128> {
    let mut words = bytes_to_words(&latin1_to_bytes(password)?);
    words.resize(words.len().div_ceil(4) * 4, 0);
    derive_master_key(&words)
}

/// Hash `text` (the lowercased account email) under `key` for the login
/// challenge.
///
/// The text words are XOR-folded into 4 words, self-encrypted 16384 times, and
/// words 0 and 2 of the result are returned base64url-encoded.
pub fn string_hash(text: &str, key: &Key128) -> CryptoResult<String> {
    let words = bytes_to_words(&latin1_to_bytes(text)?);

    let mut acc = [0u32; 4];
    for (i, word) in words.iter().enumerate() {
        acc[i % 4] ^= word;
    }

    debug!(
        words = words.len(),
        rounds = LOGIN_HASH_ROUNDS,
        "computing login hash"
    );

    let cipher = BlockKey::new(key);
    for _ in 0..LOGIN_HASH_ROUNDS {
        acc = cipher.encrypt_words(acc);
    }

    Ok(words_to_base64(&[acc[0], acc[2]]))
}
