//! AES-CBC with the protocol's fixed all-zero IV
//!
//! No padding is applied here: callers hand in block-aligned data and get a
//! [`CryptoError::InvalidDataLength`] otherwise. Byte-oriented calls accept a
//! 16-byte (AES-128) or 32-byte (AES-256) key; word-oriented calls take a
//! [`Key128`].

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::codec::{bytes_to_words, words_to_bytes};
use crate::error::{CryptoError, CryptoResult};
use crate::keys::Key128;
use crate::BLOCK_SIZE;

const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

const KEY_LENGTHS: &str = "16 or 32 bytes";

/// CBC-encrypt `data` under `key` with a zero IV.
pub fn cbc_encrypt(data: &[u8], key: &[u8]) -> CryptoResult<Vec<u8>> {
    check_aligned(data)?;
    let mut buf = data.to_vec();
    let len = buf.len();

    let result = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, &ZERO_IV)
            .map_err(|_| invalid_key(key))?
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map(|_| ()),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, &ZERO_IV)
            .map_err(|_| invalid_key(key))?
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map(|_| ()),
        _ => return Err(invalid_key(key)),
    };
    result.map_err(|_| CryptoError::InvalidDataLength { len })?;

    Ok(buf)
}

/// CBC-decrypt `data` under `key` with a zero IV.
pub fn cbc_decrypt(data: &[u8], key: &[u8]) -> CryptoResult<Vec<u8>> {
    check_aligned(data)?;
    let mut buf = data.to_vec();
    let len = buf.len();

    let result = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, &ZERO_IV)
            .map_err(|_| invalid_key(key))?
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map(|_| ()),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, &ZERO_IV)
            .map_err(|_| invalid_key(key))?
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map(|_| ()),
        _ => return Err(invalid_key(key)),
    };
    result.map_err(|_| CryptoError::InvalidDataLength { len })?;

    Ok(buf)
}

/// Word-array form of [`cbc_encrypt`]. `data` must hold a multiple of 4 words.
pub fn cbc_encrypt_words(data: &[u32], key: &Key128) -> CryptoResult<Vec<u32>> {
    let out = cbc_encrypt(&words_to_bytes(data), &key.to_bytes())?;
    Ok(bytes_to_words(&out))
}

/// Word-array form of [`cbc_decrypt`]. `data` must hold a multiple of 4 words.
pub fn cbc_decrypt_words(data: &[u32], key: &Key128) -> CryptoResult<Vec<u32>> {
    let out = cbc_decrypt(&words_to_bytes(data), &key.to_bytes())?;
    Ok(bytes_to_words(&out))
}

fn check_aligned(data: &[u8]) -> CryptoResult<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidDataLength { len: data.len() });
    }
    Ok(())
}

fn invalid_key(key: &[u8]) -> CryptoError {
    CryptoError::InvalidKeyLength {
        expected: KEY_LENGTHS,
        actual: key.len(),
    }
}

/// An expanded AES-128 key for independent single-block operations.
///
/// CBC over one block with a zero IV is a plain block encryption, so the
/// iterated KDF, key wrap and MAC loops go through this instead of
/// rebuilding a CBC context per block.
pub struct BlockKey {
    cipher: Aes128,
}

impl BlockKey {
    pub fn new(key: &Key128) -> Self {
        let bytes = key.to_bytes();
        Self {
            cipher: Aes128::new(GenericArray::from_slice(&bytes)),
        }
    }

    /// Same result as `cbc_encrypt_words(&block, key)`.
    pub fn encrypt_words(&self, block: [u32; 4]) -> [u32; 4] {
        let mut buf = to_block(block);
        self.cipher.encrypt_block(&mut buf);
        from_block(&buf)
    }

    /// Same result as `cbc_decrypt_words(&block, key)`.
    pub fn decrypt_words(&self, block: [u32; 4]) -> [u32; 4] {
        let mut buf = to_block(block);
        self.cipher.decrypt_block(&mut buf);
        from_block(&buf)
    }
}

fn to_block(words: [u32; 4]) -> aes::Block {
    let mut bytes = [0u8; BLOCK_SIZE];
    for (dst, word) in bytes.chunks_exact_mut(4).zip(words) {
        dst.copy_from_slice(&word.to_be_bytes());
    }
    aes::Block::clone_from_slice(&bytes)
}

fn from_block(block: &aes::Block) -> [u32; 4] {
    let mut out = [0u32; 4];
    for (word, src) in out.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([src[0], src[1], src[2], src[3]]);
    }
    out
}
