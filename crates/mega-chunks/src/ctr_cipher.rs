//! AES-128-CTR over file payloads
//!
//! Counter block: `[iv0, iv1]` as a 64-bit nonce followed by a 64-bit
//! big-endian block counter starting at zero. Any chunk can be processed on
//! its own by seeking to its byte offset.

use aes::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use mega_crypto::{words_to_bytes, Key128, NodeKey};
use zeroize::Zeroize;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

pub struct ChunkCipher {
    key: [u8; 16],
    nonce: [u8; 16],
}

impl ChunkCipher {
    pub fn new(key: &Key128, iv: [u32; 2]) -> Self {
        let mut nonce = [0u8; 16];
        nonce[..8].copy_from_slice(&words_to_bytes(&iv));
        Self {
            key: key.to_bytes(),
            nonce,
        }
    }

    /// Cipher for a file node; `None` for folders.
    pub fn for_node(node: &NodeKey) -> Option<Self> {
        node.iv().map(|iv| Self::new(node.aes_key(), iv))
    }

    /// Encrypt or decrypt `buf` in place, where `buf` starts `offset` bytes
    /// into the file.
    pub fn apply(&self, offset: u64, buf: &mut [u8]) {
        let mut cipher = Aes128Ctr::new(
            GenericArray::from_slice(&self.key),
            GenericArray::from_slice(&self.nonce),
        );
        cipher.seek(offset);
        cipher.apply_keystream(buf);
    }
}

impl Drop for ChunkCipher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
