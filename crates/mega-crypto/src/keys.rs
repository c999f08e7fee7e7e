//! 128-bit keys, node key layout, and block-wise key wrapping

use rand::RngCore;
use zeroize::Zeroize;

use crate::cipher::BlockKey;
use crate::codec::{bytes_to_words, words_to_bytes};
use crate::error::{CryptoError, CryptoResult};

/// A 4-word (128-bit) AES key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Key128 {
    words: [u32; 4],
}

impl Key128 {
    pub fn new(words: [u32; 4]) -> Self {
        Self { words }
    }

    /// Build a key from a word slice, which must be exactly 4 words long.
    pub fn from_words(words: &[u32]) -> CryptoResult<Self> {
        let words: [u32; 4] = words.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: "4 words",
            actual: words.len(),
        })?;
        Ok(Self::new(words))
    }

    /// Build a key from its 16-byte big-endian serialization.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != 16 {
            return Err(CryptoError::InvalidKeyLength {
                expected: "16 bytes",
                actual: bytes.len(),
            });
        }
        Self::from_words(&bytes_to_words(bytes))
    }

    pub fn words(&self) -> &[u32; 4] {
        &self.words
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(&words_to_bytes(&self.words));
        out
    }
}

impl Drop for Key128 {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

impl std::fmt::Debug for Key128 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key128")
            .field("words", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 128-bit key, e.g. for a new folder.
pub fn generate_key() -> Key128 {
    let mut words = [0u32; 4];
    let mut rng = rand::thread_rng();
    for w in &mut words {
        *w = rng.next_u32();
    }
    Key128::new(words)
}

/// A decrypted node key.
///
/// Files carry an 8-word key that folds the AES key together with the CTR
/// nonce and the condensed meta-MAC; folders carry the 4-word AES key alone.
#[derive(Clone, PartialEq, Eq)]
pub enum NodeKey {
    File {
        key: Key128,
        iv: [u32; 2],
        meta_mac: [u32; 2],
    },
    Folder {
        key: Key128,
    },
}

impl NodeKey {
    /// Split a decrypted node key into its parts.
    ///
    /// 8 words: `key = [k0^k4, k1^k5, k2^k6, k3^k7]`, `iv = [k4, k5]`,
    /// `meta_mac = [k6, k7]`. 4 words: folder key.
    pub fn unpack(words: &[u32]) -> CryptoResult<Self> {
        match words.len() {
            4 => Ok(NodeKey::Folder {
                key: Key128::from_words(words)?,
            }),
            8 => Ok(NodeKey::File {
                key: Key128::new([
                    words[0] ^ words[4],
                    words[1] ^ words[5],
                    words[2] ^ words[6],
                    words[3] ^ words[7],
                ]),
                iv: [words[4], words[5]],
                meta_mac: [words[6], words[7]],
            }),
            actual => Err(CryptoError::InvalidWordCount {
                expected: "4 or 8 words",
                actual,
            }),
        }
    }

    /// Inverse of [`NodeKey::unpack`].
    pub fn pack(&self) -> Vec<u32> {
        match self {
            NodeKey::Folder { key } => key.words().to_vec(),
            NodeKey::File { key, iv, meta_mac } => {
                let k = key.words();
                vec![
                    k[0] ^ iv[0],
                    k[1] ^ iv[1],
                    k[2] ^ meta_mac[0],
                    k[3] ^ meta_mac[1],
                    iv[0],
                    iv[1],
                    meta_mac[0],
                    meta_mac[1],
                ]
            }
        }
    }

    /// The AES key used for attributes, chunk MACs and payload.
    pub fn aes_key(&self) -> &Key128 {
        match self {
            NodeKey::File { key, .. } | NodeKey::Folder { key } => key,
        }
    }

    pub fn iv(&self) -> Option<[u32; 2]> {
        match self {
            NodeKey::File { iv, .. } => Some(*iv),
            NodeKey::Folder { .. } => None,
        }
    }

    pub fn meta_mac(&self) -> Option<[u32; 2]> {
        match self {
            NodeKey::File { meta_mac, .. } => Some(*meta_mac),
            NodeKey::Folder { .. } => None,
        }
    }
}

impl std::fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKey::File { .. } => f.debug_struct("NodeKey::File").finish_non_exhaustive(),
            NodeKey::Folder { .. } => f.debug_struct("NodeKey::Folder").finish_non_exhaustive(),
        }
    }
}

/// Wrap key material under `master`.
///
/// Every 4-word group is encrypted on its own (zero IV, no chaining between
/// groups); a short final group is zero-filled first.
pub fn wrap_key(plain: &[u32], master: &Key128) -> Vec<u32> {
    let cipher = BlockKey::new(master);
    map_blocks(plain, |block| cipher.encrypt_words(block))
}

/// Inverse of [`wrap_key`].
pub fn unwrap_key(wrapped: &[u32], master: &Key128) -> Vec<u32> {
    let cipher = BlockKey::new(master);
    map_blocks(wrapped, |block| cipher.decrypt_words(block))
}

fn map_blocks(words: &[u32], mut f: impl FnMut([u32; 4]) -> [u32; 4]) -> Vec<u32> {
    words
        .chunks(4)
        .flat_map(|chunk| {
            let mut block = [0u32; 4];
            block[..chunk.len()].copy_from_slice(chunk);
            f(block)
        })
        .collect()
}
