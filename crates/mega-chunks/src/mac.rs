//! Chunk MACs and the condensed file MAC
//!
//! Each chunk is CBC-MAC'd under the file's AES key, starting from
//! `[iv0, iv1, iv0, iv1]`. The chunk MACs are then folded in file order,
//! `file_mac = E(file_mac ^ chunk_mac)` from zero, and condensed to the
//! 2-word meta-MAC `[f0 ^ f1, f2 ^ f3]` stored in the node key.

use mega_crypto::{BlockKey, CryptoError, CryptoResult, Key128, NodeKey};
use rayon::prelude::*;
use tracing::{trace, warn};

use crate::plan::ChunkSchedule;

/// CBC-MAC of one chunk's plaintext. A partial final block is zero-filled.
pub fn chunk_mac(key: &Key128, iv: [u32; 2], data: &[u8]) -> [u32; 4] {
    mac_with(&BlockKey::new(key), iv, data)
}

fn mac_with(cipher: &BlockKey, iv: [u32; 2], data: &[u8]) -> [u32; 4] {
    let mut mac = [iv[0], iv[1], iv[0], iv[1]];
    for block in data.chunks(16) {
        let mut bytes = [0u8; 16];
        bytes[..block.len()].copy_from_slice(block);
        for (m, word) in mac.iter_mut().zip(bytes.chunks_exact(4)) {
            *m ^= u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        }
        mac = cipher.encrypt_words(mac);
    }
    mac
}

/// Folds chunk MACs, in file order, into the file's meta-MAC.
pub struct MacAccumulator {
    cipher: BlockKey,
    iv: [u32; 2],
    file_mac: [u32; 4],
    chunks: u64,
}

impl MacAccumulator {
    pub fn new(key: &Key128, iv: [u32; 2]) -> Self {
        Self {
            cipher: BlockKey::new(key),
            iv,
            file_mac: [0; 4],
            chunks: 0,
        }
    }

    /// Accumulator for a file node; `None` for folders.
    pub fn for_node(node: &NodeKey) -> Option<Self> {
        node.iv().map(|iv| Self::new(node.aes_key(), iv))
    }

    /// MAC of one chunk under this accumulator's key and IV.
    pub fn chunk_mac(&self, data: &[u8]) -> [u32; 4] {
        mac_with(&self.cipher, self.iv, data)
    }

    /// Fold the next chunk's MAC.
    pub fn push_chunk_mac(&mut self, mac: [u32; 4]) {
        for (f, m) in self.file_mac.iter_mut().zip(mac) {
            *f ^= m;
        }
        self.file_mac = self.cipher.encrypt_words(self.file_mac);
        self.chunks += 1;
        trace!(chunk = self.chunks, "folded chunk MAC");
    }

    /// MAC the next chunk's plaintext and fold it.
    pub fn update(&mut self, chunk: &[u8]) {
        let mac = self.chunk_mac(chunk);
        self.push_chunk_mac(mac);
    }

    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// The condensed meta-MAC `[f0 ^ f1, f2 ^ f3]`.
    pub fn finish(&self) -> [u32; 2] {
        condense(self.file_mac)
    }
}

fn condense(mac: [u32; 4]) -> [u32; 2] {
    [mac[0] ^ mac[1], mac[2] ^ mac[3]]
}

/// Meta-MAC of a whole in-memory plaintext, MACing chunks in parallel.
pub fn file_meta_mac(
    key: &Key128,
    iv: [u32; 2],
    data: &[u8],
    schedule: &ChunkSchedule,
) -> [u32; 2] {
    let mut acc = MacAccumulator::new(key, iv);
    let chunks: Vec<&[u8]> = schedule.split(data).collect();
    let macs: Vec<[u32; 4]> = chunks.par_iter().map(|c| acc.chunk_mac(c)).collect();
    for mac in macs {
        acc.push_chunk_mac(mac);
    }
    acc.finish()
}

/// Compare a computed meta-MAC with the one folded into a file node key.
pub fn verify_meta_mac(node: &NodeKey, computed: [u32; 2]) -> CryptoResult<()> {
    let expected = node.meta_mac().ok_or(CryptoError::NotAFileKey)?;
    if expected != computed {
        warn!("meta-MAC mismatch: file content does not match its node key");
        return Err(CryptoError::MacMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key128 {
        Key128::new([0x01234567, 0x89abcdef, 0xfedcba98, 0x76543210])
    }

    const IV: [u32; 2] = [0x0badf00d, 0xdeadbeef];

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_chunk_mac_known_vector() {
        let mac = chunk_mac(&key(), IV, &sample(40));
        assert_eq!(mac, [0x0c0f963a, 0x470bbaa2, 0xfdbfdcee, 0x36e99d66]);
    }

    #[test]
    fn test_empty_chunk_mac_is_iv() {
        assert_eq!(chunk_mac(&key(), IV, &[]), [IV[0], IV[1], IV[0], IV[1]]);
    }

    #[test]
    fn test_partial_block_is_zero_filled() {
        let mut padded = b"abc".to_vec();
        padded.resize(16, 0);
        assert_eq!(chunk_mac(&key(), IV, b"abc"), chunk_mac(&key(), IV, &padded));
    }

    #[test]
    fn test_meta_mac_known_vector() {
        let data = sample(300_000);
        let mut acc = MacAccumulator::new(&key(), IV);
        for chunk in ChunkSchedule::MEGA.split(&data) {
            acc.update(chunk);
        }
        assert_eq!(acc.chunks(), 2);
        assert_eq!(acc.finish(), [0x18744ec2, 0x3d95edeb]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = sample(3_000_000);
        let mut acc = MacAccumulator::new(&key(), IV);
        for chunk in ChunkSchedule::MEGA.split(&data) {
            acc.update(chunk);
        }
        assert_eq!(file_meta_mac(&key(), IV, &data, &ChunkSchedule::MEGA), acc.finish());
    }

    #[test]
    fn test_verify_meta_mac() {
        let node = NodeKey::File {
            key: key(),
            iv: IV,
            meta_mac: [0x18744ec2, 0x3d95edeb],
        };
        assert!(verify_meta_mac(&node, [0x18744ec2, 0x3d95edeb]).is_ok());
        assert!(matches!(
            verify_meta_mac(&node, [0x18744ec2, 0]),
            Err(CryptoError::MacMismatch)
        ));
    }

    #[test]
    fn test_folder_has_no_mac() {
        let folder = NodeKey::Folder { key: key() };
        assert!(MacAccumulator::for_node(&folder).is_none());
        assert!(matches!(
            verify_meta_mac(&folder, [0, 0]),
            Err(CryptoError::NotAFileKey)
        ));
    }
}
