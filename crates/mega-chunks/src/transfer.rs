//! Whole-file payload encryption/decryption with MAC chaining
//!
//! Upload: plaintext → per-chunk MAC → AES-CTR → ciphertext; the meta-MAC is
//! folded into the new 8-word node key.
//! Download: ciphertext → AES-CTR → plaintext → per-chunk MAC → compare
//! against the node key's meta-MAC.

use mega_core::config::TransferConfig;
use mega_core::MegaResult;
use mega_crypto::{CryptoError, CryptoResult, Key128, NodeKey};
use tracing::debug;

use crate::ctr_cipher::ChunkCipher;
use crate::mac::{verify_meta_mac, MacAccumulator};
use crate::plan::ChunkSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub schedule: ChunkSchedule,
    pub verify_mac: bool,
}

impl TransferOptions {
    pub fn from_config(config: &TransferConfig) -> MegaResult<Self> {
        Ok(Self {
            schedule: ChunkSchedule::from_config(config)?,
            verify_mac: config.verify_mac,
        })
    }
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            schedule: ChunkSchedule::MEGA,
            verify_mac: true,
        }
    }
}

/// Result of [`encrypt_upload`]
pub struct EncryptedUpload {
    pub ciphertext: Vec<u8>,
    /// The 8-word node key to wrap and attach to the new node.
    pub node_key: NodeKey,
}

/// Encrypt a file for upload under `key` and CTR nonce `iv`.
pub fn encrypt_upload(
    key: &Key128,
    iv: [u32; 2],
    plaintext: &[u8],
    options: &TransferOptions,
) -> EncryptedUpload {
    let cipher = ChunkCipher::new(key, iv);
    let mut mac = MacAccumulator::new(key, iv);
    for chunk in options.schedule.split(plaintext) {
        mac.update(chunk);
    }

    let mut ciphertext = plaintext.to_vec();
    cipher.apply(0, &mut ciphertext);

    debug!(bytes = plaintext.len(), chunks = mac.chunks(), "encrypted upload payload");

    EncryptedUpload {
        ciphertext,
        node_key: NodeKey::File {
            key: key.clone(),
            iv,
            meta_mac: mac.finish(),
        },
    }
}

/// Decrypt a downloaded file payload, checking its meta-MAC if configured.
pub fn decrypt_download(
    node: &NodeKey,
    ciphertext: &[u8],
    options: &TransferOptions,
) -> CryptoResult<Vec<u8>> {
    let (cipher, mut mac) = match (ChunkCipher::for_node(node), MacAccumulator::for_node(node)) {
        (Some(cipher), Some(mac)) => (cipher, mac),
        _ => return Err(CryptoError::NotAFileKey),
    };

    let mut plaintext = ciphertext.to_vec();
    cipher.apply(0, &mut plaintext);
    for chunk in options.schedule.split(&plaintext) {
        mac.update(chunk);
    }

    debug!(bytes = plaintext.len(), chunks = mac.chunks(), "decrypted download payload");

    if options.verify_mac {
        verify_meta_mac(node, mac.finish())?;
    }
    Ok(plaintext)
}
