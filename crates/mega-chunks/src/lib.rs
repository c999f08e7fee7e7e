//! mega-chunks: chunk schedule, chunk MACs, and payload encryption for transfers
//!
//! # Overview
//! - `plan`: deterministic chunk boundaries (128 KiB steps up to 1 MiB)
//! - `mac`: per-chunk CBC-MAC and the condensed meta-MAC
//! - `ctr_cipher`: seekable AES-128-CTR over file payloads
//! - `transfer`: whole-file upload/download built from the three above

pub mod ctr_cipher;
pub mod mac;
pub mod plan;
pub mod transfer;

// Convenience re-exports for the most common operations
pub use ctr_cipher::ChunkCipher;
pub use mac::{chunk_mac, file_meta_mac, verify_meta_mac, MacAccumulator};
pub use plan::{plan_chunks, Chunk, ChunkPlan, ChunkSchedule};
pub use transfer::{decrypt_download, encrypt_upload, EncryptedUpload, TransferOptions};
