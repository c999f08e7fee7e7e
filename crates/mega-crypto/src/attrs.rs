//! Encrypted node attributes
//!
//! Plaintext layout before AES-CBC (zero IV) under the node's AES key:
//! ```text
//! "MEGA" || JSON object || zero padding to a 16-byte boundary
//! ```
//! The padding always adds at least one zero byte, so an already aligned
//! payload gains a whole block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cipher::{cbc_decrypt, cbc_encrypt};
use crate::error::CryptoResult;
use crate::keys::Key128;
use crate::BLOCK_SIZE;

/// Prefix of every attribute plaintext.
pub const ATTR_MAGIC: &[u8; 4] = b"MEGA";

/// The magic plus the opening of a JSON object with at least one key.
const ATTR_HEADER: &[u8; 6] = b"MEGA{\"";

/// Node metadata: a JSON object whose `n` key is the node name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeAttributes(pub Map<String, Value>);

impl NodeAttributes {
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("n".into(), Value::String(name.into()));
        Self(map)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("n").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }
}

/// Serialize and encrypt `attrs` under `key`.
pub fn encrypt_attributes(attrs: &NodeAttributes, key: &Key128) -> CryptoResult<Vec<u8>> {
    let json = serde_json::to_vec(attrs)?;

    let mut plain = Vec::with_capacity(ATTR_MAGIC.len() + json.len() + BLOCK_SIZE);
    plain.extend_from_slice(ATTR_MAGIC);
    plain.extend_from_slice(&json);
    let padding = BLOCK_SIZE - plain.len() % BLOCK_SIZE;
    plain.resize(plain.len() + padding, 0);

    cbc_encrypt(&plain, &key.to_bytes())
}

/// Decrypt attributes, or `None` if `ciphertext` does not hold attributes
/// under `key`.
///
/// A wrong key, a misaligned buffer and malformed JSON all collapse into
/// `None`; probing candidate keys is an expected use.
pub fn decrypt_attributes(ciphertext: &[u8], key: &Key128) -> Option<NodeAttributes> {
    let plain = match cbc_decrypt(ciphertext, &key.to_bytes()) {
        Ok(plain) => plain,
        Err(e) => {
            debug!("attribute decryption failed: {e}");
            return None;
        }
    };

    let end = plain.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let plain = &plain[..end];

    if !plain.starts_with(ATTR_HEADER) {
        debug!("no attribute header after decryption");
        return None;
    }

    match serde_json::from_slice(&plain[ATTR_MAGIC.len()..]) {
        Ok(attrs) => Some(attrs),
        Err(e) => {
            debug!("attribute JSON rejected: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_key() -> Key128 {
        Key128::new([0x01234567, 0x89abcdef, 0xfedcba98, 0x76543210])
    }

    #[test]
    fn test_known_ciphertext() {
        let attrs = NodeAttributes::with_name("test.txt");
        let encrypted = encrypt_attributes(&attrs, &node_key()).unwrap();

        let expected: Vec<u8> = (0..64)
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(
                    &"8e82e8594fda23adceec517e142ad62ea4f5b22a8ea22ff486f85286c4d9af7f"[i..i + 2],
                    16,
                )
                .unwrap()
            })
            .collect();
        assert_eq!(encrypted, expected);
    }

    #[test]
    fn test_roundtrip() {
        let mut attrs = NodeAttributes::with_name("holiday photos");
        attrs.insert("c", json!("AAECAwQFBgcICQoLDA0ODxA"));
        attrs.insert("t", json!(1700000000));

        let encrypted = encrypt_attributes(&attrs, &node_key()).unwrap();
        let decrypted = decrypt_attributes(&encrypted, &node_key()).unwrap();

        assert_eq!(decrypted, attrs);
        assert_eq!(decrypted.name(), Some("holiday photos"));
        assert_eq!(decrypted.get("t"), Some(&json!(1700000000)));
    }

    #[test]
    fn test_roundtrip_utf8_name() {
        let attrs = NodeAttributes::with_name("r\u{e9}sum\u{e9} \u{1f4c4}.pdf");
        let encrypted = encrypt_attributes(&attrs, &node_key()).unwrap();
        assert_eq!(decrypt_attributes(&encrypted, &node_key()), Some(attrs));
    }

    #[test]
    fn test_decrypts_spaced_ascii_escaped_json() {
        // Other clients write `{"n": "..."}` with `\uXXXX` escapes for non-ASCII.
        let mut plain = br#"MEGA{"n": "r\u00e9sum\u00e9.pdf", "c": "AAEC"}"#.to_vec();
        plain.resize(plain.len() + BLOCK_SIZE - plain.len() % BLOCK_SIZE, 0);
        let encrypted = cbc_encrypt(&plain, &node_key().to_bytes()).unwrap();

        let attrs = decrypt_attributes(&encrypted, &node_key()).unwrap();
        assert_eq!(attrs.name(), Some("r\u{e9}sum\u{e9}.pdf"));
        assert_eq!(attrs.get("c"), Some(&json!("AAEC")));
    }

    #[test]
    fn test_aligned_payload_gains_a_block() {
        // "MEGA" + {"n":"abcdefghij"} is 22 bytes; pad to 32.
        let attrs = NodeAttributes::with_name("abcdefghij");
        assert_eq!(encrypt_attributes(&attrs, &node_key()).unwrap().len(), 32);

        // "MEGA" + {"n":"abcdefghijklmnopqrst"} is exactly 32 bytes; pad to 48.
        let attrs = NodeAttributes::with_name("abcdefghijklmnopqrst");
        assert_eq!(encrypt_attributes(&attrs, &node_key()).unwrap().len(), 48);
    }

    #[test]
    fn test_wrong_key_is_absent() {
        let attrs = NodeAttributes::with_name("secret.txt");
        let encrypted = encrypt_attributes(&attrs, &node_key()).unwrap();
        assert_eq!(decrypt_attributes(&encrypted, &Key128::new([1, 2, 3, 4])), None);
    }

    #[test]
    fn test_misaligned_ciphertext_is_absent() {
        assert_eq!(decrypt_attributes(&[0u8; 17], &node_key()), None);
        assert_eq!(decrypt_attributes(&[], &node_key()), None);
    }

    #[test]
    fn test_bad_json_is_absent() {
        let mut plain = b"MEGA{\"n\":".to_vec();
        plain.resize(16, 0);
        let encrypted = cbc_encrypt(&plain, &node_key().to_bytes()).unwrap();
        assert_eq!(decrypt_attributes(&encrypted, &node_key()), None);
    }

    #[test]
    fn test_empty_object_is_absent() {
        // `MEGA{}` lacks the `{"` header and is rejected like a foreign key.
        let mut plain = b"MEGA{}".to_vec();
        plain.resize(16, 0);
        let encrypted = cbc_encrypt(&plain, &node_key().to_bytes()).unwrap();
        assert_eq!(decrypt_attributes(&encrypted, &node_key()), None);
    }
}
