//! a32 word arrays, the service's base64url flavour, and Latin-1 text
//!
//! Keys and handles travel as big-endian 32-bit word arrays ("a32") encoded
//! with unpadded URL-safe base64. Both layouts are part of the wire format and
//! are reproduced exactly.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::error::{CryptoError, CryptoResult};

/// Standard-alphabet decoder that tolerates non-zero trailing bits. Padding
/// must be canonical; it is always reconstructed from the raw input length.
const PADDED_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Reinterpret `buf` as big-endian `u32` words, zero-padding the tail to a
/// 4-byte boundary.
pub fn bytes_to_words(buf: &[u8]) -> Vec<u32> {
    buf.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .collect()
}

/// Serialize `words` big-endian. The output is always `4 * words.len()` bytes;
/// trailing zero bytes are kept.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Decode the service's base64url variant.
///
/// Padding is reconstructed from the input length before substitution, `-`
/// and `_` map back to `+` and `/`, and commas are dropped. Commas count
/// towards the length, so `"AAA,"` gets no padding and is rejected.
pub fn base64_url_decode(s: &str) -> CryptoResult<Vec<u8>> {
    let mut data = String::with_capacity(s.len() + 2);
    data.push_str(s);
    data.push_str(synthetic_padding(s.len()));

    let data: String = data
        .chars()
        .filter(|&c| c != ',')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    Ok(PADDED_STANDARD.decode(data)?)
}

/// `"=="[(2 - 3 * len) mod 4 ..]`
fn synthetic_padding(len: usize) -> &'static str {
    match len % 4 {
        2 => "==",
        3 => "=",
        _ => "",
    }
}

/// Standard base64 with `+`/`/` replaced by `-`/`_` and `=` dropped.
pub fn base64_url_encode(buf: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn base64_to_words(s: &str) -> CryptoResult<Vec<u32>> {
    Ok(bytes_to_words(&base64_url_decode(s)?))
}

pub fn words_to_base64(words: &[u32]) -> String {
    base64_url_encode(&words_to_bytes(words))
}

/// Encode text one byte per character. Characters above U+00FF are rejected.
pub fn latin1_to_bytes(s: &str) -> CryptoResult<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| CryptoError::NotLatin1(c)))
        .collect()
}

pub fn bytes_to_latin1(buf: &[u8]) -> String {
    buf.iter().map(|&b| char::from(b)).collect()
}
