//! Server key codec.
//!
//! The server publishes its VAPID public key as URL-safe base64 with
//! no guaranteed padding; the push platform wants raw bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::NotifyError;

/// Decode a URL-safe base64 server key into raw bytes.
///
/// Pads to a multiple of 4 and maps the URL-safe alphabet back to
/// standard base64 before decoding. Pure; malformed input surfaces as
/// a decode error rather than truncated output.
pub fn decode_server_key(key: &str) -> Result<Vec<u8>, NotifyError> {
    let padding = (4 - key.len() % 4) % 4;
    let mut normalized = String::with_capacity(key.len() + padding);
    for c in key.chars() {
        normalized.push(match c {
            '-' => '+',
            '_' => '/',
            other => other,
        });
    }
    for _ in 0..padding {
        normalized.push('=');
    }
    Ok(STANDARD.decode(normalized)?)
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

    use super::*;

    #[test]
    fn decodes_unpadded_url_safe_input() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let encoded = URL_SAFE_NO_PAD.encode(&raw);
        assert_eq!(decode_server_key(&encoded).unwrap(), raw);
    }

    #[test]
    fn decodes_padded_url_safe_input() {
        let raw = b"vapid public key material".to_vec();
        let encoded = URL_SAFE.encode(&raw);
        assert_eq!(decode_server_key(&encoded).unwrap(), raw);
    }

    #[test]
    fn inverts_server_encoding_for_all_padding_lengths() {
        // Lengths chosen so the encoded form needs 0, 1 and 2 pad chars.
        for len in [3usize, 4, 5, 31, 32, 33, 65] {
            let raw: Vec<u8> = (0..len).map(|i| (i * 7 + 13) as u8).collect();
            let encoded = URL_SAFE_NO_PAD.encode(&raw);
            assert_eq!(decode_server_key(&encoded).unwrap(), raw, "len {len}");
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode_server_key("not*base64!").is_err());
    }
}
