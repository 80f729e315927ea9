//! Base64 helpers for mailbox REST payloads.
//!
//! Mailbox APIs deliver part bodies as URL-safe Base64 (RFC 4648 §5), with or
//! without padding depending on the endpoint.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;

use crate::error::Result;

/// URL-safe engine that accepts both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes data as unpadded URL-safe Base64.
#[must_use]
pub fn encode_base64url(data: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(data)
}

/// Decodes URL-safe Base64 data.
///
/// Embedded line breaks and spaces are ignored. Standard-alphabet characters
/// (`+` and `/`) are accepted as well.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_LENIENT.decode(cleaned).map_err(Into::into)
}

/// Decodes URL-safe Base64 data into text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected; part bodies in
/// legacy charsets still yield something readable.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64url_text(data: &str) -> Result<String> {
    let bytes = decode_base64url(data)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_unpadded() {
        // "Hello?" encodes with a '/' in the standard alphabet
        assert_eq!(decode_base64url_text("SGVsbG8_").unwrap(), "Hello?");
        assert_eq!(decode_base64url_text("SGk").unwrap(), "Hi");
    }

    #[test]
    fn test_decode_padded_and_standard_alphabet() {
        assert_eq!(decode_base64url_text("SGk=").unwrap(), "Hi");
        assert_eq!(decode_base64url_text("SGVsbG8/").unwrap(), "Hello?");
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let encoded = encode_base64url("line one\nline two".as_bytes());
        let (head, tail) = encoded.split_at(6);
        let wrapped = format!("{head}\r\n{tail}");
        assert_eq!(decode_base64url_text(&wrapped).unwrap(), "line one\nline two");
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode_base64url("!!!").is_err());
    }

    #[test]
    fn test_decode_lossy_utf8() {
        let encoded = encode_base64url(&[0x48, 0x69, 0xFF]);
        assert_eq!(decode_base64url_text(&encoded).unwrap(), "Hi\u{FFFD}");
    }
}
