//! Image decoding: data-URI string → raw image bytes.
//!
//! The OCR service returns each extracted image as
//! `data:image/jpeg;base64,<payload>`. Only the text after the first comma
//! is meaningful; the metadata prefix is ignored and no format sniffing is
//! done, so the bytes are persisted exactly as the service encoded them.

use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Decode the base64 payload of a `<metadata>,<base64>` string.
///
/// # Errors
/// * [`DecodeError::MissingSeparator`] — no comma in `encoded`
/// * [`DecodeError::Base64`] — the payload is not standard (padded) base64
pub fn decode_image_payload(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let (_, payload) = encoded
        .split_once(',')
        .ok_or(DecodeError::MissingSeparator)?;

    let bytes = STANDARD.decode(payload)?;
    debug!("Decoded {} base64 chars → {} bytes", payload.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_payload_after_prefix() {
        let bytes = decode_image_payload("data:image/png;base64,AAAA").expect("valid");
        assert_eq!(bytes, STANDARD.decode("AAAA").unwrap());
        assert_eq!(bytes, vec![0, 0, 0]);
    }

    #[test]
    fn png_signature() {
        let bytes = decode_image_payload("data:image/png;base64,iVBORw0KGgo=").expect("valid");
        assert_eq!(bytes, b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn prefix_is_not_interpreted() {
        // A JPEG payload labelled as anything decodes the same way.
        let a = decode_image_payload("data:image/jpeg;base64,/9j/4A==").unwrap();
        let b = decode_image_payload("whatever,/9j/4A==").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_payload_is_empty_file() {
        assert!(decode_image_payload("data:image/png;base64,").unwrap().is_empty());
    }

    #[test]
    fn missing_comma_is_an_error() {
        let err = decode_image_payload("iVBORw0KGgo=").unwrap_err();
        assert!(matches!(err, DecodeError::MissingSeparator));
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let err = decode_image_payload("data:image/png;base64,not*base64!").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn second_comma_belongs_to_payload() {
        // Everything after the first comma is payload; a stray comma makes it invalid.
        let err = decode_image_payload("data:image/png;base64,AAAA,AAAA").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }
}
