//! Reversible escape blocks for words missing from the codebook.
//!
//! A block is `⟦<payload>~<cc>⟧`: the UTF-8 bytes of the surface text as hex, each hex digit
//! written as a glyph digit, followed by a CRC-8 of the ASCII hex payload. CRC-8 catches every
//! burst of up to eight flipped bits, so replacing any single payload digit is always detected.

use thiserror::Error;

use crate::glyphs::{glyph_hex_digit, nibble_glyph, BLOCK_CLOSE, BLOCK_OPEN, CHECKSUM_SEPARATOR};

const CRC8_POLY: u8 = 0x07;

/// Reason a fallback block could not be reconstructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// Input ended (or whitespace/another block began) before the closing bracket.
    #[error("unterminated block")]
    Unterminated,
    /// No `~cc` suffix was present.
    #[error("missing checksum")]
    MissingChecksum,
    /// The suffix was not two hex digits.
    #[error("checksum `{0}` is not two hex digits")]
    InvalidChecksum(String),
    /// The payload contained a character outside the glyph digit alphabet.
    #[error("unknown payload glyph {0:?}")]
    UnknownGlyph(char),
    /// The recorded checksum does not match the payload.
    #[error("checksum mismatch: expected {expected:02x}, found {found:02x}")]
    ChecksumMismatch {
        /// Checksum computed from the payload.
        expected: u8,
        /// Checksum written in the block.
        found: u8,
    },
    /// The payload was empty.
    #[error("empty payload")]
    EmptyPayload,
    /// The payload had an odd number of hex digits.
    #[error("payload does not decode to whole bytes")]
    OddLength,
    /// The payload bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// CRC-8 (polynomial 0x07, initial value 0) over `data`.
#[must_use]
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| {
        (0..8).fold(crc ^ byte, |acc, _| {
            if acc & 0x80 != 0 {
                (acc << 1) ^ CRC8_POLY
            } else {
                acc << 1
            }
        })
    })
}

/// Encodes `surface` as a complete fallback block, brackets included.
#[must_use]
pub fn encode_block(surface: &str) -> String {
    let hex_payload = hex::encode(surface.as_bytes());
    let mut block = String::with_capacity(hex_payload.len() * 2 + 8);
    block.push(BLOCK_OPEN);
    for digit in hex_payload.chars() {
        let nibble = digit.to_digit(16).unwrap_or(0) as u8;
        block.push(nibble_glyph(nibble));
    }
    block.push(CHECKSUM_SEPARATOR);
    block.push_str(&format!("{:02x}", crc8(hex_payload.as_bytes())));
    block.push(BLOCK_CLOSE);
    block
}

/// Verifies and decodes the inside of a block (the text between the brackets).
pub fn decode_block(inner: &str) -> Result<String, MalformedReason> {
    let (payload, checksum) = inner
        .rsplit_once(CHECKSUM_SEPARATOR)
        .ok_or(MalformedReason::MissingChecksum)?;
    if checksum.len() != 2 || !checksum.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MalformedReason::InvalidChecksum(checksum.to_owned()));
    }
    let found = u8::from_str_radix(checksum, 16)
        .map_err(|_| MalformedReason::InvalidChecksum(checksum.to_owned()))?;

    let hex_payload = payload
        .chars()
        .map(|glyph| glyph_hex_digit(glyph).ok_or(MalformedReason::UnknownGlyph(glyph)))
        .collect::<Result<String, _>>()?;
    let expected = crc8(hex_payload.as_bytes());
    if expected != found {
        return Err(MalformedReason::ChecksumMismatch { expected, found });
    }
    if hex_payload.is_empty() {
        return Err(MalformedReason::EmptyPayload);
    }
    if hex_payload.len() % 2 != 0 {
        return Err(MalformedReason::OddLength);
    }
    let bytes = hex::decode(&hex_payload).map_err(|_| MalformedReason::OddLength)?;
    String::from_utf8(bytes).map_err(|_| MalformedReason::InvalidUtf8)
}
