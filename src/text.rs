//! Byte-to-text decoding for inputs of unknown encoding.
//!
//! Codec functions operate on `&str`; everything read from disk or stdin passes through
//! [`decode_bytes`] first so BOMs and UTF-16 never reach the scanner.

use bstr::ByteSlice;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Encoding detected by [`decode_bytes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextEncoding {
    /// Plain UTF-8.
    Utf8,
    /// UTF-8 preceded by a byte-order mark.
    Utf8Bom,
    /// UTF-16 little endian (with or without BOM).
    Utf16Le,
    /// UTF-16 big endian (with or without BOM).
    Utf16Be,
    /// Nothing matched; invalid UTF-8 sequences were replaced with U+FFFD.
    Lossy,
}

/// Decodes `bytes` trying, in order: BOM-tagged encodings, UTF-8, UTF-16 LE, UTF-16 BE, and
/// finally lossy UTF-8.
#[must_use]
pub fn decode_bytes(bytes: &[u8]) -> (String, TextEncoding) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        if let Ok(text) = std::str::from_utf8(rest) {
            return (text.to_owned(), TextEncoding::Utf8Bom);
        }
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        if let Some(text) = decode_utf16(rest, u16::from_le_bytes) {
            return (text, TextEncoding::Utf16Le);
        }
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        if let Some(text) = decode_utf16(rest, u16::from_be_bytes) {
            return (text, TextEncoding::Utf16Be);
        }
    }
    let utf8 = std::str::from_utf8(bytes).ok();
    // ASCII text in BOM-less UTF-16 is also valid UTF-8, but full of NULs.
    if let Some(text) = utf8.filter(|text| !text.contains('\0')) {
        return (text.to_owned(), TextEncoding::Utf8);
    }
    if let Some(text) = decode_utf16(bytes, u16::from_le_bytes) {
        return (text, TextEncoding::Utf16Le);
    }
    if let Some(text) = decode_utf16(bytes, u16::from_be_bytes) {
        return (text, TextEncoding::Utf16Be);
    }
    match utf8 {
        Some(text) => (text.to_owned(), TextEncoding::Utf8),
        None => (bytes.to_str_lossy().into_owned(), TextEncoding::Lossy),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .ok()
        .filter(|text| !text.contains('\0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str, little_endian: bool, bom: bool) -> Vec<u8> {
        let mut out = Vec::new();
        if bom {
            out.extend_from_slice(if little_endian { UTF16_LE_BOM } else { UTF16_BE_BOM });
        }
        for unit in text.encode_utf16() {
            let bytes = if little_endian {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            out.extend_from_slice(&bytes);
        }
        out
    }

    #[test]
    fn plain_utf8_passes_through() {
        assert_eq!(
            decode_bytes("⟦αβ~00⟧ Δ3".as_bytes()),
            ("⟦αβ~00⟧ Δ3".to_owned(), TextEncoding::Utf8)
        );
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("hello".as_bytes());
        assert_eq!(
            decode_bytes(&bytes),
            ("hello".to_owned(), TextEncoding::Utf8Bom)
        );
    }

    #[test]
    fn utf16_with_bom_is_detected() {
        let text = "Ωμέγα ∴ test";
        assert_eq!(
            decode_bytes(&utf16(text, true, true)),
            (text.to_owned(), TextEncoding::Utf16Le)
        );
        assert_eq!(
            decode_bytes(&utf16(text, false, true)),
            (text.to_owned(), TextEncoding::Utf16Be)
        );
    }

    #[test]
    fn utf16_le_without_bom_is_detected() {
        let text = "plain words";
        assert_eq!(
            decode_bytes(&utf16(text, true, false)),
            (text.to_owned(), TextEncoding::Utf16Le)
        );
    }

    #[test]
    fn garbage_falls_back_to_lossy() {
        let (text, encoding) = decode_bytes(&[b'a', 0xFF, b'b']);
        assert_eq!(encoding, TextEncoding::Lossy);
        assert_eq!(text, "a\u{FFFD}b");
    }
}
