//! Fixed glyph inventories and the grammar of symbolic tokens.
//!
//! A symbolic token has the shape `<head><middle>?<digits>` where `head` is one of the 48
//! Greek letters, `middle` is an optional operator glyph or lowercase Greek letter, and
//! `digits` is a non-empty ASCII decimal suffix. Tokens may carry a leading casing hint.

use std::sync::OnceLock;

use ahash::AHashSet;

/// Uppercase Greek letters usable as token heads.
pub const GREEK_UPPER: [char; 24] = [
    'Α', 'Β', 'Γ', 'Δ', 'Ε', 'Ζ', 'Η', 'Θ', 'Ι', 'Κ', 'Λ', 'Μ', 'Ν', 'Ξ', 'Ο', 'Π', 'Ρ', 'Σ', 'Τ',
    'Υ', 'Φ', 'Χ', 'Ψ', 'Ω',
];

/// Lowercase Greek letters usable as token heads and middles.
pub const GREEK_LOWER: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

/// Operator glyphs usable as token middles. Excludes every glyph with syntactic meaning.
pub const OPERATORS: [char; 27] = [
    'Δ', 'Ψ', 'Ω', 'Λ', 'Σ', 'Φ', 'Θ', 'Ξ', 'ζ', 'δ', 'π', 'µ', '∑', '⊕', '⊗', '⊡', '⇒', '⇐', '↔',
    '→', '←', '∵', '≈', '≡', '∝', '∞', '∇',
];

/// Glyph digits used for fallback payloads, indexed by hex nibble value.
pub const HEX_GLYPHS: [char; 16] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π',
];

/// Cosmetic markers inserted between units; dropped on decode.
pub const STRUCTURE_MARKERS: [&str; 3] = ["::", "∴", "⇔"];

/// Opens a fallback block.
pub const BLOCK_OPEN: char = '⟦';
/// Closes a fallback block.
pub const BLOCK_CLOSE: char = '⟧';
/// Separates the payload from the checksum inside a fallback block.
pub const CHECKSUM_SEPARATOR: char = '~';

/// Casing hint carried as a prefix on symbolic tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseHint {
    /// First letter uppercase, remainder lowercase.
    Capitalized,
    /// Every letter uppercase.
    AllCaps,
}

impl CaseHint {
    /// Glyph written in front of the token.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Capitalized => '↑',
            Self::AllCaps => '⇑',
        }
    }

    /// Parses a hint glyph.
    #[must_use]
    pub fn from_glyph(ch: char) -> Option<Self> {
        match ch {
            '↑' => Some(Self::Capitalized),
            '⇑' => Some(Self::AllCaps),
            _ => None,
        }
    }

    /// Re-applies the hint to a lowercased word.
    #[must_use]
    pub fn apply(self, word: &str) -> String {
        match self {
            Self::AllCaps => word.to_uppercase(),
            Self::Capitalized => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Symbolic token split into its optional casing hint and the bare token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolParts<'a> {
    /// Casing hint prefix, if present.
    pub hint: Option<CaseHint>,
    /// Token without the hint, as stored in a codebook.
    pub token: &'a str,
}

fn head_set() -> &'static AHashSet<char> {
    static HEADS: OnceLock<AHashSet<char>> = OnceLock::new();
    HEADS.get_or_init(|| GREEK_UPPER.iter().chain(GREEK_LOWER.iter()).copied().collect())
}

fn middle_set() -> &'static AHashSet<char> {
    static MIDDLES: OnceLock<AHashSet<char>> = OnceLock::new();
    MIDDLES.get_or_init(|| OPERATORS.iter().chain(GREEK_LOWER.iter()).copied().collect())
}

/// Returns `true` when `token` matches the bare symbolic token grammar (no hint).
#[must_use]
pub fn is_symbol_token(token: &str) -> bool {
    let mut chars = token.chars().peekable();
    match chars.next() {
        Some(head) if head_set().contains(&head) => {}
        _ => return false,
    }
    if let Some(&middle) = chars.peek() {
        if !middle.is_ascii_digit() {
            if !middle_set().contains(&middle) {
                return false;
            }
            chars.next();
        }
    }
    let mut digits = 0usize;
    for ch in chars {
        if !ch.is_ascii_digit() {
            return false;
        }
        digits += 1;
    }
    digits > 0
}

/// Splits an emergent unit into hint and token when it is a symbolic token.
#[must_use]
pub fn parse_symbol(unit: &str) -> Option<SymbolParts<'_>> {
    let mut chars = unit.chars();
    let first = chars.next()?;
    let (hint, token) = match CaseHint::from_glyph(first) {
        Some(hint) => (Some(hint), chars.as_str()),
        None => (None, unit),
    };
    is_symbol_token(token).then_some(SymbolParts { hint, token })
}

/// Returns `true` for exact structure marker units.
#[must_use]
pub fn is_structure_marker(unit: &str) -> bool {
    STRUCTURE_MARKERS.contains(&unit)
}

/// Returns `true` for punctuation that must be escaped because it has meaning in the stream.
#[must_use]
pub fn is_reserved_literal(ch: char) -> bool {
    matches!(ch, BLOCK_OPEN | BLOCK_CLOSE | '∴' | '⇔')
}

/// Maps a hex nibble (0..16) to its glyph digit.
#[must_use]
pub fn nibble_glyph(nibble: u8) -> char {
    HEX_GLYPHS[usize::from(nibble & 0x0F)]
}

/// Maps a glyph digit back to its lowercase ASCII hex digit.
#[must_use]
pub fn glyph_hex_digit(ch: char) -> Option<char> {
    HEX_GLYPHS
        .iter()
        .position(|&glyph| glyph == ch)
        .and_then(|idx| char::from_digit(idx as u32, 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_grammar_accepts_expected_shapes() {
        assert!(is_symbol_token("Δ7"));
        assert!(is_symbol_token("β⊕13"));
        assert!(is_symbol_token("Ωδ140"));
        assert!(!is_symbol_token("Δ"));
        assert!(!is_symbol_token("Δ⊕"));
        assert!(!is_symbol_token("Δ∴3"));
        assert!(!is_symbol_token("a12"));
        assert!(!is_symbol_token("Δ12x"));
        assert!(!is_symbol_token(""));
    }

    #[test]
    fn parse_symbol_splits_hint() {
        let parts = parse_symbol("↑Λ→42").expect("hinted symbol");
        assert_eq!(parts.hint, Some(CaseHint::Capitalized));
        assert_eq!(parts.token, "Λ→42");
        let parts = parse_symbol("γ5").expect("plain symbol");
        assert_eq!(parts.hint, None);
        assert!(parse_symbol("⇑").is_none());
        assert!(parse_symbol("::").is_none());
    }

    #[test]
    fn syntax_glyphs_are_not_token_material() {
        for marker in STRUCTURE_MARKERS {
            for ch in marker.chars() {
                assert!(!OPERATORS.contains(&ch));
            }
        }
        for ch in [BLOCK_OPEN, BLOCK_CLOSE, CHECKSUM_SEPARATOR, '↑', '⇑'] {
            assert!(!OPERATORS.contains(&ch));
            assert!(!head_set().contains(&ch));
        }
    }

    #[test]
    fn hex_glyphs_round_trip() {
        for nibble in 0u8..16 {
            let glyph = nibble_glyph(nibble);
            let digit = glyph_hex_digit(glyph).expect("known glyph");
            assert_eq!(digit.to_digit(16), Some(u32::from(nibble)));
        }
        assert_eq!(glyph_hex_digit('ρ'), None);
    }

    #[test]
    fn case_hints_restore_case() {
        assert_eq!(CaseHint::Capitalized.apply("the"), "The");
        assert_eq!(CaseHint::AllCaps.apply("nasa"), "NASA");
        assert_eq!(CaseHint::Capitalized.apply(""), "");
    }
}
