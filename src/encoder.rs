//! Maps plain text to the emergent stream.
//!
//! Units are separated by one space; line breaks are written bare. Words become codebook
//! symbols (with a casing hint when restorable) or fallback blocks, punctuation passes through,
//! and structure markers may be inserted between any two units.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::codebook::Codebook;
use crate::config::EncoderConfig;
use crate::error::Result;
use crate::fallback::encode_block;
use crate::glyphs::{is_reserved_literal, STRUCTURE_MARKERS};
use crate::metrics::EncodeStats;
use crate::tokenizer::{tokenize, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    Text(String),
    LineBreak,
}

/// Encoder bound to a codebook and a validated [`EncoderConfig`].
#[derive(Debug, Clone)]
pub struct Encoder<'a> {
    codebook: &'a Codebook,
    cfg: EncoderConfig,
}

/// Encodes `text` with `codebook`, inserting markers with probability `structure` using a
/// generator seeded with `seed`.
///
/// Fails only when `structure` is not a probability.
pub fn encode(text: &str, codebook: &Codebook, structure: f64, seed: u64) -> Result<String> {
    Ok(encode_with_stats(text, codebook, structure, seed)?.0)
}

/// Like [`encode`], also returning unit counts.
pub fn encode_with_stats(
    text: &str,
    codebook: &Codebook,
    structure: f64,
    seed: u64,
) -> Result<(String, EncodeStats)> {
    let encoder = Encoder::new(codebook, EncoderConfig::new(structure, seed)?);
    Ok(encoder.encode_with_stats(text))
}

impl<'a> Encoder<'a> {
    /// Creates an encoder. The configuration is expected to be validated.
    #[must_use]
    pub fn new(codebook: &'a Codebook, cfg: EncoderConfig) -> Self {
        Self { codebook, cfg }
    }

    /// Returns the encoder configuration.
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.cfg
    }

    /// Encodes `text`.
    #[must_use]
    pub fn encode(&self, text: &str) -> String {
        self.encode_with_stats(text).0
    }

    /// Encodes `text`, also returning unit counts.
    #[must_use]
    pub fn encode_with_stats(&self, text: &str) -> (String, EncodeStats) {
        let mut stats = EncodeStats::default();
        let mut units = Vec::new();
        for token in tokenize(text) {
            self.push_token(&token, &mut units, &mut stats);
        }
        let output = self.join(units, &mut stats);
        (output, stats)
    }

    fn push_token(&self, token: &Token, units: &mut Vec<Unit>, stats: &mut EncodeStats) {
        match token.kind() {
            TokenKind::Word => match self.codebook.token_for(token.normalized()) {
                Some(symbol) => {
                    let mut unit = String::with_capacity(symbol.len() + 3);
                    if let Some(hint) = token.casing().hint() {
                        unit.push(hint.glyph());
                        stats.case_hints += 1;
                    }
                    unit.push_str(symbol);
                    stats.symbols += 1;
                    units.push(Unit::Text(unit));
                }
                None => {
                    stats.fallback_blocks += 1;
                    units.push(Unit::Text(encode_block(token.text())));
                }
            },
            TokenKind::Punctuation => {
                if token.text().chars().any(is_reserved_literal) {
                    stats.fallback_blocks += 1;
                    units.push(Unit::Text(encode_block(token.text())));
                } else {
                    stats.literals += 1;
                    units.push(Unit::Text(token.text().to_owned()));
                }
            }
            TokenKind::Whitespace => {
                for _ in 0..token.line_breaks() {
                    stats.line_breaks += 1;
                    units.push(Unit::LineBreak);
                }
            }
        }
    }

    fn join(&self, units: Vec<Unit>, stats: &mut EncodeStats) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(self.cfg.seed);
        let mut out = String::new();
        for (idx, unit) in units.into_iter().enumerate() {
            if idx > 0 && rng.gen_bool(self.cfg.structure) {
                let marker = STRUCTURE_MARKERS[rng.gen_range(0..STRUCTURE_MARKERS.len() as u32) as usize];
                push_text(&mut out, marker);
                stats.markers += 1;
            }
            match unit {
                Unit::Text(text) => push_text(&mut out, &text),
                Unit::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

fn push_text(out: &mut String, text: &str) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push(' ');
    }
    out.push_str(text);
}
