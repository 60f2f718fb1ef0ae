//! Parses the emergent stream back into text.
//!
//! The scanner has two states. While scanning, `⟦` enters a fallback block, line feeds become
//! line breaks, other whitespace separates units, and anything else accumulates into a bare
//! unit. Inside a block, `⟧` closes it; whitespace, a nested `⟦`, or end of input leave the
//! block as malformed and its raw span is emitted unchanged. Decoding never fails.

use log::trace;

use crate::codebook::Codebook;
use crate::fallback::{decode_block, MalformedReason};
use crate::glyphs::{is_structure_marker, parse_symbol, BLOCK_CLOSE, BLOCK_OPEN};
use crate::metrics::{DecodeIssue, DecodeReport};

const CLOSING_PUNCTUATION: &[&str] = &[
    ".", ",", "!", "?", ";", ":", ")", "]", "}", "%", "»", "…", "”", "’", "›",
];
const OPENING_PUNCTUATION: &[&str] = &["(", "[", "{", "«", "¿", "¡", "“", "‘", "„", "‚", "‹"];

/// Decodes `emergent_text` with `codebook`.
#[must_use]
pub fn decode(emergent_text: &str, codebook: &Codebook) -> String {
    decode_with_report(emergent_text, codebook).0
}

/// Decodes `emergent_text`, also reporting malformed blocks and unknown symbols.
#[must_use]
pub fn decode_with_report(emergent_text: &str, codebook: &Codebook) -> (String, DecodeReport) {
    let mut scanner = Scanner::new(codebook, emergent_text);
    scanner.run();
    let text = join_pieces(&scanner.pieces);
    (text, scanner.report)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Word(String),
    Punct(String),
    LineBreak,
}

impl Piece {
    fn from_text(text: String) -> Self {
        if text.chars().next().is_some_and(char::is_alphanumeric) {
            Self::Word(text)
        } else {
            Self::Punct(text)
        }
    }

    fn is_opening(&self) -> bool {
        matches!(self, Self::Punct(text) if OPENING_PUNCTUATION.contains(&text.as_str()))
    }

    fn is_closing(&self) -> bool {
        matches!(self, Self::Punct(text) if CLOSING_PUNCTUATION.contains(&text.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    InFallbackBlock { start: usize },
}

struct Scanner<'a> {
    codebook: &'a Codebook,
    input: &'a str,
    state: State,
    bare_start: Option<usize>,
    pieces: Vec<Piece>,
    report: DecodeReport,
}

impl<'a> Scanner<'a> {
    fn new(codebook: &'a Codebook, input: &'a str) -> Self {
        Self {
            codebook,
            input,
            state: State::Scanning,
            bare_start: None,
            pieces: Vec::new(),
            report: DecodeReport::default(),
        }
    }

    fn run(&mut self) {
        let input = self.input;
        for (idx, ch) in input.char_indices() {
            if let State::InFallbackBlock { start } = self.state {
                if ch == BLOCK_CLOSE {
                    let end = idx + ch.len_utf8();
                    self.finish_block(start, end);
                    self.state = State::Scanning;
                    continue;
                }
                if !(ch.is_whitespace() || ch == BLOCK_OPEN) {
                    continue;
                }
                self.malformed(start, idx, MalformedReason::Unterminated);
                self.state = State::Scanning;
            }
            self.scan(idx, ch);
        }
        match self.state {
            State::InFallbackBlock { start } => {
                self.malformed(start, input.len(), MalformedReason::Unterminated);
            }
            State::Scanning => self.flush_bare(input.len()),
        }
    }

    fn scan(&mut self, idx: usize, ch: char) {
        if ch == BLOCK_OPEN {
            self.flush_bare(idx);
            self.state = State::InFallbackBlock { start: idx };
        } else if ch == '\n' {
            self.flush_bare(idx);
            self.pieces.push(Piece::LineBreak);
        } else if ch.is_whitespace() {
            self.flush_bare(idx);
        } else if self.bare_start.is_none() {
            self.bare_start = Some(idx);
        }
    }

    fn flush_bare(&mut self, end: usize) {
        let Some(start) = self.bare_start.take() else {
            return;
        };
        let input = self.input;
        let unit = &input[start..end];
        if is_structure_marker(unit) {
            self.report.markers_dropped += 1;
            return;
        }
        if let Some(parts) = parse_symbol(unit) {
            match self.codebook.word_for(parts.token) {
                Some(word) => {
                    let word = match parts.hint {
                        Some(hint) => hint.apply(word),
                        None => word.to_owned(),
                    };
                    self.report.symbols_resolved += 1;
                    self.pieces.push(Piece::Word(word));
                }
                None => {
                    trace!("unknown symbol {unit:?} at byte {start}");
                    self.report.issues.push(DecodeIssue::UnknownSymbol {
                        offset: start,
                        token: unit.to_owned(),
                    });
                    self.pieces.push(Piece::Word(unit.to_owned()));
                }
            }
            return;
        }
        self.report.literals += 1;
        self.pieces.push(Piece::from_text(unit.to_owned()));
    }

    fn finish_block(&mut self, start: usize, end: usize) {
        let input = self.input;
        let raw = &input[start..end];
        let inner = &raw[BLOCK_OPEN.len_utf8()..raw.len() - BLOCK_CLOSE.len_utf8()];
        match decode_block(inner) {
            Ok(text) => {
                self.report.fallback_blocks += 1;
                self.pieces.push(Piece::from_text(text));
            }
            Err(reason) => self.malformed(start, end, reason),
        }
    }

    fn malformed(&mut self, start: usize, end: usize, reason: MalformedReason) {
        let raw = self.input[start..end].to_owned();
        trace!("malformed fallback block at byte {start}: {reason}");
        self.report.issues.push(DecodeIssue::MalformedFallbackBlock {
            offset: start,
            raw: raw.clone(),
            reason,
        });
        self.pieces.push(Piece::Word(raw));
    }
}

fn join_pieces(pieces: &[Piece]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Piece> = None;
    for piece in pieces {
        let text = match piece {
            Piece::LineBreak => {
                out.push('\n');
                previous = None;
                continue;
            }
            Piece::Word(text) | Piece::Punct(text) => text,
        };
        let spaced = previous.is_some_and(|prev| !prev.is_opening()) && !piece.is_closing();
        if spaced {
            out.push(' ');
        }
        out.push_str(text);
        previous = Some(piece);
    }
    out
}
