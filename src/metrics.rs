//! Metrics describing training runs and encode/decode passes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fallback::MalformedReason;

/// Aggregate metrics produced by a training session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    /// Number of corpus documents consumed.
    pub documents: usize,
    /// Total word occurrences in the corpus.
    pub total_words: usize,
    /// Distinct normalized words in the corpus.
    pub distinct_words: usize,
    /// Words that received a symbolic token.
    pub assigned: usize,
    /// Word occurrences covered by the codebook.
    pub covered_words: usize,
    /// Wall time spent training.
    pub total_duration: Duration,
    /// Resident set size sample captured from `/proc/self/status` on Linux.
    pub rss_kb: Option<usize>,
}

impl TrainingMetrics {
    /// Fraction of corpus word occurrences that encode to symbols.
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.total_words == 0 {
            0.0
        } else {
            self.covered_words as f64 / self.total_words as f64
        }
    }
}

/// Counts of the units written by one encode call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodeStats {
    /// Words replaced by codebook symbols.
    pub symbols: usize,
    /// Symbols that carry a casing hint.
    pub case_hints: usize,
    /// Fallback blocks written (unknown words and escaped punctuation).
    pub fallback_blocks: usize,
    /// Punctuation passed through literally.
    pub literals: usize,
    /// Line breaks kept.
    pub line_breaks: usize,
    /// Structure markers inserted.
    pub markers: usize,
}

/// A recoverable problem met while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeIssue {
    /// A fallback block failed verification and was emitted verbatim.
    MalformedFallbackBlock {
        /// Byte offset of the opening bracket in the input.
        offset: usize,
        /// Raw block text as emitted.
        raw: String,
        /// Why the block was rejected.
        reason: MalformedReason,
    },
    /// A symbolic token absent from the codebook was emitted unchanged.
    UnknownSymbol {
        /// Byte offset of the unit in the input.
        offset: usize,
        /// The unit as it appeared, hint included.
        token: String,
    },
}

/// Summary of one decode call. Decoding never fails; problems end up here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Symbols resolved through the codebook.
    pub symbols_resolved: usize,
    /// Fallback blocks reconstructed exactly.
    pub fallback_blocks: usize,
    /// Structure markers dropped.
    pub markers_dropped: usize,
    /// Literal units passed through.
    pub literals: usize,
    /// Problems encountered, in input order.
    pub issues: Vec<DecodeIssue>,
}

impl DecodeReport {
    /// Number of malformed fallback blocks.
    #[must_use]
    pub fn malformed_blocks(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, DecodeIssue::MalformedFallbackBlock { .. }))
            .count()
    }

    /// Number of unknown symbols.
    #[must_use]
    pub fn unknown_symbols(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, DecodeIssue::UnknownSymbol { .. }))
            .count()
    }

    /// Returns `true` when every unit decoded cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(target_os = "linux")]
fn current_rss_kb() -> Option<usize> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open("/proc/self/status").ok()?;
    for line in BufReader::new(file).lines().map_while(Result::ok) {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let value = rest
                .split_whitespace()
                .find_map(|part| part.parse::<usize>().ok());
            return value;
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn current_rss_kb() -> Option<usize> {
    None
}

/// Samples the current resident set size (RSS) on supported platforms.
pub fn sample_rss_kb() -> Option<usize> {
    current_rss_kb()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_handles_empty_corpus() {
        let metrics = TrainingMetrics {
            documents: 0,
            total_words: 0,
            distinct_words: 0,
            assigned: 0,
            covered_words: 0,
            total_duration: Duration::ZERO,
            rss_kb: None,
        };
        assert_eq!(metrics.coverage(), 0.0);
    }

    #[test]
    fn report_counts_issue_kinds() {
        let report = DecodeReport {
            issues: vec![
                DecodeIssue::UnknownSymbol {
                    offset: 0,
                    token: "Δ1".into(),
                },
                DecodeIssue::MalformedFallbackBlock {
                    offset: 4,
                    raw: "⟦α".into(),
                    reason: MalformedReason::Unterminated,
                },
            ],
            ..DecodeReport::default()
        };
        assert_eq!(report.unknown_symbols(), 1);
        assert_eq!(report.malformed_blocks(), 1);
        assert!(!report.is_clean());
    }
}
