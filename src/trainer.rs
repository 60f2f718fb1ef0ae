//! Codebook construction: word frequencies and deterministic symbol assignment.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::codebook::{Codebook, CodebookEntry};
use crate::config::{IngestConfig, TrainerBuilder, TrainerConfig};
use crate::corpus::load_text_corpus;
use crate::error::Result;
use crate::glyphs::{GREEK_LOWER, GREEK_UPPER, OPERATORS};
use crate::metrics::{sample_rss_kb, TrainingMetrics};
use crate::tokenizer::words;

/// Width of the numeric suffix interval reserved for each rank.
const SUFFIX_SPREAD: u32 = 10;

/// High-level façade configuring and executing codebook training.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
}

/// Artifacts returned after a training session completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    /// Trained codebook.
    pub codebook: Codebook,
    /// Metrics captured during training.
    pub metrics: TrainingMetrics,
}

/// Trains a codebook from a single corpus string.
///
/// The same `(corpus_text, vocab_size, seed)` always yields an identical codebook.
pub fn train(corpus_text: &str, vocab_size: usize, seed: u64) -> Result<Codebook> {
    let cfg = TrainerConfig::builder()
        .vocab_size(vocab_size)
        .seed(seed)
        .show_progress(false)
        .build()?;
    Ok(Trainer::new(cfg).train_from_text(corpus_text)?.codebook)
}

impl Trainer {
    /// Creates a new trainer for the supplied configuration.
    #[must_use]
    pub fn new(cfg: TrainerConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`TrainerBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Trains by loading text files from disk according to [`IngestConfig`].
    pub fn train_from_paths<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        ingest: &IngestConfig,
    ) -> Result<TrainerArtifacts> {
        let documents = load_text_corpus(inputs, ingest)?;
        self.train_from_documents(&documents)
    }

    /// Trains from one in-memory corpus string.
    pub fn train_from_text(&self, corpus_text: &str) -> Result<TrainerArtifacts> {
        self.train_from_documents(&[corpus_text])
    }

    /// Trains from in-memory documents. Frequencies are summed across documents.
    pub fn train_from_documents<S>(&self, documents: &[S]) -> Result<TrainerArtifacts>
    where
        S: AsRef<str> + Sync,
    {
        self.cfg.validate()?;
        let start = Instant::now();

        let frequencies = count_words(documents);
        let total_words: usize = frequencies.values().sum();
        let distinct_words = frequencies.len();
        debug!(
            "counted {total_words} words ({distinct_words} distinct) in {} documents",
            documents.len()
        );

        let ranked = rank_words(frequencies, self.cfg.min_frequency, self.cfg.vocab_size);
        let tokens = assign_tokens(ranked.len(), self.cfg.seed);
        let covered_words = ranked.iter().map(|(_, freq)| freq).sum();
        let entries = ranked
            .into_iter()
            .zip(tokens)
            .map(|((word, frequency), token)| CodebookEntry {
                word,
                token,
                frequency,
            })
            .collect::<Vec<_>>();
        let assigned = entries.len();
        let codebook = Codebook::from_entries(self.cfg.vocab_size, self.cfg.seed, entries)?;

        let metrics = TrainingMetrics {
            documents: documents.len(),
            total_words,
            distinct_words,
            assigned,
            covered_words,
            total_duration: start.elapsed(),
            rss_kb: sample_rss_kb(),
        };

        if self.cfg.show_progress {
            info!(
                "symbolized {} of {} distinct words (requested {}), coverage {:.1}% in {:.2?}",
                assigned,
                distinct_words,
                self.cfg.vocab_size,
                metrics.coverage() * 100.0,
                metrics.total_duration
            );
        }

        Ok(TrainerArtifacts { codebook, metrics })
    }
}

fn count_words<S>(documents: &[S]) -> FxHashMap<String, usize>
where
    S: AsRef<str> + Sync,
{
    documents
        .par_iter()
        .map(|document| {
            let mut local = FxHashMap::default();
            for word in words(document.as_ref()) {
                *local.entry(word).or_insert(0) += 1;
            }
            local
        })
        .reduce(FxHashMap::default, |mut acc, local| {
            for (word, count) in local {
                *acc.entry(word).or_insert(0) += count;
            }
            acc
        })
}

/// Orders words by frequency descending then word ascending, a total order independent of
/// hash iteration order, and keeps the top `limit` at or above `min_frequency`.
fn rank_words(
    frequencies: FxHashMap<String, usize>,
    min_frequency: usize,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = frequencies
        .into_iter()
        .filter(|(_, freq)| *freq >= min_frequency)
        .collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Draws `count` symbolic tokens from a generator seeded with `seed`.
///
/// The suffix of rank `r` lies in `[r * 10, r * 10 + 10)`, so tokens never collide even when
/// heads and middles repeat.
pub(crate) fn assign_tokens(count: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|rank| symbol_for_rank(rank, &mut rng))
        .collect()
}

fn symbol_for_rank<R: Rng + ?Sized>(rank: usize, rng: &mut R) -> String {
    let heads = (GREEK_UPPER.len() + GREEK_LOWER.len()) as u32;
    let head_idx = rng.gen_range(0..heads) as usize;
    let head = GREEK_UPPER
        .get(head_idx)
        .copied()
        .unwrap_or_else(|| GREEK_LOWER[head_idx - GREEK_UPPER.len()]);
    let middle = match rng.gen_range(0..3u32) {
        0 => None,
        1 => Some(OPERATORS[rng.gen_range(0..OPERATORS.len() as u32) as usize]),
        _ => Some(GREEK_LOWER[rng.gen_range(0..GREEK_LOWER.len() as u32) as usize]),
    };
    let suffix = rank as u64 * u64::from(SUFFIX_SPREAD) + u64::from(rng.gen_range(0..SUFFIX_SPREAD));

    let mut token = String::with_capacity(12);
    token.push(head);
    if let Some(middle) = middle {
        token.push(middle);
    }
    token.push_str(&suffix.to_string());
    token
}

impl fmt::Display for TrainerArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Codebook with {} of {} requested entries",
            self.codebook.len(),
            self.codebook.vocab_size()
        )?;
        writeln!(f, "Coverage: {:.1}%", self.metrics.coverage() * 100.0)?;
        writeln!(f, "Total duration: {:?}", self.metrics.total_duration)?;
        Ok(())
    }
}
