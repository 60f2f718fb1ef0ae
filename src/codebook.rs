//! The trained codebook: frequent words mapped to symbolic tokens.

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;

use crate::error::{EmlangError, Result};
use crate::glyphs::is_symbol_token;
use crate::serialization::{codebook_json, save_codebook};
use crate::tokenizer::tokenize;

/// One symbolized word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebookEntry {
    /// Lowercased word.
    pub word: String,
    /// Assigned symbolic token.
    pub token: String,
    /// Corpus frequency recorded at training time (0 when unknown).
    pub frequency: usize,
}

/// Immutable mapping between words and symbolic tokens.
///
/// The reverse lookup is derived at construction and never stored on its own, so a codebook
/// can be shared across threads and used by any number of concurrent encode/decode calls.
#[must_use]
#[derive(Debug, Clone)]
pub struct Codebook {
    vocab_size: usize,
    seed: u64,
    entries: Vec<CodebookEntry>,
    by_word: AHashMap<String, usize>,
    by_token: AHashMap<String, usize>,
}

impl Codebook {
    /// Builds a codebook from entries in rank order, checking every codebook invariant.
    ///
    /// Fails with [`EmlangError::CorruptCodebook`] when a word is not a single normalized word,
    /// a token is not a symbolic token, or the word/token mapping is not a bijection.
    pub fn from_entries(vocab_size: usize, seed: u64, entries: Vec<CodebookEntry>) -> Result<Self> {
        if entries.len() > vocab_size {
            return Err(EmlangError::corrupt(format!(
                "{} entries exceed vocabulary_size {vocab_size}",
                entries.len()
            )));
        }
        let mut by_word = AHashMap::with_capacity(entries.len());
        let mut by_token = AHashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if !is_normalized_word(&entry.word) {
                return Err(EmlangError::corrupt(format!(
                    "`{}` is not a lowercased single word",
                    entry.word
                )));
            }
            if !is_symbol_token(&entry.token) {
                return Err(EmlangError::corrupt(format!(
                    "`{}` (for `{}`) is not a symbolic token",
                    entry.token, entry.word
                )));
            }
            if by_word.insert(entry.word.clone(), idx).is_some() {
                return Err(EmlangError::corrupt(format!(
                    "word `{}` appears twice",
                    entry.word
                )));
            }
            if let Some(previous) = by_token.insert(entry.token.clone(), idx) {
                return Err(EmlangError::corrupt(format!(
                    "token `{}` is shared by `{}` and `{}`",
                    entry.token, entries[previous].word, entry.word
                )));
            }
        }
        Ok(Self {
            vocab_size,
            seed,
            entries,
            by_word,
            by_token,
        })
    }

    /// Target number of symbolized words requested at training time.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Seed used for symbol assignment.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Entries in rank order (frequency descending, then word ascending).
    #[must_use]
    pub fn entries(&self) -> &[CodebookEntry] {
        &self.entries
    }

    /// Number of symbolized words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no word is symbolized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbolic token for a lowercased word.
    #[must_use]
    pub fn token_for(&self, word: &str) -> Option<&str> {
        self.by_word
            .get(word)
            .map(|&idx| self.entries[idx].token.as_str())
    }

    /// Lowercased word for a symbolic token (the reverse map).
    #[must_use]
    pub fn word_for(&self, token: &str) -> Option<&str> {
        self.by_token
            .get(token)
            .map(|&idx| self.entries[idx].word.as_str())
    }

    /// Word → token mapping in sorted word order.
    #[must_use]
    pub fn token_map(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|entry| (entry.word.as_str(), entry.token.as_str()))
            .collect()
    }

    /// Token → word mapping in sorted token order.
    #[must_use]
    pub fn reverse_map(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|entry| (entry.token.as_str(), entry.word.as_str()))
            .collect()
    }

    /// Serialises the codebook to disk as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        save_codebook(self, path, pretty)
    }

    /// Serialises the codebook to a JSON string.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        codebook_json(self, pretty)
    }
}

impl PartialEq for Codebook {
    fn eq(&self, other: &Self) -> bool {
        self.vocab_size == other.vocab_size
            && self.seed == other.seed
            && self.entries == other.entries
    }
}

impl Eq for Codebook {}

fn is_normalized_word(word: &str) -> bool {
    let tokens = tokenize(word);
    matches!(tokens.as_slice(), [token] if token.is_word() && token.normalized() == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, token: &str, frequency: usize) -> CodebookEntry {
        CodebookEntry {
            word: word.into(),
            token: token.into(),
            frequency,
        }
    }

    #[test]
    fn lookups_are_bijective() {
        let codebook = Codebook::from_entries(
            4,
            9,
            vec![entry("the", "Δ3", 5), entry("cat", "β⊕12", 2)],
        )
        .expect("valid codebook");
        for entry in codebook.entries() {
            let token = codebook.token_for(&entry.word).expect("word present");
            assert_eq!(codebook.word_for(token), Some(entry.word.as_str()));
        }
        assert_eq!(codebook.token_for("dog"), None);
        assert_eq!(codebook.word_for("Ω99"), None);
        assert_eq!(codebook.reverse_map().len(), codebook.token_map().len());
    }

    #[test]
    fn duplicate_tokens_are_rejected() {
        let err = Codebook::from_entries(4, 0, vec![entry("a", "Δ1", 1), entry("b", "Δ1", 1)])
            .expect_err("shared token");
        assert!(matches!(err, EmlangError::CorruptCodebook(msg) if msg.contains("shared")));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(Codebook::from_entries(4, 0, vec![entry("The", "Δ1", 1)]).is_err());
        assert!(Codebook::from_entries(4, 0, vec![entry("two words", "Δ1", 1)]).is_err());
        assert!(Codebook::from_entries(4, 0, vec![entry("the", "::", 1)]).is_err());
        assert!(Codebook::from_entries(1, 0, vec![entry("a", "Δ1", 1), entry("b", "Δ2", 1)])
            .is_err());
    }
}
