//! JSON persistence for [`Codebook`].
//!
//! The document carries `vocabulary_size`, `seed` and a sorted `token_map`; `format` and
//! per-word `frequencies` are optional on load. Anything that cannot be turned back into a
//! valid codebook is reported as [`EmlangError::CorruptCodebook`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::codebook::{Codebook, CodebookEntry};
use crate::error::{EmlangError, Result};
use crate::text::{decode_bytes, TextEncoding};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct CodebookDocumentRef<'a> {
    format: u32,
    vocabulary_size: usize,
    seed: u64,
    token_map: BTreeMap<&'a str, &'a str>,
    frequencies: BTreeMap<&'a str, usize>,
}

#[derive(Deserialize)]
struct CodebookDocument {
    #[serde(default = "default_format")]
    format: u32,
    vocabulary_size: usize,
    seed: u64,
    token_map: BTreeMap<String, String>,
    #[serde(default)]
    frequencies: Option<BTreeMap<String, usize>>,
}

fn default_format() -> u32 {
    FORMAT_VERSION
}

/// Serialises the codebook to a JSON string. Identical codebooks produce identical bytes.
pub fn codebook_json(codebook: &Codebook, pretty: bool) -> Result<String> {
    let document = CodebookDocumentRef {
        format: FORMAT_VERSION,
        vocabulary_size: codebook.vocab_size(),
        seed: codebook.seed(),
        token_map: codebook.token_map(),
        frequencies: codebook
            .entries()
            .iter()
            .map(|entry| (entry.word.as_str(), entry.frequency))
            .collect(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(json)
}

/// Writes the codebook JSON to `path`.
pub fn save_codebook<P: AsRef<Path>>(codebook: &Codebook, path: P, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    let json = codebook_json(codebook, pretty)?;
    fs::write(path, json).map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?;
    debug!("wrote codebook with {} entries to {}", codebook.len(), path.display());
    Ok(())
}

/// Parses a codebook from JSON, validating every codebook invariant.
pub fn codebook_from_json(json: &str) -> Result<Codebook> {
    let document: CodebookDocument =
        serde_json::from_str(json).map_err(|err| EmlangError::corrupt(err.to_string()))?;
    if document.format != FORMAT_VERSION {
        return Err(EmlangError::corrupt(format!(
            "unsupported format {} (expected {FORMAT_VERSION})",
            document.format
        )));
    }
    let mut frequencies = document.frequencies.unwrap_or_default();
    if let Some(stray) = frequencies
        .keys()
        .find(|word| !document.token_map.contains_key(*word))
    {
        return Err(EmlangError::corrupt(format!(
            "frequency recorded for `{stray}` which has no token"
        )));
    }
    let mut entries: Vec<CodebookEntry> = document
        .token_map
        .into_iter()
        .map(|(word, token)| {
            let frequency = frequencies.remove(&word).unwrap_or(0);
            CodebookEntry {
                word,
                token,
                frequency,
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| a.word.cmp(&b.word))
    });
    Codebook::from_entries(document.vocabulary_size, document.seed, entries)
}

/// Loads a codebook from `path`. UTF-8 (with or without BOM) and UTF-16 files are accepted.
pub fn load_codebook<P: AsRef<Path>>(path: P) -> Result<Codebook> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?;
    let (json, encoding) = decode_bytes(&bytes);
    if encoding == TextEncoding::Lossy {
        return Err(EmlangError::corrupt(format!(
            "{} is not valid UTF-8 or UTF-16",
            path.display()
        )));
    }
    let codebook = codebook_from_json(&json)?;
    debug!("loaded codebook with {} entries from {}", codebook.len(), path.display());
    Ok(codebook)
}
