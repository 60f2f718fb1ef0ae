//! Reversible "emergent-looking" text codec: library and CLI.
//!
//! The crate trains a [`Codebook`] that maps the most frequent words of a corpus to symbolic
//! tokens such as `β⊕3` or `Ωδ14`, encodes plain text into a stream of those tokens,
//! checksummed fallback blocks and cosmetic structure markers, and decodes the stream back.
//! Typical usage trains once, persists the codebook as JSON, and shares it between encoder and
//! decoder.
//!
//! ```no_run
//! use emlang::{decode, encode, load_codebook, IngestConfig, Trainer, TrainerConfig};
//!
//! # fn main() -> emlang::Result<()> {
//! let trainer_cfg = TrainerConfig::builder()
//!     .vocab_size(500)
//!     .seed(42)
//!     .show_progress(false)
//!     .build()?;
//! let trainer = Trainer::new(trainer_cfg);
//! let artifacts = trainer.train_from_paths(&["/path/to/corpus"], &IngestConfig::default())?;
//! artifacts.codebook.save("codebook.json", true)?;
//!
//! let codebook = load_codebook("codebook.json")?;
//! let emergent = encode("The cat sat on the mat.", &codebook, 0.2, 42)?;
//! assert_eq!(decode(&emergent, &codebook), "The cat sat on the mat.");
//! # Ok(())
//! # }
//! ```
//!
//! The `emlang` CLI is enabled by default through the `cli` feature.  Library-only users can
//! disable default features to avoid the CLI dependencies:
//! `emlang = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions
)]

pub mod codebook;
pub mod config;
pub mod corpus;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod fallback;
pub mod glyphs;
pub mod metrics;
pub mod serialization;
pub mod text;
pub mod tokenizer;
pub mod trainer;

pub use codebook::{Codebook, CodebookEntry};
pub use config::{EncoderConfig, IngestBuilder, IngestConfig, TrainerBuilder, TrainerConfig};
pub use corpus::load_text_corpus;
pub use decoder::{decode, decode_with_report};
pub use encoder::{encode, encode_with_stats, Encoder};
pub use error::{EmlangError, Result};
pub use metrics::{DecodeIssue, DecodeReport, EncodeStats, TrainingMetrics};
pub use serialization::{codebook_from_json, codebook_json, load_codebook, save_codebook};
pub use text::{decode_bytes, TextEncoding};
pub use trainer::{train, Trainer, TrainerArtifacts};
