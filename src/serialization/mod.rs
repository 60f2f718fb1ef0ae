//! Helpers for (de)serialising codebooks.

pub mod json;

pub use json::{codebook_from_json, codebook_json, load_codebook, save_codebook, FORMAT_VERSION};
