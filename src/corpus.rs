//! Facilities for discovering input files and loading text corpora.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{EmlangError, Result};
use crate::text::{decode_bytes, TextEncoding};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level.  Symlink traversal is controlled through
/// [`IngestConfig::follow_symlinks`].  Results are sorted per input so training order does not
/// depend on directory iteration order.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(EmlangError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let mut discovered = Vec::new();
            if cfg.recursive {
                let walker = WalkDir::new(path).follow_links(cfg.follow_symlinks);
                for entry in walker {
                    let entry = entry.map_err(|err| EmlangError::Internal(err.to_string()))?;
                    if entry.file_type().is_file() {
                        discovered.push(entry.path().to_path_buf());
                    }
                }
            } else {
                for entry in
                    fs::read_dir(path).map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?
                {
                    let entry =
                        entry.map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?;
                    let entry_path = entry.path();
                    if entry_path.is_file() {
                        discovered.push(entry_path);
                    }
                }
            }
            discovered.sort();
            files.extend(discovered);
        } else {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(EmlangError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Reads one text file, detecting UTF-8 / UTF-8 BOM / UTF-16 input.
pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| EmlangError::io(err, Some(path.to_path_buf())))?;
    let (text, encoding) = decode_bytes(&bytes);
    if encoding == TextEncoding::Lossy {
        debug!("{} is not valid UTF-8/UTF-16; replaced invalid sequences", path.display());
    }
    Ok(text)
}

/// Loads every discovered file as one corpus document, in discovery order.
///
/// Empty documents are discarded; an input set without any text is rejected.
pub fn load_text_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<String>> {
    let file_paths = collect_paths(inputs, cfg)?;
    let mut documents = Vec::with_capacity(file_paths.len());
    for file_path in file_paths {
        let text = read_text_file(&file_path)?;
        if !text.trim().is_empty() {
            documents.push(text);
        }
    }
    if documents.is_empty() {
        return Err(EmlangError::InvalidConfig(
            "no text could be loaded from inputs".into(),
        ));
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collect_paths_discovers_files_recursively() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_a = dir.path().join("a.txt");
        let file_b = nested.join("b.txt");
        fs::write(&file_a, "alpha").expect("write a");
        fs::write(&file_b, "beta").expect("write b");

        let cfg = IngestConfig {
            recursive: true,
            ..IngestConfig::default()
        };
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        assert_eq!(paths, vec![file_a, file_b]);
    }

    #[test]
    fn non_recursive_skips_nested_directories() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        fs::write(dir.path().join("top.txt"), "top").expect("write top");
        fs::write(nested.join("deep.txt"), "deep").expect("write deep");

        let cfg = IngestConfig::builder().recursive(false).build();
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        assert_eq!(paths, vec![dir.path().join("top.txt")]);
    }

    #[test]
    fn missing_input_is_invalid() {
        let dir = tempdir().expect("tempdir");
        let err = collect_paths(&[dir.path().join("absent.txt")], &IngestConfig::default())
            .expect_err("missing path");
        assert!(matches!(err, EmlangError::InvalidConfig(_)));
    }

    #[test]
    fn load_text_corpus_decodes_utf16_and_skips_blank_files() {
        let dir = tempdir().expect("tempdir");
        let mut utf16 = vec![0xFF, 0xFE];
        for unit in "héllo wörld".encode_utf16() {
            utf16.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(dir.path().join("a.txt"), utf16).expect("write utf16");
        fs::write(dir.path().join("b.txt"), "  \n").expect("write blank");

        let documents =
            load_text_corpus(&[dir.path()], &IngestConfig::default()).expect("load corpus");
        assert_eq!(documents, vec!["héllo wörld".to_owned()]);
    }
}
