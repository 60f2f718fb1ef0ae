use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CORPUS: &str = "The quick fox jumps over the lazy dog.\n\
                      The dog sleeps; the fox runs over the hill.\n\
                      A quick dog and a lazy fox.\n";

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn emlang() -> Command {
    Command::cargo_bin("emlang").expect("binary exists")
}

fn build_codebook(workspace: &Path, vocab: &str) -> std::path::PathBuf {
    let corpus_path = workspace.join("corpus.txt");
    let codebook_path = workspace.join("codebook.json");
    fs::write(&corpus_path, CORPUS).expect("write corpus");
    emlang()
        .args(["--quiet", "build"])
        .arg(&codebook_path)
        .arg(&corpus_path)
        .args(["--vocab", vocab, "--seed", "7", "--no-progress"])
        .assert()
        .success();
    assert!(codebook_path.exists(), "codebook.json was created");
    codebook_path
}

#[test]
fn build_encode_decode_round_trip() {
    let workspace = temp_workspace();
    let codebook_path = build_codebook(workspace.path(), "8");
    let input_path = workspace.path().join("input.txt");
    let encoded_path = workspace.path().join("encoded.txt");
    let text = "The lazy fox sleeps near Zürich.\nThe dog runs!\n";
    fs::write(&input_path, text).expect("write input");

    emlang()
        .args(["--quiet", "encode"])
        .arg(&codebook_path)
        .arg("--in")
        .arg(&input_path)
        .arg("--out")
        .arg(&encoded_path)
        .args(["--structure", "0.5", "--seed", "3"])
        .assert()
        .success();
    let encoded = fs::read_to_string(&encoded_path).expect("read encoded");
    assert_ne!(encoded, text);
    assert!(encoded.contains('⟦'), "unknown words become fallback blocks");

    let decoded = emlang()
        .args(["--quiet", "decode"])
        .arg(&codebook_path)
        .arg("--in")
        .arg(&encoded_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(decoded).expect("utf8 output"), text);
}

#[test]
fn encode_and_decode_use_stdin() {
    let workspace = temp_workspace();
    let codebook_path = build_codebook(workspace.path(), "20");

    let encoded = emlang()
        .args(["--quiet", "encode"])
        .arg(&codebook_path)
        .args(["--structure", "1.0", "--stats"])
        .write_stdin("The quick dog.")
        .assert()
        .success()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&encoded.stderr);
    assert!(stderr.contains("Markers"), "stats are printed: {stderr}");

    emlang()
        .args(["--quiet", "decode"])
        .arg(&codebook_path)
        .write_stdin(encoded.stdout)
        .assert()
        .success()
        .stdout("The quick dog.");
}

#[test]
fn decode_tolerates_malformed_blocks() {
    let workspace = temp_workspace();
    let codebook_path = build_codebook(workspace.path(), "8");

    let output = emlang()
        .args(["--quiet", "decode"])
        .arg(&codebook_path)
        .arg("--report")
        .write_stdin("⟦αβ~00⟧ ⟦γ")
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "⟦αβ~00⟧ ⟦γ");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed blocks: 2"), "report printed: {stderr}");
}

#[test]
fn negative_vocab_is_rejected() {
    let workspace = temp_workspace();
    let corpus_path = workspace.path().join("corpus.txt");
    let codebook_path = workspace.path().join("codebook.json");
    fs::write(&corpus_path, CORPUS).expect("write corpus");

    let output = emlang()
        .args(["--quiet", "build"])
        .arg(&codebook_path)
        .arg(&corpus_path)
        .args(["--vocab", "-1", "--no-progress"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid configuration"), "{stderr}");
    assert!(!codebook_path.exists());
}

#[test]
fn invalid_structure_is_rejected() {
    let workspace = temp_workspace();
    let codebook_path = build_codebook(workspace.path(), "8");
    emlang()
        .args(["--quiet", "encode"])
        .arg(&codebook_path)
        .args(["--structure", "1.5"])
        .write_stdin("the dog")
        .assert()
        .failure();
}

#[test]
fn corrupt_codebook_is_reported() {
    let workspace = temp_workspace();
    let codebook_path = workspace.path().join("codebook.json");
    fs::write(&codebook_path, r#"{"seed": 1, "token_map": {}}"#).expect("write codebook");

    let output = emlang()
        .args(["--quiet", "decode"])
        .arg(&codebook_path)
        .write_stdin("Δ3")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("corrupt codebook"), "{stderr}");
}

#[test]
fn info_reports_codebook_metadata() {
    let workspace = temp_workspace();
    let codebook_path = build_codebook(workspace.path(), "8");

    let text_output = emlang()
        .args(["--quiet", "info"])
        .arg(&codebook_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text_output = String::from_utf8(text_output).expect("utf8 output");
    assert!(text_output.contains("Vocab size: 8"), "{text_output}");
    assert!(text_output.contains("the"));

    let info_output = emlang()
        .args(["--quiet", "info"])
        .arg(&codebook_path)
        .args(["--json", "--top", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let info: Value = serde_json::from_slice(&info_output).expect("info json");
    assert_eq!(info["vocabulary_size"].as_u64(), Some(8));
    assert_eq!(info["entries"].as_u64(), Some(8));
    assert_eq!(info["seed"].as_u64(), Some(7));
    let top = info["top"].as_array().expect("top array");
    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["word"].as_str(), Some("the"));
}

#[cfg(target_os = "linux")]
#[test]
fn verbose_build_logs_resident_set_size() {
    let workspace = temp_workspace();
    let corpus_path = workspace.path().join("corpus.txt");
    let codebook_path = workspace.path().join("codebook.json");
    fs::write(&corpus_path, CORPUS).expect("write corpus");

    let output = emlang()
        .args(["-v", "build"])
        .arg(&codebook_path)
        .arg(&corpus_path)
        .arg("--no-progress")
        .assert()
        .success()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resident set size after training"), "{stderr}");
    assert!(!stderr.contains("peak"), "{stderr}");
}
