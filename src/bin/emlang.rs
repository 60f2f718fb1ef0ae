use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use emlang::config::{EncoderConfig, IngestConfig, TrainerConfig};
use emlang::{
    decode_bytes, decode_with_report, load_codebook, load_text_corpus, Codebook, DecodeIssue,
    Encoder, TextEncoding, Trainer,
};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde_json::json;

const DEFAULT_VOCAB: i64 = 500;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_STRUCTURE: f64 = 0.2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Emergent-looking text codec", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a codebook from text files or directories
    Build(BuildArgs),
    /// Encode text into the emergent stream
    Encode(EncodeArgs),
    /// Decode an emergent stream back into text
    Decode(DecodeArgs),
    /// Inspect codebook metadata
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Output path for the codebook JSON
    codebook: PathBuf,

    /// Files or directories to ingest
    #[arg(required = true)]
    corpus: Vec<PathBuf>,

    /// Number of words to symbolize
    #[arg(long, value_name = "N", default_value_t = DEFAULT_VOCAB, allow_negative_numbers = true)]
    vocab: i64,

    /// Seed for symbol assignment
    #[arg(long, value_name = "SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Ignore words seen fewer times than this
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    min_frequency: usize,

    /// Disable the progress spinner and training summary
    #[arg(long)]
    no_progress: bool,

    /// Write compact instead of pretty JSON
    #[arg(long)]
    compact: bool,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Codebook JSON to load
    codebook: PathBuf,

    /// Input text (stdin when omitted)
    #[arg(long = "in", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output path (stdout when omitted)
    #[arg(long = "out", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Probability of a structure marker between units
    #[arg(long, value_name = "F", default_value_t = DEFAULT_STRUCTURE)]
    structure: f64,

    /// Seed for marker placement
    #[arg(long, value_name = "SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Print unit counts to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Codebook JSON to load
    codebook: PathBuf,

    /// Input emergent text (stdin when omitted)
    #[arg(long = "in", value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output path (stdout when omitted)
    #[arg(long = "out", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print a decode report to stderr
    #[arg(long)]
    report: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Codebook JSON to inspect
    codebook: PathBuf,

    /// Emit JSON instead of human-readable output
    #[arg(long)]
    json: bool,

    /// Number of top-ranked entries to list
    #[arg(long, value_name = "N", default_value_t = 10)]
    top: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Build(args) => run_build(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_build(args: BuildArgs) -> Result<()> {
    let trainer_cfg = TrainerConfig::builder()
        .signed_vocab_size(args.vocab)?
        .seed(args.seed)
        .min_frequency(args.min_frequency)
        .show_progress(!args.no_progress)
        .build()?;
    let ingest_cfg = IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .build();

    let documents =
        load_text_corpus(&args.corpus, &ingest_cfg).context("failed to load text corpus")?;
    let corpus_chars: usize = documents.iter().map(|doc| doc.chars().count()).sum();
    info!(
        "loaded {} documents totalling {corpus_chars} characters",
        documents.len()
    );

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} building codebook... {elapsed}")
            .context("invalid progress template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let trainer = Trainer::new(trainer_cfg);
    let artifacts = trainer.train_from_documents(&documents)?;
    if let Some(pb) = spinner {
        pb.finish_with_message("codebook complete");
    }

    artifacts
        .codebook
        .save(&args.codebook, !args.compact)
        .with_context(|| format!("failed to save codebook to {}", args.codebook.display()))?;

    let metrics = &artifacts.metrics;
    println!(
        "wrote codebook with {} of {} words to {}",
        artifacts.codebook.len(),
        artifacts.codebook.vocab_size(),
        args.codebook.display()
    );
    println!(
        "   {} words ({} distinct) | coverage {:.1}% | duration {:.2?}",
        metrics.total_words,
        metrics.distinct_words,
        metrics.coverage() * 100.0,
        metrics.total_duration
    );
    if let Some(rss) = metrics.rss_kb {
        debug!("resident set size after training: {rss} KiB");
    }

    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let codebook = load(&args.codebook)?;
    let cfg = EncoderConfig::new(args.structure, args.seed)?;
    let text = read_input(args.input.as_deref())?;

    let start = Instant::now();
    let (emergent, stats) = Encoder::new(&codebook, cfg).encode_with_stats(&text);
    debug!("encoded {} bytes in {:.2?}", text.len(), start.elapsed());

    write_output(args.output.as_deref(), &emergent)?;
    if args.stats {
        eprintln!("Symbols        : {}", stats.symbols);
        eprintln!("Case hints     : {}", stats.case_hints);
        eprintln!("Fallback blocks: {}", stats.fallback_blocks);
        eprintln!("Literals       : {}", stats.literals);
        eprintln!("Line breaks    : {}", stats.line_breaks);
        eprintln!("Markers        : {}", stats.markers);
    }

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let codebook = load(&args.codebook)?;
    let emergent = read_input(args.input.as_deref())?;

    let (text, report) = decode_with_report(&emergent, &codebook);
    for issue in &report.issues {
        match issue {
            DecodeIssue::MalformedFallbackBlock { offset, raw, reason } => {
                warn!("malformed fallback block at byte {offset} ({reason}): {raw}");
            }
            DecodeIssue::UnknownSymbol { offset, token } => {
                debug!("unknown symbol at byte {offset}: {token}");
            }
        }
    }

    write_output(args.output.as_deref(), &text)?;
    if args.report {
        eprintln!("Symbols resolved: {}", report.symbols_resolved);
        eprintln!("Fallback blocks : {}", report.fallback_blocks);
        eprintln!("Markers dropped : {}", report.markers_dropped);
        eprintln!("Literals        : {}", report.literals);
        eprintln!("Malformed blocks: {}", report.malformed_blocks());
        eprintln!("Unknown symbols : {}", report.unknown_symbols());
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let codebook = load(&args.codebook)?;
    let top = codebook.entries().iter().take(args.top);

    if args.json {
        let entries = top
            .map(|entry| {
                json!({
                    "word": entry.word,
                    "token": entry.token,
                    "frequency": entry.frequency,
                })
            })
            .collect::<Vec<_>>();
        let summary = json!({
            "path": args.codebook.display().to_string(),
            "vocabulary_size": codebook.vocab_size(),
            "entries": codebook.len(),
            "seed": codebook.seed(),
            "top": entries,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Vocab size: {}", codebook.vocab_size());
        println!("Entries   : {}", codebook.len());
        println!("Seed      : {}", codebook.seed());
        for (rank, entry) in top.enumerate() {
            println!(
                "{:>5}  {:<12} {:<16} {}",
                rank + 1,
                entry.token,
                entry.word,
                entry.frequency
            );
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Codebook> {
    load_codebook(path).with_context(|| format!("failed to load codebook from {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .context("failed to read stdin")?;
            data
        }
    };
    let (text, encoding) = decode_bytes(&bytes);
    if encoding == TextEncoding::Lossy {
        warn!("input is not valid UTF-8/UTF-16; invalid sequences were replaced");
    }
    Ok(text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {} bytes to {}", text.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
