use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use emlang::{decode, encode, Trainer, TrainerConfig};

const WORDS: &[&str] = &[
    "the", "river", "mill", "stone", "water", "miller", "bread", "night", "lantern", "field",
    "wheat", "north", "wind", "and", "of", "a", "turned", "slowly", "under", "bright",
];

fn build_corpus(words: usize) -> String {
    let mut text = String::with_capacity(words * 7);
    let mut state = 0x2545_f491_u32;
    for idx in 0..words {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let word = WORDS[(state as usize) % WORDS.len()];
        if idx % 12 == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                text.extend(first.to_uppercase());
                text.push_str(chars.as_str());
            }
        } else {
            text.push_str(word);
        }
        text.push(if idx % 12 == 11 { '.' } else { ' ' });
        if idx % 60 == 59 {
            text.push('\n');
        }
    }
    text
}

fn bench_codec(c: &mut Criterion) {
    let corpus = build_corpus(50_000);
    let cfg = TrainerConfig::builder()
        .vocab_size(12)
        .seed(42)
        .show_progress(false)
        .build()
        .expect("configuration");

    let mut group = c.benchmark_group("train_text_corpus");
    group.throughput(Throughput::Bytes(corpus.len() as u64));
    group.sampling_mode(SamplingMode::Flat);
    group.bench_function(BenchmarkId::from_parameter("words_50k"), |b| {
        b.iter(|| {
            let trainer = Trainer::new(cfg.clone());
            let artefacts = trainer.train_from_text(&corpus).expect("training");
            let _ = black_box(artefacts);
        });
    });
    group.finish();

    let codebook = Trainer::new(cfg)
        .train_from_text(&corpus)
        .expect("training")
        .codebook;
    let emergent = encode(&corpus, &codebook, 0.2, 42).expect("encode");

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(corpus.len() as u64));
    for structure in [0.0, 0.2] {
        group.bench_with_input(
            BenchmarkId::new("encode", structure),
            &structure,
            |b, &structure| {
                b.iter(|| black_box(encode(&corpus, &codebook, structure, 42).expect("encode")));
            },
        );
    }
    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode(&emergent, &codebook)));
    });
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
