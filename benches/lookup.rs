//! Build and lookup benchmarks across the encodings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use wordtrie::{
    Dictionary, FlatLatin32Trie, Latin32OptimizedTrie, Latin32Trie, Latin64Trie,
    SortedUtf32Trie, Utf32Trie,
};

/// Words with a rough English letter distribution.
fn generate_words(n: usize, seed: u64) -> Vec<String> {
    const WEIGHTED: &[u8] = b"eeeeeeeeeeeetttttttttaaaaaaaaoooooooiiiiiiinnnnnnnsssssshhhhhhrrrrrrddddllllcccuuummmwwffggyyppbbvkjxqz";
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let len = rng.gen_range(2..10);
            (0..len)
                .map(|_| WEIGHTED[rng.gen_range(0..WEIGHTED.len())] as char)
                .collect()
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for size in [1_000, 10_000, 100_000] {
        let words = generate_words(size, 1);
        let text = words.join(" ");

        // The 64-bit encoding runs out of 15-bit addresses on large inputs.
        macro_rules! build {
            ($name:literal, $ty:ty) => {
                if <$ty>::from_reader(text.as_bytes()).is_ok() {
                    group.bench_with_input(BenchmarkId::new($name, size), &text, |b, text| {
                        b.iter(|| black_box(<$ty>::from_reader(text.as_bytes()).unwrap()))
                    });
                } else {
                    eprintln!("{}: skipped at {} words", $name, size);
                }
            };
        }

        build!("latin32", Latin32Trie);
        build!("latin32-optimized", Latin32OptimizedTrie);
        build!("latin64", Latin64Trie);
        build!("utf32", Utf32Trie);
        build!("utf32-sorted", SortedUtf32Trie);

        group.bench_with_input(BenchmarkId::new("HashSet", size), &words, |b, words| {
            b.iter(|| black_box(words.iter().cloned().collect::<HashSet<String>>()))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [1_000, 10_000, 100_000] {
        let words = generate_words(size, 2);
        // Half hits, half (mostly) misses.
        let mut probes = words.clone();
        probes.truncate(size / 2);
        probes.extend(generate_words(size / 2, 3));

        macro_rules! lookup {
            ($name:literal, $ty:ty) => {
                match <$ty>::from_words(words.iter().map(String::as_str)) {
                    Ok(dict) => {
                        group.bench_with_input(BenchmarkId::new($name, size), &probes, |b, probes| {
                            b.iter(|| probes.iter().filter(|p| dict.is_valid_word(p)).count())
                        });
                    }
                    Err(e) => eprintln!("{}: skipped at {} words: {e}", $name, size),
                }
            };
        }

        lookup!("latin32", Latin32Trie);
        lookup!("latin32-optimized", Latin32OptimizedTrie);
        lookup!("latin32-flat", FlatLatin32Trie);
        lookup!("latin64", Latin64Trie);
        lookup!("utf32", Utf32Trie);
        lookup!("utf32-sorted", SortedUtf32Trie);

        let set: HashSet<String> = words.iter().cloned().collect();
        group.bench_with_input(BenchmarkId::new("HashSet", size), &probes, |b, probes| {
            b.iter(|| probes.iter().filter(|p| set.contains(p.as_str())).count())
        });
    }

    group.finish();
}

fn bench_memory(c: &mut Criterion) {
    // Not a timing benchmark: prints node-word footprints once.
    let words = generate_words(100_000, 4);
    for stats in [
        Latin32Trie::from_words(words.iter().map(String::as_str)).map(|t| t.stats()),
        Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).map(|t| t.stats()),
        Latin64Trie::from_words(words.iter().map(String::as_str)).map(|t| t.stats()),
        Utf32Trie::from_words(words.iter().map(String::as_str)).map(|t| t.stats()),
        SortedUtf32Trie::from_words(words.iter().map(String::as_str)).map(|t| t.stats()),
    ] {
        match stats {
            Ok(stats) => println!("{stats}"),
            Err(e) => println!("build failed: {e}"),
        }
    }

    let trie = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
    c.bench_function("flatten/100000", |b| b.iter(|| black_box(trie.flatten())));
}

criterion_group!(benches, bench_build, bench_lookup, bench_memory);
criterion_main!(benches);
