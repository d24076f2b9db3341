use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Arbitrary)]
enum Encoding {
    Latin32,
    Latin32Optimized,
    FlatLatin32,
    Latin64,
    Utf32,
    SortedUtf32,
}

#[derive(Clone, Copy, Debug, Arbitrary)]
enum Feed {
    Words,
    Reader,
    BackgroundReader,
}

fn fold(word: &str) -> String {
    word.chars().flat_map(char::to_lowercase).collect()
}

fn feed_source<'a>(words: &'a [String], feed: Feed) -> (WordSource<'a>, TrieConfig) {
    // Tiny chunks so words straddle reads.
    let config = TrieConfig {
        block_size: 32,
        read_buffer_size: 3,
        channel_capacity: 1,
        background_reader: matches!(feed, Feed::BackgroundReader),
        ..TrieConfig::default()
    };
    let source = match feed {
        Feed::Words => WordSource::words(words.iter().map(String::as_str)),
        Feed::Reader | Feed::BackgroundReader => {
            WordSource::reader(std::io::Cursor::new(words.join("\n").into_bytes()))
        }
    };
    (source, config)
}

fn check_against_oracle<D: Dictionary>(
    words: &[String],
    probes: &[String],
    feed: Feed,
) -> std::result::Result<(), TestCaseError> {
    let (source, config) = feed_source(words, feed);
    let dict = D::build(source, &config).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let oracle: BTreeSet<String> = words.iter().map(|w| fold(w)).collect();

    for word in words {
        prop_assert!(dict.is_valid_word(word), "inserted word {word:?} missing");
    }
    for probe in probes {
        prop_assert_eq!(
            dict.is_valid_word(probe),
            oracle.contains(&fold(probe)),
            "probe {:?}",
            probe
        );
    }
    Ok(())
}

fn check_encoding(
    encoding: Encoding,
    words: &[String],
    probes: &[String],
    feed: Feed,
) -> std::result::Result<(), TestCaseError> {
    match encoding {
        Encoding::Latin32 => check_against_oracle::<Latin32Trie>(words, probes, feed),
        Encoding::Latin32Optimized => {
            check_against_oracle::<Latin32OptimizedTrie>(words, probes, feed)
        }
        Encoding::FlatLatin32 => check_against_oracle::<FlatLatin32Trie>(words, probes, feed),
        Encoding::Latin64 => check_against_oracle::<Latin64Trie>(words, probes, feed),
        Encoding::Utf32 => check_against_oracle::<Utf32Trie>(words, probes, feed),
        Encoding::SortedUtf32 => check_against_oracle::<SortedUtf32Trie>(words, probes, feed),
    }
}

fn latin_words() -> impl Strategy<Value = Vec<String>> {
    // A small alphabet forces shared prefixes and full sparse groups.
    prop::collection::vec("[a-fA-F]{1,7}", 0..300)
}

fn latin_probes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-gA-G]{0,8}", 0..300)
}

fn unicode_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[aäbÄжЖσΣ日本ß]{1,6}", 0..200)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_membership_matches_oracle(
        encoding in any::<Encoding>(),
        feed in any::<Feed>(),
        words in latin_words(),
        probes in latin_probes(),
    ) {
        check_encoding(encoding, &words, &probes, feed)?;
    }

    #[test]
    fn prop_unicode_membership_matches_oracle(
        sorted in any::<bool>(),
        feed in any::<Feed>(),
        words in unicode_words(),
        probes in unicode_words(),
    ) {
        let encoding = if sorted { Encoding::SortedUtf32 } else { Encoding::Utf32 };
        check_encoding(encoding, &words, &probes, feed)?;
    }

    #[test]
    fn prop_encodings_agree(words in latin_words(), probes in latin_probes()) {
        let baseline = Latin32Trie::from_words(words.iter().map(String::as_str)).unwrap();
        let optimized = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
        let sectioned = Latin64Trie::from_words(words.iter().map(String::as_str)).unwrap();
        let linear = Utf32Trie::from_words(words.iter().map(String::as_str)).unwrap();
        let sorted = SortedUtf32Trie::from_words(words.iter().map(String::as_str)).unwrap();

        for probe in probes.iter().chain(&words) {
            let expected = baseline.is_valid_word(probe);
            prop_assert_eq!(optimized.is_valid_word(probe), expected);
            prop_assert_eq!(sectioned.is_valid_word(probe), expected);
            prop_assert_eq!(linear.is_valid_word(probe), expected);
            prop_assert_eq!(sorted.is_valid_word(probe), expected);
        }
    }

    #[test]
    fn prop_flatten_is_idempotent(words in latin_words(), probes in latin_probes()) {
        let trie = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
        let flat = trie.flatten();
        prop_assert_eq!(flat.node_words(), trie.node_words());
        for probe in probes.iter().chain(&words) {
            prop_assert_eq!(flat.is_valid_word(probe), trie.is_valid_word(probe));
        }
        prop_assert_eq!(flat.stats().groups, trie.stats().groups);
    }

    #[test]
    fn prop_optimized_layout_is_consistent(words in latin_words()) {
        let trie = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
        let distinct: BTreeSet<String> = words.iter().map(|w| fold(w)).collect();
        prop_assert_eq!(trie.validate(), distinct.len());
    }

    #[test]
    fn prop_reader_matches_words(words in latin_words(), background in any::<bool>()) {
        let from_words = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
        let feed = if background { Feed::BackgroundReader } else { Feed::Reader };
        let (source, config) = feed_source(&words, feed);
        let from_reader = Latin32OptimizedTrie::build(source, &config).unwrap();

        // Same symbols in the same order give the same arena.
        prop_assert_eq!(from_reader.node_words(), from_words.node_words());
        prop_assert_eq!(from_reader.promotions(), from_words.promotions());
        prop_assert_eq!(from_reader.stats().groups, from_words.stats().groups);
    }
}

/// Every ordering of `items`, generated by Heap's algorithm.
fn permutations<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    let mut current = items.to_vec();
    let mut counters = vec![0usize; current.len()];
    let mut all = vec![current.clone()];
    let mut i = 1;
    while i < current.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            current.swap(j, i);
            all.push(current.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
    all
}

#[test]
fn exhaustive_insert_order_around_promotion() {
    // Four letters after 's' force a promotion; nested words exercise
    // back-pointer moves in every order.
    let words = ["s", "sa", "sb", "sc", "sd", "sab", "sabc"];

    let orders = permutations(&words);
    assert_eq!(orders.len(), 5040);
    for perm in orders {
        let trie = Latin32OptimizedTrie::from_words(perm.iter().copied()).unwrap();
        assert_eq!(trie.validate(), words.len());
        assert_eq!(trie.promotions(), 1);
        for word in words {
            assert!(trie.is_valid_word(word), "{word} missing after {perm:?}");
        }
        for word in ["sx", "sa b", "sabcd", "sbc", ""] {
            assert!(!trie.is_valid_word(word), "{word} present after {perm:?}");
        }
    }
}

#[test]
fn random_dictionary_all_encodings() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let words: Vec<String> = (0..5000)
        .map(|_| {
            let len = rng.gen_range(1..12);
            (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
        })
        .collect();
    let oracle: BTreeSet<&str> = words.iter().map(String::as_str).collect();
    let probes: Vec<String> = (0..5000)
        .map(|_| {
            let len = rng.gen_range(1..6);
            (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
        })
        .collect();

    let optimized = Latin32OptimizedTrie::from_words(words.iter().map(String::as_str)).unwrap();
    assert_eq!(optimized.validate(), oracle.len());
    let flat = optimized.flatten();
    let sorted = SortedUtf32Trie::from_words(words.iter().map(String::as_str)).unwrap();

    for probe in probes.iter().chain(&words) {
        let expected = oracle.contains(probe.as_str());
        assert_eq!(optimized.is_valid_word(probe), expected, "{probe}");
        assert_eq!(flat.is_valid_word(probe), expected, "{probe}");
        assert_eq!(sorted.is_valid_word(probe), expected, "{probe}");
    }

    // Most branch points stay sparse.
    let stats = optimized.stats();
    assert!(stats.groups["sparse3"].groups > stats.groups["dense26"].groups);
}

#[test]
fn random_dictionary_latin64() {
    // 15-bit section addresses hold only small dictionaries.
    let mut rng = StdRng::seed_from_u64(64);
    let words: Vec<String> = (0..500)
        .map(|_| {
            let len = rng.gen_range(1..8);
            (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
        })
        .collect();
    let oracle: BTreeSet<&str> = words.iter().map(String::as_str).collect();
    let sectioned = Latin64Trie::from_words(words.iter().map(String::as_str)).unwrap();
    let baseline = Latin32Trie::from_words(words.iter().map(String::as_str)).unwrap();

    for _ in 0..5000 {
        let len = rng.gen_range(1..5);
        let probe: String = (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        let expected = oracle.contains(probe.as_str());
        assert_eq!(sectioned.is_valid_word(&probe), expected, "{probe}");
        assert_eq!(baseline.is_valid_word(&probe), expected, "{probe}");
    }
    assert!(words.iter().all(|w| sectioned.is_valid_word(w)));
    assert!(sectioned.stats().total_groups() > 0);
}
