//! Letter-run tokenizers.
//!
//! A word is a maximal run of letters; everything else separates words.
//! Tokenizers push case-folded symbols into a [`SymbolSink`] one at a time, so
//! a trie builder never sees the word as a string and a stream never has to
//! be buffered whole.

use crate::error::{Result, TrieError};

/// Number of letters in the Latin alphabet.
pub const LATIN_LETTERS: usize = 26;

/// Receives the symbols of one word at a time.
pub(crate) trait SymbolSink {
    type Symbol: Copy;

    /// Append a symbol to the current word, starting a new word if none is open.
    fn push(&mut self, symbol: Self::Symbol) -> Result<()>;

    /// Close the current word. Only called after at least one `push`.
    fn end_word(&mut self) -> Result<()>;
}

/// Splits input into words and feeds them to a sink.
pub(crate) trait Tokenizer: Default {
    type Symbol: Copy;

    /// Feed a chunk of a byte stream. Words may span chunk boundaries.
    fn feed_bytes<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = Self::Symbol>;

    /// Feed one pre-tokenized word, closing it afterwards.
    fn feed_word<S>(&mut self, word: &str, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = Self::Symbol>;

    /// Flush a word left open at the end of the input.
    fn finish<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = Self::Symbol>;
}

/// Index of an ASCII letter in `a..=z`, case-folded.
#[inline]
pub fn latin_index(byte: u8) -> Option<u8> {
    if byte.is_ascii_alphabetic() {
        Some(byte.to_ascii_lowercase() - b'a')
    } else {
        None
    }
}

/// Byte-oriented tokenizer for the Latin encodings.
///
/// Only ASCII letters count; any other byte, including each byte of a
/// multi-byte UTF-8 sequence, is a separator.
#[derive(Default, Debug)]
pub(crate) struct LatinTokenizer {
    in_word: bool,
}

impl LatinTokenizer {
    #[inline]
    fn step<S>(&mut self, byte: u8, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = u8>,
    {
        match latin_index(byte) {
            Some(index) => {
                self.in_word = true;
                sink.push(index)
            }
            None => self.close(sink),
        }
    }

    #[inline]
    fn close<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = u8>,
    {
        if self.in_word {
            self.in_word = false;
            sink.end_word()?;
        }
        Ok(())
    }
}

impl Tokenizer for LatinTokenizer {
    type Symbol = u8;

    fn feed_bytes<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = u8>,
    {
        for &byte in bytes {
            self.step(byte, sink)?;
        }
        Ok(())
    }

    fn feed_word<S>(&mut self, word: &str, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = u8>,
    {
        self.feed_bytes(word.as_bytes(), sink)?;
        self.close(sink)
    }

    fn finish<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = u8>,
    {
        self.close(sink)
    }
}

/// Code-point tokenizer for the UTF encodings.
///
/// Byte input is decoded as UTF-8; a sequence split across chunks is held
/// back until the rest arrives.
#[derive(Default, Debug)]
pub(crate) struct UnicodeTokenizer {
    in_word: bool,
    /// Tail of the previous chunk that ended mid-sequence.
    pending: Vec<u8>,
    /// Stream offset of the first byte of `pending` (or of the next chunk).
    consumed: u64,
}

impl UnicodeTokenizer {
    #[inline]
    fn step<S>(&mut self, c: char, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        if c.is_alphabetic() {
            self.in_word = true;
            for folded in c.to_lowercase() {
                sink.push(folded)?;
            }
            Ok(())
        } else {
            self.close(sink)
        }
    }

    #[inline]
    fn close<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        if self.in_word {
            self.in_word = false;
            sink.end_word()?;
        }
        Ok(())
    }

    fn feed_str<S>(&mut self, text: &str, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        for c in text.chars() {
            self.step(c, sink)?;
        }
        Ok(())
    }
}

impl Tokenizer for UnicodeTokenizer {
    type Symbol = char;

    fn feed_bytes<S>(&mut self, bytes: &[u8], sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        let joined;
        let input: &[u8] = if self.pending.is_empty() {
            bytes
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(bytes);
            joined = buf;
            &joined
        };

        match std::str::from_utf8(input) {
            Ok(text) => {
                self.feed_str(text, sink)?;
                self.consumed += input.len() as u64;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                // The prefix up to `valid` is UTF-8 by construction.
                let text = std::str::from_utf8(&input[..valid]).unwrap_or_default();
                self.feed_str(text, sink)?;
                if e.error_len().is_some() {
                    return Err(TrieError::InvalidUtf8 {
                        offset: self.consumed + valid as u64,
                    });
                }
                self.consumed += valid as u64;
                self.pending = input[valid..].to_vec();
            }
        }
        Ok(())
    }

    fn feed_word<S>(&mut self, word: &str, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        self.feed_str(word, sink)?;
        self.close(sink)
    }

    fn finish<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: SymbolSink<Symbol = char>,
    {
        if !self.pending.is_empty() {
            return Err(TrieError::InvalidUtf8 {
                offset: self.consumed,
            });
        }
        self.close(sink)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Collects words as strings.
    #[derive(Default)]
    pub(crate) struct Collect<T> {
        pub(crate) words: Vec<Vec<T>>,
        current: Vec<T>,
    }

    impl<T: Copy> SymbolSink for Collect<T> {
        type Symbol = T;

        fn push(&mut self, symbol: T) -> Result<()> {
            self.current.push(symbol);
            Ok(())
        }

        fn end_word(&mut self) -> Result<()> {
            assert!(!self.current.is_empty(), "end_word without a symbol");
            self.words.push(std::mem::take(&mut self.current));
            Ok(())
        }
    }

    fn latin_words(chunks: &[&[u8]]) -> Vec<String> {
        let mut tokenizer = LatinTokenizer::default();
        let mut sink = Collect::default();
        for chunk in chunks {
            tokenizer.feed_bytes(chunk, &mut sink).unwrap();
        }
        tokenizer.finish(&mut sink).unwrap();
        sink.words
            .into_iter()
            .map(|w| w.into_iter().map(|i| (b'a' + i) as char).collect())
            .collect()
    }

    fn unicode_words(chunks: &[&[u8]]) -> Result<Vec<String>> {
        let mut tokenizer = UnicodeTokenizer::default();
        let mut sink = Collect::default();
        for chunk in chunks {
            tokenizer.feed_bytes(chunk, &mut sink)?;
        }
        tokenizer.finish(&mut sink)?;
        Ok(sink
            .words
            .into_iter()
            .map(|w| w.into_iter().collect())
            .collect())
    }

    #[test]
    fn test_latin_splits_on_non_letters() {
        assert_eq!(
            latin_words(&[b"Hello, World! it's 42x"]),
            vec!["hello", "world", "it", "s", "x"]
        );
    }

    #[test]
    fn test_latin_word_spans_chunks() {
        assert_eq!(latin_words(&[b"tri", b"e", b" map"]), vec!["trie", "map"]);
    }

    #[test]
    fn test_latin_treats_utf8_as_separator() {
        assert_eq!(latin_words(&["caf\u{e9}s".as_bytes()]), vec!["caf", "s"]);
    }

    #[test]
    fn test_latin_feed_word_closes() {
        let mut tokenizer = LatinTokenizer::default();
        let mut sink = Collect::default();
        tokenizer.feed_word("ab", &mut sink).unwrap();
        tokenizer.feed_word("cd", &mut sink).unwrap();
        tokenizer.feed_word("", &mut sink).unwrap();
        tokenizer.finish(&mut sink).unwrap();
        assert_eq!(sink.words, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_unicode_folds_case() {
        assert_eq!(
            unicode_words(&["Ünïcode ΣΟΦΙΑ 東京".as_bytes()]).unwrap(),
            vec!["ünïcode", "σοφια", "東京"]
        );
    }

    #[test]
    fn test_unicode_sequence_split_across_chunks() {
        let bytes = "añb".as_bytes();
        // 'ñ' is two bytes; cut in its middle.
        let (a, b) = bytes.split_at(2);
        assert_eq!(unicode_words(&[a, b]).unwrap(), vec!["añb"]);
    }

    #[test]
    fn test_unicode_rejects_invalid_bytes() {
        let err = unicode_words(&[b"ok ", b"\xff bad"]).unwrap_err();
        assert!(matches!(err, TrieError::InvalidUtf8 { offset: 3 }));
    }

    #[test]
    fn test_unicode_rejects_truncated_tail() {
        let bytes = "é".as_bytes();
        let err = unicode_words(&[b"ab ", &bytes[..1]]).unwrap_err();
        assert!(matches!(err, TrieError::InvalidUtf8 { offset: 3 }));
    }
}
