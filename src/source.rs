//! Word sources and the ingestion loop that feeds them to a trie builder.
//!
//! A [`WordSource`] is either a sequence of already-split words or a raw byte
//! stream. Byte streams can be read on a scoped background thread while the
//! calling thread tokenizes; chunks travel over a bounded channel in order,
//! so the resulting trie is the same whether or not the reader runs ahead.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use crate::config::TrieConfig;
use crate::error::{Result, TrieError};
use crate::tokenize::{SymbolSink, Tokenizer};

/// Input for building a dictionary.
pub enum WordSource<'a> {
    /// Pre-tokenized words. Each item is still split on non-letters.
    Words(Box<dyn Iterator<Item = Cow<'a, str>> + 'a>),
    /// A byte stream tokenized as it is read.
    Reader(Box<dyn Read + Send + 'a>),
}

impl<'a> WordSource<'a> {
    /// A source over an iterator of words.
    pub fn words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<Cow<'a, str>> + 'a,
    {
        WordSource::Words(Box::new(words.into_iter().map(Into::into)))
    }

    /// A source over a byte stream.
    pub fn reader<R: Read + Send + 'a>(reader: R) -> Self {
        WordSource::Reader(Box::new(reader))
    }

    /// A source over the contents of a file.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(WordSource::reader(file))
    }
}

impl std::fmt::Debug for WordSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordSource::Words(_) => f.write_str("WordSource::Words(..)"),
            WordSource::Reader(_) => f.write_str("WordSource::Reader(..)"),
        }
    }
}

/// Drive `source` through tokenizer `T` into `sink` until the input is exhausted.
pub(crate) fn ingest<T, S>(source: WordSource<'_>, config: &TrieConfig, sink: &mut S) -> Result<()>
where
    T: Tokenizer,
    S: SymbolSink<Symbol = T::Symbol>,
{
    let mut tokenizer = T::default();
    match source {
        WordSource::Words(words) => {
            for word in words {
                tokenizer.feed_word(&word, sink)?;
            }
        }
        WordSource::Reader(reader) if config.background_reader => {
            ingest_background(reader, config, &mut tokenizer, sink)?;
        }
        WordSource::Reader(mut reader) => {
            let mut buf = vec![0u8; config.read_buffer_size];
            loop {
                let n = read_retrying(&mut reader, &mut buf)?;
                if n == 0 {
                    break;
                }
                tokenizer.feed_bytes(&buf[..n], sink)?;
            }
        }
    }
    tokenizer.finish(sink)
}

fn ingest_background<T, S>(
    mut reader: Box<dyn Read + Send + '_>,
    config: &TrieConfig,
    tokenizer: &mut T,
    sink: &mut S,
) -> Result<()>
where
    T: Tokenizer,
    S: SymbolSink<Symbol = T::Symbol>,
{
    let (tx, rx) = mpsc::sync_channel::<io::Result<Vec<u8>>>(config.channel_capacity);
    let chunk_size = config.read_buffer_size;

    thread::scope(|scope| {
        let handle = scope.spawn(move || {
            loop {
                let mut buf = vec![0u8; chunk_size];
                let chunk = match read_retrying(&mut reader, &mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.truncate(n);
                        Ok(buf)
                    }
                    Err(e) => Err(e),
                };
                let failed = chunk.is_err();
                // A closed channel means the parser stopped early; nothing left to do.
                if tx.send(chunk).is_err() || failed {
                    break;
                }
            }
        });

        let parsed = (|| -> Result<()> {
            for chunk in &rx {
                let chunk = chunk.map_err(|e| {
                    log::warn!("background reader failed: {e}");
                    TrieError::from(e)
                })?;
                tokenizer.feed_bytes(&chunk, sink)?;
            }
            Ok(())
        })();

        // Unblock a reader still waiting on a full channel before joining it.
        drop(rx);
        let joined = handle.join().map_err(|_| TrieError::ReaderPanicked);
        parsed.and(joined)
    })
}

fn read_retrying(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
