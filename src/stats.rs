//! Fan-out diagnostics.
//!
//! Informational only: the numbers describe how branch points are shaped,
//! which is what motivated the sparse/dense split in the optimized encoding.

use std::collections::BTreeMap;
use std::fmt;

/// Distribution of branch fan-out over groups of one kind.
///
/// A group's fan-out is the number of its letters in use, that is, letters
/// that end a word or lead to a child group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fanout {
    /// Number of groups of this kind.
    pub groups: usize,
    /// Letters in use per group -> number of groups with that count.
    pub histogram: BTreeMap<usize, usize>,
}

impl Fanout {
    /// Record one group with `used` letters in use.
    pub fn record(&mut self, used: usize) {
        self.groups += 1;
        *self.histogram.entry(used).or_insert(0) += 1;
    }

    /// Letters in use across all groups.
    pub fn links(&self) -> usize {
        self.histogram.iter().map(|(k, v)| k * v).sum()
    }
}

/// Shape and size of a built trie.
#[derive(Debug, Clone, Default)]
pub struct TrieStats {
    /// Short name of the encoding.
    pub encoding: &'static str,
    /// Width of one node word.
    pub word_bits: u32,
    /// Node words in use.
    pub node_words: usize,
    /// Fan-out per group kind.
    pub groups: BTreeMap<&'static str, Fanout>,
    /// Released groups waiting for reuse, by kind.
    pub free_groups: BTreeMap<&'static str, usize>,
}

impl TrieStats {
    pub(crate) fn new(encoding: &'static str, word_bits: u32, node_words: usize) -> Self {
        Self {
            encoding,
            word_bits,
            node_words,
            ..Self::default()
        }
    }

    /// Fan-out entry for `kind`, created empty on first use.
    pub(crate) fn kind(&mut self, kind: &'static str) -> &mut Fanout {
        self.groups.entry(kind).or_default()
    }

    /// Bytes occupied by the node words in use.
    pub fn bytes(&self) -> usize {
        self.node_words * (self.word_bits as usize / 8)
    }

    /// Groups of all kinds.
    pub fn total_groups(&self) -> usize {
        self.groups.values().map(|f| f.groups).sum()
    }
}

impl fmt::Display for TrieStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} x {}-bit words ({} bytes)",
            self.encoding,
            self.node_words,
            self.word_bits,
            self.bytes()
        )?;
        for (kind, fanout) in &self.groups {
            writeln!(f, "  {kind}: {} groups", fanout.groups)?;
            for (used, count) in &fanout.histogram {
                writeln!(f, "    {used:>2} letters: {count}")?;
            }
        }
        for (kind, count) in &self.free_groups {
            writeln!(f, "  free {kind}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fanout_record() {
        let mut fanout = Fanout::default();
        fanout.record(1);
        fanout.record(1);
        fanout.record(3);
        assert_eq!(fanout.groups, 3);
        assert_eq!(fanout.histogram[&1], 2);
        assert_eq!(fanout.links(), 5);
    }

    #[test]
    fn test_display_lists_kinds() {
        let mut stats = TrieStats::new("demo", 32, 30);
        stats.kind("dense26").record(2);
        stats.free_groups.insert("sparse3", 1);
        let text = stats.to_string();
        assert!(text.starts_with("demo: 30 x 32-bit words (120 bytes)"));
        assert!(text.contains("dense26: 1 groups"));
        assert!(text.contains("free sparse3: 1"));
        assert_eq!(stats.total_groups(), 1);
    }
}
