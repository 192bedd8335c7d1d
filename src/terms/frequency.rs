//! Frequency aggregation
//!
//! Counts terms and ranks them by descending count. Ties are broken by the
//! position of each term's first occurrence in the input, never by hash or
//! lexical order, so rankings are reproducible.

use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

/// A term and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub term: String,
    pub count: usize,
}

impl FrequencyEntry {
    pub fn new(term: impl Into<String>, count: usize) -> Self {
        Self {
            term: term.into(),
            count,
        }
    }
}

/// Serialized as a `[term, count]` pair.
impl Serialize for FrequencyEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.term, self.count).serialize(serializer)
    }
}

/// Term counts with a deterministic ranking.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    /// term -> index into `entries`
    index: FxHashMap<String, usize>,
    /// Entries in first-occurrence order
    entries: Vec<FrequencyEntry>,
    /// `entries` indices sorted by rank
    ranking: Vec<usize>,
    total: usize,
}

impl FrequencyTable {
    /// Count every term in `terms`.
    pub fn aggregate<I>(terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        let mut entries: Vec<FrequencyEntry> = Vec::new();
        let mut total = 0;

        for term in terms {
            let term = term.as_ref();
            total += 1;
            match index.get(term) {
                Some(&i) => entries[i].count += 1,
                None => {
                    index.insert(term.to_string(), entries.len());
                    entries.push(FrequencyEntry::new(term, 1));
                }
            }
        }

        let mut ranking: Vec<usize> = (0..entries.len()).collect();
        // Stable sort: equal counts keep first-occurrence order.
        ranking.sort_by(|&a, &b| entries[b].count.cmp(&entries[a].count));

        Self {
            index,
            entries,
            ranking,
            total,
        }
    }

    /// The `k` highest-ranked entries.
    pub fn top(&self, k: usize) -> Vec<FrequencyEntry> {
        self.ranked().take(k).cloned().collect()
    }

    /// All entries in rank order.
    pub fn ranked(&self) -> impl Iterator<Item = &FrequencyEntry> + '_ {
        self.ranking.iter().map(move |&i| &self.entries[i])
    }

    /// Count for `term`, 0 if absent.
    pub fn count(&self, term: &str) -> usize {
        self.index
            .get(term)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// Highest count in the table, 0 if empty.
    pub fn max_count(&self) -> usize {
        self.ranked().next().map(|e| e.count).unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of terms counted, duplicates included.
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Count `terms` into a ranked table.
pub fn aggregate<I>(terms: I) -> FrequencyTable
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    FrequencyTable::aggregate(terms)
}
