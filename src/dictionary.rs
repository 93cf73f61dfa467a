use crate::consts::{MAX_FREQUENCY, MIN_FREQUENCY};
use fnv::FnvHashMap;
use sha2::{Digest, Sha256};

/// Identity of a word table snapshot: dictionary label plus a digest of its entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordsId {
    pub name: String,
    pub fingerprint: String,
}

/// Immutable word -> frequency snapshot for one dictionary activation.
///
/// Entries are kept sorted by word so that everything derived from the table
/// (extremity buckets, candidate order, tie-breaking) is deterministic.
#[derive(Debug, Clone)]
pub struct WordFrequencyTable {
    name: String,
    entries: Vec<(String, u8)>,
    index: FnvHashMap<String, usize>,
    id: WordsId,
}

impl WordFrequencyTable {
    /// Frequencies are clamped to `[1, 255]`; blank words are dropped and duplicate
    /// words keep their highest frequency.
    pub fn new<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut merged: FnvHashMap<String, u8> = FnvHashMap::default();
        for (word, freq) in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            let freq = freq.clamp(MIN_FREQUENCY as u64, MAX_FREQUENCY as u64) as u8;
            let slot = merged.entry(word.to_string()).or_insert(freq);
            *slot = (*slot).max(freq);
        }

        let mut entries: Vec<(String, u8)> = merged.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        let mut index = FnvHashMap::default();
        for (i, (word, freq)) in entries.iter().enumerate() {
            hasher.update(word.as_bytes());
            hasher.update([0, *freq]);
            index.insert(word.clone(), i);
        }

        let name = name.into();
        let id = WordsId {
            name: name.clone(),
            fingerprint: hex::encode(hasher.finalize()),
        };

        Self {
            name,
            entries,
            index,
            id,
        }
    }

    pub fn id(&self) -> &WordsId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn frequency(&self, word: &str) -> Option<u8> {
        self.index.get(word).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Entries in word order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> + '_ {
        self.entries.iter().map(|(w, f)| (w.as_str(), *f))
    }

    /// Words ordered by descending frequency, then alphabetically.
    pub fn by_frequency(&self) -> Vec<(&str, u8)> {
        let mut out: Vec<(&str, u8)> = self.iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }
}
