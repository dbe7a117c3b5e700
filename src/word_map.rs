//! Precomputed word -> {lemma, root} lookup used to expand a query

use crate::normalize::normalize_arabic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMapEntry {
    pub lemma: String,
    #[serde(default)]
    pub root: Option<String>,
}

/// Read-only map from a normalized word to its canonical lemma and root.
///
/// Keys are normalized on insertion; when two raw keys normalize to the same
/// word the first one wins.
#[derive(Debug, Clone, Default)]
pub struct WordMap {
    entries: HashMap<String, WordMapEntry>,
}

impl WordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, WordMapEntry)>,
        K: AsRef<str>,
    {
        let mut map = Self::new();
        for (word, entry) in pairs {
            map.insert(word.as_ref(), entry);
        }
        map
    }

    /// Parse the dataset form: either a JSON object keyed by word, or a list
    /// of `[word, entry]` pairs (order preserved, so first occurrence wins).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Pairs(Vec<(String, WordMapEntry)>),
            Object(HashMap<String, WordMapEntry>),
        }

        Ok(match serde_json::from_str::<Raw>(json)? {
            Raw::Pairs(pairs) => Self::from_pairs(pairs),
            Raw::Object(object) => {
                // Object order is lost; sort for a deterministic first-wins choice.
                let mut pairs: Vec<_> = object.into_iter().collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                Self::from_pairs(pairs)
            }
        })
    }

    /// Insert unless the normalized key is already present. Returns whether
    /// the entry was stored.
    pub fn insert(&mut self, word: &str, entry: WordMapEntry) -> bool {
        let key = normalize_arabic(word.trim());
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }

    /// Look up an already-normalized word.
    pub fn lookup(&self, normalized: &str) -> Option<&WordMapEntry> {
        self.entries.get(normalized)
    }

    pub fn lemma_for(&self, normalized: &str) -> Option<&str> {
        self.lookup(normalized).map(|e| e.lemma.as_str()).filter(|l| !l.is_empty())
    }

    pub fn root_for(&self, normalized: &str) -> Option<&str> {
        self.lookup(normalized).and_then(|e| e.root.as_deref()).filter(|r| !r.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
