//! Word-level morphology aligned with verse text

use crate::normalize::{normalize_arabic, split_words};
use crate::verse::Verse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Morphology record as shipped in the dataset: per-word lemmas and roots,
/// positionally aligned with the words of the verse text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphologyAya {
    pub gid: u64,
    #[serde(default)]
    pub lemmas: Vec<Option<String>>,
    #[serde(default)]
    pub roots: Vec<Option<String>>,
}

/// One word of a verse with its (optional) lemma and root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedWord {
    pub idx: usize,
    pub word: String,
    pub lemma: Option<String>,
    pub root: Option<String>,
    lemma_key: Option<String>,
    root_key: Option<String>,
}

impl AlignedWord {
    pub fn new(idx: usize, word: &str, lemma: Option<&str>, root: Option<&str>) -> Self {
        let lemma = lemma.map(str::trim).filter(|s| !s.is_empty());
        let root = root.map(str::trim).filter(|s| !s.is_empty());
        Self {
            idx,
            word: word.to_string(),
            lemma: lemma.map(str::to_string),
            root: root.map(str::to_string),
            lemma_key: lemma.map(normalize_arabic),
            root_key: root.map(normalize_arabic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenField {
    Lemma,
    Root,
}

impl TokenField {
    /// Normalized substring containment against the field value.
    pub fn contains(&self, token: &AlignedWord, needle: &str) -> bool {
        !needle.is_empty() && self.key(token).is_some_and(|k| k.contains(needle))
    }

    /// Normalized form of the field value, as used for matching.
    pub fn key<'a>(&self, token: &'a AlignedWord) -> Option<&'a str> {
        match self {
            TokenField::Lemma => token.lemma_key.as_deref(),
            TokenField::Root => token.root_key.as_deref(),
        }
    }
}

/// Verse words paired with their morphology, keyed by `gid`.
///
/// Alignment is positional: the i-th whitespace-separated word of the verse's
/// display text takes `lemmas[i]` and `roots[i]`. The dataset is trusted to be
/// aligned; missing tails simply leave later words without analysis.
#[derive(Debug, Default)]
pub struct MorphologyIndex {
    words: HashMap<u64, Vec<AlignedWord>>,
    analysed: usize,
}

impl MorphologyIndex {
    pub fn build(corpus: &[Verse], entries: Vec<MorphologyAya>) -> Self {
        let mut by_gid: HashMap<u64, MorphologyAya> = HashMap::with_capacity(entries.len());
        for entry in entries {
            by_gid.entry(entry.gid).or_insert(entry);
        }

        let mut words = HashMap::with_capacity(corpus.len());
        let mut analysed = 0;
        for verse in corpus {
            let entry = by_gid.get(&verse.gid);
            let surface = split_words(verse.display_text());

            if let Some(entry) = entry {
                analysed += 1;
                let analysis_len = entry.lemmas.len().max(entry.roots.len());
                if analysis_len > surface.len() {
                    tracing::warn!(
                        gid = verse.gid,
                        words = surface.len(),
                        analysis = analysis_len,
                        "morphology longer than verse text, extra entries ignored"
                    );
                }
            }

            let aligned: Vec<AlignedWord> = surface
                .iter()
                .enumerate()
                .map(|(idx, word)| {
                    let lemma = entry.and_then(|e| e.lemmas.get(idx)).and_then(|l| l.as_deref());
                    let root = entry.and_then(|e| e.roots.get(idx)).and_then(|r| r.as_deref());
                    AlignedWord::new(idx, word, lemma, root)
                })
                .collect();

            words.insert(verse.gid, aligned);
        }

        Self { words, analysed }
    }

    pub fn get(&self, gid: u64) -> Option<&[AlignedWord]> {
        self.words.get(&gid).map(Vec::as_slice)
    }

    /// Number of verses that had a morphology entry.
    pub fn analysed_count(&self) -> usize {
        self.analysed
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
