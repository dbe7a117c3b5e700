//! Verse search: exact text, lemma and root matching merged into one ranking

use crate::config::{ScoreWeights, SearchConfig};
use crate::fuzzy::{FuzzyField, FuzzyLookup};
use crate::highlight::{highlight, Segment};
use crate::morphology::{AlignedWord, MorphologyAya, MorphologyIndex, TokenField};
use crate::normalize::{clean_query, normalize_arabic, split_words};
use crate::verse::Verse;
use crate::word_map::WordMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which morphological expansions to run. Exact text matching always runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub lemma: bool,
    pub root: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Lemma,
    Root,
    Fuzzy,
    #[default]
    None,
}

impl MatchType {
    fn rank(self) -> u8 {
        match self {
            MatchType::Exact => 4,
            MatchType::Lemma => 3,
            MatchType::Root => 2,
            MatchType::Fuzzy => 1,
            MatchType::None => 0,
        }
    }
}

/// How `positive_tokens` decides that a word justifies a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    Text,
    Lemma,
    Root,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub verse: Verse,
    pub match_score: f32,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounts {
    #[serde(alias = "simple")]
    pub exact: usize,
    pub lemma: usize,
    pub root: usize,
    pub fuzzy: usize,
    pub total: usize,
}

impl SearchCounts {
    /// Count of plain-text matches, under the name the UI uses.
    pub fn simple(&self) -> usize {
        self.exact
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Cleaned, normalized query.
    pub query: String,
    pub options: SearchOptions,
    /// Lemma the query resolved to, when lemma search ran.
    pub lemma: Option<String>,
    /// Root the query resolved to, when root search ran.
    pub root: Option<String>,
    pub results: Vec<ScoredResult>,
    pub counts: SearchCounts,
    pub elapsed_ms: u64,
    #[serde(skip)]
    pub generation: u64,
}

impl SearchResults {
    pub fn empty(query: String, options: SearchOptions) -> Self {
        Self {
            query,
            options,
            lemma: None,
            root: None,
            results: Vec::new(),
            counts: SearchCounts::default(),
            elapsed_ms: 0,
            generation: 0,
        }
    }

    pub fn contains(&self, gid: u64) -> bool {
        self.results.iter().any(|r| r.verse.gid == gid)
    }
}

/// Words of one verse that justify its match, grouped by highlight style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTokens {
    pub direct: Vec<String>,
    pub related: Vec<String>,
    pub fuzzy: Vec<String>,
}

impl MatchTokens {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.related.is_empty() && self.fuzzy.is_empty()
    }

    pub fn highlight(&self, text: &str) -> Vec<Segment> {
        let direct: Vec<&str> = self.direct.iter().map(String::as_str).collect();
        let related: Vec<&str> = self.related.iter().map(String::as_str).collect();
        let fuzzy: Vec<&str> = self.fuzzy.iter().map(String::as_str).collect();
        highlight(text, &direct, &related, &fuzzy)
    }
}

/// Read-only search data: corpus, aligned morphology and word map, plus the
/// normalized text of every verse.
pub struct SearchContext {
    corpus: Arc<Vec<Verse>>,
    morphology: Arc<MorphologyIndex>,
    word_map: Arc<WordMap>,
    normalized: Vec<String>,
    positions: HashMap<u64, usize>,
}

impl SearchContext {
    /// # Panics
    ///
    /// If two verses share a `gid`, or `morphology` was not built from this
    /// corpus. Both are caller bugs, not data conditions.
    pub fn new(corpus: Arc<Vec<Verse>>, morphology: Arc<MorphologyIndex>, word_map: Arc<WordMap>) -> Self {
        let positions: HashMap<u64, usize> = corpus.iter().enumerate().map(|(pos, v)| (v.gid, pos)).collect();
        assert_eq!(positions.len(), corpus.len(), "corpus contains duplicate gids");
        assert!(
            corpus.iter().all(|v| morphology.get(v.gid).is_some()),
            "morphology index was built for a different corpus"
        );

        let normalized = corpus
            .iter()
            .map(|v| {
                let text = normalize_arabic(v.display_text());
                split_words(&text).join(" ")
            })
            .collect();

        Self { corpus, morphology, word_map, normalized, positions }
    }

    pub fn from_parts(corpus: Vec<Verse>, morphology: Vec<MorphologyAya>, word_map: WordMap) -> Self {
        let index = MorphologyIndex::build(&corpus, morphology);
        Self::new(Arc::new(corpus), Arc::new(index), Arc::new(word_map))
    }

    pub fn corpus(&self) -> &[Verse] {
        &self.corpus
    }

    pub fn morphology(&self) -> &MorphologyIndex {
        &self.morphology
    }

    pub fn word_map(&self) -> &WordMap {
        &self.word_map
    }

    pub fn verse(&self, gid: u64) -> Option<&Verse> {
        self.positions.get(&gid).map(|&pos| &self.corpus[pos])
    }

    /// Lemma and root targets for a normalized query under `options`.
    pub fn resolve_targets(&self, normalized_query: &str, options: SearchOptions) -> (Option<String>, Option<String>) {
        let lemma = options
            .lemma
            .then(|| self.word_map.lemma_for(normalized_query))
            .flatten()
            .map(normalize_arabic);
        let root = options
            .root
            .then(|| self.word_map.root_for(normalized_query))
            .flatten()
            .map(normalize_arabic);
        (lemma, root)
    }

    fn exact_matches(&self, query: &str, cap: usize) -> Vec<usize> {
        let phrase = query.contains(' ');
        self.normalized
            .iter()
            .enumerate()
            .filter(|(_, text)| {
                if phrase {
                    text.contains(query)
                } else {
                    text.split(' ').any(|word| word.contains(query))
                }
            })
            .map(|(pos, _)| pos)
            .take(cap)
            .collect()
    }
}

/// Distinct raw words of `verse` that justify a match in `mode`.
///
/// `query` and the targets may be raw; they are normalized here. Lemma and
/// root modes read `words` (the verse's aligned morphology) and return the
/// surface words, not the lemmas. Positions past the analysed tail never match.
pub fn positive_tokens(
    verse: &Verse,
    words: Option<&[AlignedWord]>,
    mode: TokenMode,
    target_lemma: Option<&str>,
    target_root: Option<&str>,
    query: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    let mut keep = |word: &str| {
        if seen.insert(word.to_string()) {
            tokens.push(word.to_string());
        }
    };

    match mode {
        TokenMode::Text => {
            let query = clean_query(query);
            let needles: Vec<&str> = query.split(' ').filter(|n| !n.is_empty()).collect();
            if needles.is_empty() {
                return Vec::new();
            }
            for word in split_words(verse.display_text()) {
                let key = normalize_arabic(word);
                if needles.iter().any(|n| key.contains(n)) {
                    keep(word);
                }
            }
        }
        TokenMode::Lemma | TokenMode::Root => {
            let (field, target) = match mode {
                TokenMode::Lemma => (TokenField::Lemma, target_lemma),
                _ => (TokenField::Root, target_root),
            };
            let Some(target) = target.map(normalize_arabic).filter(|t| !t.is_empty()) else {
                return Vec::new();
            };
            for word in words.unwrap_or_default() {
                if field.contains(word, &target) {
                    keep(&word.word);
                }
            }
        }
    }

    tokens
}

/// Words whose lemma/root is within `max_distance` edits of `target` without
/// containing it. A swap of two adjacent letters counts as one edit, as it
/// does in the index's Levenshtein automaton.
pub fn fuzzy_tokens(words: Option<&[AlignedWord]>, field: FuzzyField, target: &str, max_distance: u8) -> Vec<String> {
    let target = normalize_arabic(target);
    if target.is_empty() || max_distance == 0 {
        return Vec::new();
    }
    let field = field.token_field();

    let mut seen = HashSet::new();
    words
        .unwrap_or_default()
        .iter()
        .filter(|w| {
            field.key(w).is_some_and(|key| {
                !key.contains(target.as_str()) && strsim::osa_distance(key, &target) <= max_distance as usize
            })
        })
        .filter(|w| seen.insert(w.word.clone()))
        .map(|w| w.word.clone())
        .collect()
}

/// Direct, related and fuzzy tokens for verse `gid` under a query.
pub fn match_tokens(
    ctx: &SearchContext,
    gid: u64,
    normalized_query: &str,
    lemma: Option<&str>,
    root: Option<&str>,
    max_distance: u8,
) -> Option<MatchTokens> {
    let verse = ctx.verse(gid)?;
    let words = ctx.morphology().get(gid);

    let direct = positive_tokens(verse, words, TokenMode::Text, None, None, normalized_query);

    let mut related = Vec::new();
    if lemma.is_some() {
        related.extend(positive_tokens(verse, words, TokenMode::Lemma, lemma, None, normalized_query));
    }
    if root.is_some() {
        related.extend(positive_tokens(verse, words, TokenMode::Root, None, root, normalized_query));
    }
    dedup_preserving_order(&mut related);

    let mut fuzzy = Vec::new();
    if let Some(lemma) = lemma {
        fuzzy.extend(fuzzy_tokens(words, FuzzyField::Lemma, lemma, max_distance));
    }
    if let Some(root) = root {
        fuzzy.extend(fuzzy_tokens(words, FuzzyField::Root, root, max_distance));
    }
    dedup_preserving_order(&mut fuzzy);
    fuzzy.retain(|t| !direct.contains(t) && !related.contains(t));

    Some(MatchTokens { direct, related, fuzzy })
}

/// Highlight segments for verse `gid` under a raw query, without a session.
pub fn highlight_verse(
    ctx: &SearchContext,
    gid: u64,
    query: &str,
    options: SearchOptions,
    max_distance: u8,
) -> Option<Vec<Segment>> {
    let normalized = clean_query(query);
    let (lemma, root) = ctx.resolve_targets(&normalized, options);
    let tokens = match_tokens(ctx, gid, &normalized, lemma.as_deref(), root.as_deref(), max_distance)?;
    Some(tokens.highlight(ctx.verse(gid)?.display_text()))
}

fn dedup_preserving_order(tokens: &mut Vec<String>) {
    let mut seen = HashSet::new();
    tokens.retain(|t| seen.insert(t.clone()));
}

struct Merged {
    pos: usize,
    score: f32,
    match_type: MatchType,
}

/// Merges per-mode hits by corpus position. A verse seen again accumulates
/// score and can only move up in classification.
#[derive(Default)]
struct ResultMerger {
    merged: Vec<Merged>,
    slots: HashMap<usize, usize>,
}

impl ResultMerger {
    fn merge(&mut self, pos: usize, match_type: MatchType, contribution: f32) {
        match self.slots.get(&pos) {
            Some(&slot) => {
                let entry = &mut self.merged[slot];
                entry.score += contribution;
                if match_type.rank() > entry.match_type.rank() {
                    entry.match_type = match_type;
                }
            }
            None => {
                self.slots.insert(pos, self.merged.len());
                self.merged.push(Merged { pos, score: contribution, match_type });
            }
        }
    }

    /// Score descending, corpus order on ties.
    fn into_sorted(mut self) -> Vec<Merged> {
        self.merged.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.pos.cmp(&b.pos)));
        self.merged
    }
}

fn contribution(base: f32, per_token: f32, tokens: usize) -> f32 {
    base + per_token * tokens as f32
}

/// Run one morphology mode: fetch candidates from the fuzzy index and split
/// them into real lemma/root hits and near misses. Returns
/// `(hits, near_misses)` as `(position, token count)` pairs.
fn morphology_matches(
    ctx: &SearchContext,
    fuzzy: &dyn FuzzyLookup,
    field: FuzzyField,
    target: &str,
    cap: usize,
    max_distance: u8,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let gids = match fuzzy.query_by_field(field, target, cap) {
        Ok(gids) => gids,
        Err(e) => {
            tracing::warn!(error = %e, ?field, "fuzzy lookup failed, skipping mode");
            return (Vec::new(), Vec::new());
        }
    };

    let mode = match field {
        FuzzyField::Lemma => TokenMode::Lemma,
        FuzzyField::Root => TokenMode::Root,
    };

    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    let mut near = Vec::new();
    for gid in gids {
        let Some(&pos) = ctx.positions.get(&gid) else {
            continue;
        };
        if !seen.insert(pos) {
            continue;
        }
        let verse = &ctx.corpus[pos];
        let words = ctx.morphology.get(gid);
        let positive = positive_tokens(verse, words, mode, Some(target), Some(target), "");
        if !positive.is_empty() {
            hits.push((pos, positive.len()));
        } else {
            // A candidate with nothing to highlight is not a match.
            let tokens = fuzzy_tokens(words, field, target, max_distance).len();
            if tokens > 0 {
                near.push((pos, tokens));
            }
        }
    }
    (hits, near)
}

/// Search the corpus for `query`.
///
/// Exact matching always runs; lemma and root matching run when enabled in
/// `options`, the word map knows the query, and a fuzzy index is supplied.
/// Queries without Arabic letters yield an empty result.
pub fn search(
    ctx: &SearchContext,
    query: &str,
    options: SearchOptions,
    fuzzy: Option<&dyn FuzzyLookup>,
    config: &SearchConfig,
) -> SearchResults {
    let start = std::time::Instant::now();
    let normalized = clean_query(query);
    if normalized.is_empty() {
        return SearchResults::empty(normalized, options);
    }

    let cap = config.max_results;
    let weights: &ScoreWeights = &config.weights;
    let (lemma, root) = ctx.resolve_targets(&normalized, options);

    let exact = ctx.exact_matches(&normalized, cap);

    let mut lemma_hits = (Vec::new(), Vec::new());
    let mut root_hits = (Vec::new(), Vec::new());
    match fuzzy {
        Some(index) => {
            if let Some(target) = lemma.as_deref() {
                lemma_hits = morphology_matches(ctx, index, FuzzyField::Lemma, target, cap, config.fuzzy_distance);
            }
            if let Some(target) = root.as_deref() {
                root_hits = morphology_matches(ctx, index, FuzzyField::Root, target, cap, config.fuzzy_distance);
            }
        }
        None if lemma.is_some() || root.is_some() => {
            tracing::debug!("no fuzzy index available, lemma/root search skipped");
        }
        None => {}
    }

    let mut merger = ResultMerger::default();
    for &pos in &exact {
        let verse = &ctx.corpus[pos];
        let tokens = positive_tokens(verse, None, TokenMode::Text, None, None, &normalized).len();
        merger.merge(pos, MatchType::Exact, contribution(weights.exact_base, weights.exact_per_token, tokens));
    }
    for &(pos, tokens) in &lemma_hits.0 {
        merger.merge(pos, MatchType::Lemma, contribution(weights.lemma_base, weights.lemma_per_token, tokens));
    }
    for &(pos, tokens) in &root_hits.0 {
        merger.merge(pos, MatchType::Root, contribution(weights.root_base, weights.root_per_token, tokens));
    }
    for &(pos, tokens) in lemma_hits.1.iter().chain(&root_hits.1) {
        merger.merge(pos, MatchType::Fuzzy, contribution(weights.fuzzy_base, weights.fuzzy_per_token, tokens));
    }

    let fuzzy_count = lemma_hits
        .1
        .iter()
        .chain(&root_hits.1)
        .map(|&(pos, _)| pos)
        .collect::<HashSet<_>>()
        .len();

    let results: Vec<ScoredResult> = merger
        .into_sorted()
        .into_iter()
        .map(|m| ScoredResult {
            verse: ctx.corpus[m.pos].clone(),
            match_score: m.score,
            match_type: m.match_type,
        })
        .collect();

    let counts = SearchCounts {
        exact: exact.len(),
        lemma: lemma_hits.0.len(),
        root: root_hits.0.len(),
        fuzzy: fuzzy_count,
        total: results.len(),
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(
        query = %normalized,
        exact = counts.exact,
        lemma = counts.lemma,
        root = counts.root,
        fuzzy = counts.fuzzy,
        total = counts.total,
        elapsed_ms,
        "search finished"
    );

    SearchResults {
        query: normalized,
        options,
        lemma,
        root,
        results,
        counts,
        elapsed_ms,
        generation: 0,
    }
}
