//! Application state: loaded datasets, search context and fuzzy index

use crate::config::SearchConfig;
use crate::data::{DataSource, DatasetCache, FileSource};
use crate::error::{Result, SearchError};
use crate::fuzzy::{FuzzyIndex, FuzzyLookup};
use crate::highlight::Segment;
use crate::morphology::MorphologyIndex;
use crate::search::{highlight_verse, search, SearchContext, SearchOptions, SearchResults};
use crate::session::SearchSession;
use std::sync::Arc;

/// Everything a server needs to answer searches. Immutable once loaded and
/// shared between requests.
pub struct AppState {
    pub context: Arc<SearchContext>,
    pub fuzzy: Option<Arc<dyn FuzzyLookup>>,
    pub config: SearchConfig,
}

impl AppState {
    /// Load the datasets from `config.data_dir` and build the indexes.
    pub async fn load(config: SearchConfig) -> Result<Self> {
        let cache = DatasetCache::new(FileSource::new(&config.data_dir));
        Self::from_cache(&cache, config).await
    }

    /// Build state from any data source. The corpus is required; a missing
    /// morphology or word map only disables lemma/root search.
    pub async fn from_cache<S: DataSource>(cache: &DatasetCache<S>, config: SearchConfig) -> Result<Self> {
        let corpus = cache.corpus().await?;

        let morphology = match cache.morphology().await {
            Ok(entries) => entries.as_ref().clone(),
            Err(e) => {
                tracing::warn!(error = %e, "morphology unavailable, lemma/root highlighting disabled");
                Vec::new()
            }
        };
        let word_map = match cache.word_map().await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "word map unavailable, lemma/root search disabled");
                Arc::default()
            }
        };

        let distance = config.fuzzy_distance;
        let (context, fuzzy) = tokio::task::spawn_blocking(move || {
            let index = MorphologyIndex::build(&corpus, morphology);
            let fuzzy: Option<Arc<dyn FuzzyLookup>> = match FuzzyIndex::build(&corpus, &index, distance) {
                Ok(fuzzy) => Some(Arc::new(fuzzy)),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build fuzzy index, lemma/root search disabled");
                    None
                }
            };
            (SearchContext::new(corpus, Arc::new(index), word_map), fuzzy)
        })
        .await
        .map_err(|e| SearchError::Index(format!("index build task failed: {}", e)))?;

        tracing::info!(
            verses = context.corpus().len(),
            analysed = context.morphology().analysed_count(),
            fuzzy = fuzzy.is_some(),
            "search state ready"
        );

        Ok(Self { context: Arc::new(context), fuzzy, config })
    }

    pub fn verse_count(&self) -> usize {
        self.context.corpus().len()
    }

    pub fn search(&self, query: &str, options: SearchOptions) -> SearchResults {
        search(&self.context, query, options, self.fuzzy.as_deref(), &self.config)
    }

    /// Highlight segments for verse `gid` under `query`, or `None` for an
    /// unknown verse.
    pub fn highlight(&self, gid: u64, query: &str, options: SearchOptions) -> Option<Vec<Segment>> {
        highlight_verse(&self.context, gid, query, options, self.config.fuzzy_distance)
    }

    /// A fresh session over this state, for a single interactive user.
    pub fn session(&self) -> SearchSession {
        SearchSession::new(Arc::clone(&self.context), self.fuzzy.clone(), self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatasetKey, MemorySource};

    const CORPUS: &str = r#"[
        {"gid": 1, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 1, "page": 1, "juz": 1,
         "standard": "بسم الله الرحمن الرحيم"},
        {"gid": 2, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 2, "page": 1, "juz": 1,
         "standard": "الحمد لله رب العالمين"}
    ]"#;

    const MORPHOLOGY: &str = r#"[
        {"gid": 1, "lemmas": ["اسم", "الله", "رحمن", "رحيم"], "roots": ["س-م-و", "أ-ل-ه", "ر-ح-م", "ر-ح-م"]},
        {"gid": 2, "lemmas": ["حمد", "الله", "رب", "عالم"], "roots": ["ح-م-د", "أ-ل-ه", "ر-ب-ب", "ع-ل-م"]}
    ]"#;

    const WORD_MAP: &str = r#"{"الرحيم": {"lemma": "رحيم", "root": "ر-ح-م"}}"#;

    #[tokio::test]
    async fn loads_from_memory_source() {
        let source = MemorySource::new()
            .with(DatasetKey::Corpus, CORPUS)
            .with(DatasetKey::Morphology, MORPHOLOGY)
            .with(DatasetKey::WordMap, WORD_MAP);
        let state = AppState::from_cache(&DatasetCache::new(source), SearchConfig::default())
            .await
            .unwrap();

        assert_eq!(state.verse_count(), 2);
        assert!(state.fuzzy.is_some());

        let results = state.search("الرحيم", SearchOptions { lemma: true, root: true });
        assert_eq!(results.root.as_deref(), Some("ر-ح-م"));
        assert_eq!(results.results[0].verse.gid, 1);
    }

    #[tokio::test]
    async fn missing_corpus_is_an_error() {
        let source = MemorySource::new().with(DatasetKey::WordMap, WORD_MAP);
        let result = AppState::from_cache(&DatasetCache::new(source), SearchConfig::default()).await;
        assert!(matches!(result, Err(SearchError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_morphology_still_serves_text_search() {
        let source = MemorySource::new().with(DatasetKey::Corpus, CORPUS);
        let state = AppState::from_cache(&DatasetCache::new(source), SearchConfig::default())
            .await
            .unwrap();

        let results = state.search("الحمد", SearchOptions { lemma: true, root: true });
        assert_eq!(results.counts.exact, 1);
        assert!(results.lemma.is_none());
        assert!(state.highlight(99, "الحمد", SearchOptions::default()).is_none());
    }
}
