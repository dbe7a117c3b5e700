//! Stateful search session: the current result set and its highlight tokens
//!
//! Every search gets a generation number. Results are only installed as the
//! session's current set if no newer search has been installed meanwhile, so
//! a slow query can never overwrite a faster, later one.

use crate::cache::{MatchTokenCache, TokenKey};
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::fuzzy::FuzzyLookup;
use crate::highlight::Segment;
use crate::search::{match_tokens, search, MatchTokens, SearchContext, SearchOptions, SearchResults};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Current {
    generation: u64,
    results: Option<Arc<SearchResults>>,
}

pub struct SearchSession {
    ctx: Arc<SearchContext>,
    fuzzy: Option<Arc<dyn FuzzyLookup>>,
    config: SearchConfig,
    next_generation: AtomicU64,
    current: Mutex<Current>,
    tokens: MatchTokenCache,
}

impl SearchSession {
    pub fn new(ctx: Arc<SearchContext>, fuzzy: Option<Arc<dyn FuzzyLookup>>, config: SearchConfig) -> Self {
        let tokens = MatchTokenCache::new(config.token_cache_capacity);
        Self {
            ctx,
            fuzzy,
            config,
            next_generation: AtomicU64::new(0),
            current: Mutex::new(Current::default()),
            tokens,
        }
    }

    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Installs `results` unless a newer generation already is current.
    fn install(&self, mut results: SearchResults, generation: u64) -> Arc<SearchResults> {
        results.generation = generation;
        let results = Arc::new(results);

        let mut current = self.lock();
        if generation > current.generation {
            current.generation = generation;
            current.results = Some(Arc::clone(&results));
            drop(current);
            self.tokens.clear();
        } else {
            tracing::debug!(generation, current = current.generation, "discarding superseded results");
        }
        results
    }

    /// Run a search on the calling thread.
    pub fn search(&self, query: &str, options: SearchOptions) -> Arc<SearchResults> {
        let generation = self.begin();
        let results = search(&self.ctx, query, options, self.fuzzy.as_deref(), &self.config);
        self.install(results, generation)
    }

    /// Run a search on Tokio's blocking pool, keeping the corpus scan off the
    /// caller's task. The returned results are the ones for this query; check
    /// `is_current` before acting on them.
    pub async fn search_async(self: &Arc<Self>, query: String, options: SearchOptions) -> Result<Arc<SearchResults>> {
        let generation = self.begin();
        let session = Arc::clone(self);
        let results = tokio::task::spawn_blocking(move || {
            search(&session.ctx, &query, options, session.fuzzy.as_deref(), &session.config)
        })
        .await
        .map_err(|e| SearchError::Other(format!("search task failed: {}", e)))?;

        Ok(self.install(results, generation))
    }

    pub fn current(&self) -> Option<Arc<SearchResults>> {
        self.lock().results.clone()
    }

    /// Whether `results` is the session's current result set.
    pub fn is_current(&self, results: &SearchResults) -> bool {
        self.lock().generation == results.generation
    }

    /// Highlight tokens for a verse of the current result set.
    pub fn match_tokens(&self, gid: u64) -> Option<Arc<MatchTokens>> {
        let current = self.current()?;
        if !current.contains(gid) {
            return None;
        }

        self.tokens.get_or_load(TokenKey::new(current.generation, gid), || {
            match_tokens(
                &self.ctx,
                gid,
                &current.query,
                current.lemma.as_deref(),
                current.root.as_deref(),
                self.config.fuzzy_distance,
            )
        })
    }

    /// Display text of a result verse split into highlight segments.
    pub fn highlight(&self, gid: u64) -> Option<Vec<Segment>> {
        let tokens = self.match_tokens(gid)?;
        let verse = self.ctx.verse(gid)?;
        Some(tokens.highlight(verse.display_text()))
    }

    /// `(entries, capacity)` of the highlight token cache.
    pub fn token_cache_stats(&self) -> (usize, usize) {
        self.tokens.stats()
    }
}
