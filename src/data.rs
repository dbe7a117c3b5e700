//! Dataset loading with per-instance memoization
//!
//! The search core only ever sees parsed, in-memory data. Where the JSON comes
//! from is behind `DataSource`; `DatasetCache` parses each dataset once and
//! hands out shared references afterwards.

use crate::error::{Result, SearchError};
use crate::morphology::MorphologyAya;
use crate::verse::Verse;
use crate::word_map::WordMap;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKey {
    Corpus,
    Morphology,
    WordMap,
}

impl DatasetKey {
    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKey::Corpus => "quran.json",
            DatasetKey::Morphology => "morphology.json",
            DatasetKey::WordMap => "word_map.json",
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Raw JSON for a dataset.
    async fn load(&self, key: DatasetKey) -> Result<String>;
}

/// Reads `<dir>/<dataset file name>`.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn load(&self, key: DatasetKey) -> Result<String> {
        let path = self.dir.join(key.file_name());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SearchError::Data(format!("failed to read {:?}: {}", path, e)))
    }
}

/// Serves datasets held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    datasets: HashMap<DatasetKey, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: DatasetKey, json: impl Into<String>) -> Self {
        self.datasets.insert(key, json.into());
        self
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn load(&self, key: DatasetKey) -> Result<String> {
        self.datasets
            .get(&key)
            .cloned()
            .ok_or_else(|| SearchError::NotFound(format!("dataset {}", key.file_name())))
    }
}

/// Get-or-load cache over a `DataSource`. Each dataset is fetched and parsed
/// at most once per cache instance; a failed load is retried on next access.
pub struct DatasetCache<S> {
    source: S,
    corpus: OnceCell<Arc<Vec<Verse>>>,
    morphology: OnceCell<Arc<Vec<MorphologyAya>>>,
    word_map: OnceCell<Arc<WordMap>>,
    fetches: AtomicUsize,
}

impl<S: DataSource> DatasetCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            corpus: OnceCell::new(),
            morphology: OnceCell::new(),
            word_map: OnceCell::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub async fn corpus(&self) -> Result<Arc<Vec<Verse>>> {
        self.corpus
            .get_or_try_init(|| async {
                let raw = self.fetch(DatasetKey::Corpus).await?;
                let verses: Vec<Verse> = serde_json::from_str(&raw)?;
                tracing::info!(verses = verses.len(), "loaded corpus");
                Ok::<_, SearchError>(Arc::new(verses))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn morphology(&self) -> Result<Arc<Vec<MorphologyAya>>> {
        self.morphology
            .get_or_try_init(|| async {
                let raw = self.fetch(DatasetKey::Morphology).await?;
                let entries: Vec<MorphologyAya> = serde_json::from_str(&raw)?;
                tracing::info!(entries = entries.len(), "loaded morphology");
                Ok::<_, SearchError>(Arc::new(entries))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn word_map(&self) -> Result<Arc<WordMap>> {
        self.word_map
            .get_or_try_init(|| async {
                let raw = self.fetch(DatasetKey::WordMap).await?;
                let map = WordMap::from_json(&raw)?;
                tracing::info!(words = map.len(), "loaded word map");
                Ok::<_, SearchError>(Arc::new(map))
            })
            .await
            .map(Arc::clone)
    }

    /// Number of times the underlying source was hit.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn fetch(&self, key: DatasetKey) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.source.load(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"[{
        "gid": 1, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 1,
        "page": 1, "juz": 1, "standard": "بسم الله الرحمن الرحيم"
    }]"#;

    #[tokio::test]
    async fn loads_each_dataset_once() {
        let cache = DatasetCache::new(MemorySource::new().with(DatasetKey::Corpus, CORPUS));

        let first = cache.corpus().await.unwrap();
        let second = cache.corpus().await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn independent_caches_do_not_share_state() {
        let a = DatasetCache::new(MemorySource::new().with(DatasetKey::Corpus, CORPUS));
        let b = DatasetCache::new(MemorySource::new().with(DatasetKey::Corpus, "[]"));
        assert_eq!(a.corpus().await.unwrap().len(), 1);
        assert_eq!(b.corpus().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_dataset_is_not_found_and_retried() {
        let cache = DatasetCache::new(MemorySource::new());
        assert!(matches!(cache.word_map().await, Err(SearchError::NotFound(_))));
        assert!(cache.word_map().await.is_err());
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let cache = DatasetCache::new(MemorySource::new().with(DatasetKey::Morphology, "{not json"));
        assert!(matches!(cache.morphology().await, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn file_source_reads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quran.json"), CORPUS).unwrap();
        std::fs::write(dir.path().join("word_map.json"), r#"{"قال": {"lemma": "قول"}}"#).unwrap();

        let cache = DatasetCache::new(FileSource::new(dir.path()));
        assert_eq!(cache.corpus().await.unwrap()[0].gid, 1);
        assert_eq!(cache.word_map().await.unwrap().lemma_for("قال"), Some("قول"));
        assert!(matches!(cache.morphology().await, Err(SearchError::Data(_))));
    }
}
