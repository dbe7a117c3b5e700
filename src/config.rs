//! Search configuration

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cap applied to each match list (exact, lemma, root) before merging.
pub const DEFAULT_MAX_RESULTS: usize = 500;
/// Default number of verses whose highlight tokens are kept per query.
pub const DEFAULT_TOKEN_CACHE_CAPACITY: usize = 256;

pub const CONFIG_PATH_ENV: &str = "QURAN_SEARCH_CONFIG";
pub const DATA_DIR_ENV: &str = "QURAN_SEARCH_DATA_DIR";

/// Score contributed by each match mode: a base for appearing in the mode's
/// list plus a weight per matched word. Bases are strictly ordered
/// exact > lemma > root > fuzzy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub exact_base: f32,
    pub exact_per_token: f32,
    pub lemma_base: f32,
    pub lemma_per_token: f32,
    pub root_base: f32,
    pub root_per_token: f32,
    pub fuzzy_base: f32,
    pub fuzzy_per_token: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            exact_base: 100.0,
            exact_per_token: 3.0,
            lemma_base: 70.0,
            lemma_per_token: 2.0,
            root_base: 50.0,
            root_per_token: 1.0,
            fuzzy_base: 20.0,
            fuzzy_per_token: 0.5,
        }
    }
}

impl ScoreWeights {
    fn validate(&self) -> Result<()> {
        let all = [
            self.exact_base,
            self.exact_per_token,
            self.lemma_base,
            self.lemma_per_token,
            self.root_base,
            self.root_per_token,
            self.fuzzy_base,
            self.fuzzy_per_token,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SearchError::Config("score weights must be finite and non-negative".to_string()));
        }
        if !(self.exact_base > self.lemma_base && self.lemma_base > self.root_base && self.root_base > self.fuzzy_base) {
            return Err(SearchError::Config(
                "score bases must be ordered exact > lemma > root > fuzzy".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    /// Levenshtein distance for lemma/root lookups (0 disables fuzziness).
    pub fuzzy_distance: u8,
    pub token_cache_capacity: usize,
    pub data_dir: PathBuf,
    pub weights: ScoreWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            fuzzy_distance: 1,
            token_cache_capacity: DEFAULT_TOKEN_CACHE_CAPACITY,
            data_dir: default_data_dir(),
            weights: ScoreWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("failed to read {:?}: {}", path, e)))?;
        let config: SearchConfig = serde_json::from_str(&raw)
            .map_err(|e| SearchError::Config(format!("invalid config {:?}: {}", path, e)))?;
        config.validated()
    }

    /// Config file named by `QURAN_SEARCH_CONFIG` if set, otherwise defaults;
    /// `QURAN_SEARCH_DATA_DIR` overrides the data directory either way.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config.validated()
    }

    pub fn validated(mut self) -> Result<Self> {
        if self.max_results == 0 {
            return Err(SearchError::Config("max_results must be at least 1".to_string()));
        }
        self.weights.validate()?;
        self.fuzzy_distance = self.fuzzy_distance.min(crate::fuzzy::MAX_EDIT_DISTANCE);
        self.token_cache_capacity = self.token_cache_capacity.max(1);
        Ok(self)
    }
}

/// Data directory: a `data/` folder in the working tree during development,
/// otherwise the platform data directory.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_path = PathBuf::from("data");
        if dev_path.join(crate::data::DatasetKey::Corpus.file_name()).exists() {
            return dev_path;
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("quran-search");
    }

    PathBuf::from("data")
}
