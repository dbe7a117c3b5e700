//! Quran Search - linguistic verse search
//!
//! Exact text, lemma and root search over the Quran corpus, with per-verse
//! highlight segmentation of the words that justify each match.

// Normalization and the morphology alignment are used by everything below
pub mod normalize;
pub mod verse;
pub mod morphology;
pub mod word_map;
pub mod fuzzy;
pub mod highlight;
pub mod search;
pub mod cache;
pub mod session;
pub mod data;
pub mod config;
pub mod error;
pub mod state;

pub use cache::{MatchTokenCache, TokenKey};
pub use config::{ScoreWeights, SearchConfig};
pub use data::{DataSource, DatasetCache, DatasetKey, FileSource, MemorySource};
pub use error::{Result, SearchError};
pub use fuzzy::{FuzzyField, FuzzyIndex, FuzzyLookup};
pub use highlight::{highlight, Segment, SegmentKind};
pub use morphology::{AlignedWord, MorphologyAya, MorphologyIndex, TokenField};
pub use normalize::{clean_query, normalize_arabic};
pub use search::{
    fuzzy_tokens, highlight_verse, match_tokens, positive_tokens, search, MatchTokens, MatchType, ScoredResult,
    SearchContext, SearchCounts, SearchOptions, SearchResults, TokenMode,
};
pub use session::SearchSession;
pub use state::AppState;
pub use verse::Verse;
pub use word_map::{WordMap, WordMapEntry};
