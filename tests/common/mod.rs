//! Shared fixtures for integration tests

#![allow(dead_code)]

use quran_search::{
    AppState, DatasetCache, DatasetKey, MemorySource, MorphologyAya, SearchConfig, SearchContext, Verse, WordMap,
};

pub const CORPUS: &str = r#"[
    {"gid": 7, "sura_id": 2, "sura_name": "البقرة", "aya_id": 1, "page": 2, "juz": 1,
     "standard": "ويقول الذين كفروا"},
    {"gid": 42, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 1, "page": 1, "juz": 1,
     "standard": "بسم الله الرحمن الرحيم"},
    {"gid": 43, "sura_id": 7, "sura_name": "الأعراف", "aya_id": 60, "page": 158, "juz": 8,
     "standard": "قال الملأ من قومه"},
    {"gid": 44, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 2, "page": 1, "juz": 1,
     "standard": "الحمد لله رب العالمين"}
]"#;

pub const MORPHOLOGY: &str = r#"[
    {"gid": 7, "lemmas": ["قال", "الذي", "كفر"], "roots": ["ق-و-ل", "ل-ذ-ي", "ك-ف-ر"]},
    {"gid": 42, "lemmas": ["اسم", "الله", "رحمن", "رحيم"], "roots": ["س-م-و", "أ-ل-ه", "ر-ح-م", "ر-ح-م"]},
    {"gid": 43, "lemmas": ["قال", "ملأ", "من", "قوم"], "roots": ["ق-و-ل", "م-ل-أ", null, "ق-و-م"]},
    {"gid": 44, "lemmas": ["حمد", "الله", "رب", "عالم"], "roots": ["ح-م-د", "أ-ل-ه", "ر-ب-ب", "ع-ل-م"]}
]"#;

pub const WORD_MAP: &str = r#"{
    "قال": {"lemma": "قول", "root": "ق-و-ل"},
    "الرحيم": {"lemma": "رحيم", "root": "ر-ح-م"}
}"#;

pub fn source() -> MemorySource {
    MemorySource::new()
        .with(DatasetKey::Corpus, CORPUS)
        .with(DatasetKey::Morphology, MORPHOLOGY)
        .with(DatasetKey::WordMap, WORD_MAP)
}

pub fn corpus() -> Vec<Verse> {
    serde_json::from_str(CORPUS).unwrap()
}

pub fn context() -> SearchContext {
    let morphology: Vec<MorphologyAya> = serde_json::from_str(MORPHOLOGY).unwrap();
    SearchContext::from_parts(corpus(), morphology, WordMap::from_json(WORD_MAP).unwrap())
}

pub async fn state() -> AppState {
    AppState::from_cache(&DatasetCache::new(source()), SearchConfig::default())
        .await
        .unwrap()
}
