//! Corpus verse records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub gid: u64,
    pub sura_id: u32,
    pub sura_name: String,
    pub aya_id: u32,
    pub page: u32,
    #[serde(alias = "jozz")]
    pub juz: u32,
    /// Simplified orthography, used for matching and as display text.
    pub standard: String,
    /// Full Uthmani rendering, when the dataset carries one.
    #[serde(default, alias = "uthmani")]
    pub standard_full: Option<String>,
}

impl Verse {
    /// Text shown in result lists and passed to the highlighter.
    pub fn display_text(&self) -> &str {
        &self.standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_dataset_aliases() {
        let json = r#"{
            "gid": 1, "sura_id": 1, "sura_name": "الفاتحة", "aya_id": 1,
            "page": 1, "jozz": 1, "standard": "بسم الله الرحمن الرحيم",
            "uthmani": "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ"
        }"#;
        let verse: Verse = serde_json::from_str(json).unwrap();
        assert_eq!(verse.juz, 1);
        assert_eq!(verse.display_text(), "بسم الله الرحمن الرحيم");
        assert!(verse.standard_full.is_some());
    }
}
