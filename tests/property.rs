mod common;

use proptest::prelude::*;
use quran_search::{
    clean_query, highlight, normalize_arabic, positive_tokens, search, MatchType, SearchConfig, SearchOptions,
    TokenMode,
};
use std::collections::HashSet;

// Arabic block (letters, tashkeel, Quranic marks), some Latin and spaces
const TEXT: &str = "[\u{0600}-\u{06FF} a-z]{0,40}";
const WORD: &str = "[\u{0621}-\u{063A}\u{0641}-\u{064A}]{1,6}";

proptest! {
    #[test]
    fn normalize_is_idempotent(text in TEXT) {
        let once = normalize_arabic(&text);
        prop_assert_eq!(normalize_arabic(&once), once);
    }

    #[test]
    fn clean_query_is_idempotent(text in TEXT) {
        let once = clean_query(&text);
        prop_assert_eq!(clean_query(&once), once);
    }

    #[test]
    fn highlight_round_trips(
        text in TEXT,
        direct in prop::collection::vec(WORD, 0..3),
        related in prop::collection::vec(WORD, 0..3),
        fuzzy in prop::collection::vec(WORD, 0..3),
    ) {
        let direct: Vec<&str> = direct.iter().map(String::as_str).collect();
        let related: Vec<&str> = related.iter().map(String::as_str).collect();
        let fuzzy: Vec<&str> = fuzzy.iter().map(String::as_str).collect();

        let segments = highlight(&text, &direct, &related, &fuzzy);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn results_have_distinct_gids(query in WORD, lemma in any::<bool>(), root in any::<bool>()) {
        let ctx = common::context();
        let results = search(&ctx, &query, SearchOptions { lemma, root }, None, &SearchConfig::default());

        let gids: HashSet<u64> = results.results.iter().map(|r| r.verse.gid).collect();
        prop_assert_eq!(gids.len(), results.results.len());
        prop_assert_eq!(results.counts.total, results.results.len());
    }

    #[test]
    fn positive_text_tokens_are_distinct(query in WORD) {
        let ctx = common::context();
        for verse in ctx.corpus() {
            let tokens = positive_tokens(verse, None, TokenMode::Text, None, None, &query);
            let distinct: HashSet<&String> = tokens.iter().collect();
            prop_assert_eq!(distinct.len(), tokens.len());
        }
    }

    #[test]
    fn any_substring_of_a_verse_word_is_found(verse_idx in 0usize..4, word_idx in 0usize..8, start in 0usize..8, len in 1usize..8) {
        let ctx = common::context();
        let verse = &ctx.corpus()[verse_idx % ctx.corpus().len()];
        let normalized = normalize_arabic(verse.display_text());
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let chars: Vec<char> = words[word_idx % words.len()].chars().collect();

        let start = start % chars.len();
        let end = (start + len).min(chars.len());
        let query: String = chars[start..end].iter().collect();

        let results = search(&ctx, &query, SearchOptions::default(), None, &SearchConfig::default());
        let hit = results.results.iter().find(|r| r.verse.gid == verse.gid);
        prop_assert!(hit.is_some(), "{:?} not found for query {:?}", verse.gid, query);
        prop_assert_eq!(hit.map(|r| r.match_type), Some(MatchType::Exact));
    }
}
