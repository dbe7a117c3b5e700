mod common;

use quran_search::{highlight, MatchType, SearchCounts, SearchOptions, Segment, SegmentKind};
use std::sync::Arc;

fn segment(text: &str, kind: SegmentKind) -> Segment {
    Segment { text: text.to_string(), kind }
}

#[tokio::test]
async fn exact_match_with_options_off() {
    let state = common::state().await;
    let results = state.search("الرحمن", SearchOptions::default());

    assert_eq!(results.results.len(), 1);
    assert_eq!(results.results[0].verse.gid, 42);
    assert_eq!(results.results[0].match_type, MatchType::Exact);
    assert_eq!(results.counts.simple(), 1);
    assert_eq!(results.counts.total, 1);
}

#[tokio::test]
async fn root_match_without_exact_text() {
    let state = common::state().await;
    let results = state.search("قال", SearchOptions { lemma: false, root: true });

    assert_eq!(results.root.as_deref(), Some("ق-و-ل"));
    let gids: Vec<u64> = results.results.iter().map(|r| r.verse.gid).collect();
    assert_eq!(gids, vec![43, 7]);

    assert_eq!(results.results[0].match_type, MatchType::Exact);
    assert_eq!(results.results[1].match_type, MatchType::Root);
    assert!(results.results[0].match_score > results.results[1].match_score);
    assert_eq!(results.counts.exact, 1);
    assert_eq!(results.counts.root, 2);
    assert_eq!(results.counts.total, 2);
}

#[tokio::test]
async fn lemma_match_keeps_exact_classification() {
    let state = common::state().await;
    let results = state.search("الرحيم", SearchOptions { lemma: true, root: false });

    assert_eq!(results.lemma.as_deref(), Some("رحيم"));
    assert_eq!(results.counts.lemma, 1);
    assert_eq!(results.results[0].verse.gid, 42);
    assert_eq!(results.results[0].match_type, MatchType::Exact);
}

#[tokio::test]
async fn query_without_arabic_letters_is_empty() {
    let state = common::state().await;
    let results = state.search("hello 123 !!", SearchOptions { lemma: true, root: true });

    assert!(results.results.is_empty());
    assert_eq!(results.counts, SearchCounts::default());
}

#[tokio::test]
async fn diacritics_in_query_are_ignored() {
    let state = common::state().await;
    let results = state.search("الرَّحْمَٰنِ", SearchOptions::default());
    assert_eq!(results.results[0].verse.gid, 42);
}

#[test]
fn highlight_splits_direct_token() {
    let segments = highlight("قال الرجل", &["قال"], &[], &[]);
    assert_eq!(
        segments,
        vec![segment("قال", SegmentKind::Direct), segment(" الرجل", SegmentKind::Plain)]
    );
}

#[tokio::test]
async fn highlight_marks_root_related_words() {
    let state = common::state().await;
    let segments = state.highlight(7, "قال", SearchOptions { lemma: false, root: true }).unwrap();

    assert_eq!(
        segments,
        vec![segment("ويقول", SegmentKind::Related), segment(" الذين كفروا", SegmentKind::Plain)]
    );
    assert!(state.highlight(999, "قال", SearchOptions::default()).is_none());
}

#[tokio::test]
async fn counts_serialize_and_accept_simple_alias() {
    let state = common::state().await;
    let results = state.search("الرحمن", SearchOptions::default());

    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["counts"]["exact"], 1);
    assert_eq!(json["results"][0]["gid"], 42);
    assert_eq!(json["results"][0]["match_type"], "exact");

    let counts: SearchCounts =
        serde_json::from_str(r#"{"simple": 3, "lemma": 0, "root": 1, "fuzzy": 0, "total": 4}"#).unwrap();
    assert_eq!(counts.exact, 3);
}

#[tokio::test]
async fn session_keeps_latest_search() {
    let state = common::state().await;
    let session = Arc::new(state.session());

    let (first, second) = tokio::join!(
        session.search_async("الرحمن".to_string(), SearchOptions::default()),
        session.search_async("قال".to_string(), SearchOptions { lemma: false, root: true }),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert!(!session.is_current(&first));
    assert!(session.is_current(&second));
    assert_eq!(session.current().unwrap().query, "قال");

    let segments = session.highlight(7).unwrap();
    assert_eq!(segments[0], segment("ويقول", SegmentKind::Related));
    assert!(session.highlight(42).is_none());
}
