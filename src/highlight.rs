//! Split display text into plain and highlighted segments

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Plain,
    /// Word matched by the query text itself.
    Direct,
    /// Word sharing the query's lemma or root.
    Related,
    /// Word whose lemma or root is only close to the query's.
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl Segment {
    fn new(text: &str, kind: SegmentKind) -> Self {
        Self { text: text.to_string(), kind }
    }
}

/// Partition `text` on every occurrence of any token.
///
/// Concatenating the returned segments gives back `text` exactly. A token
/// present in several lists is classified direct, then related, then fuzzy.
/// Case-insensitive matching only folds ASCII (regex-lite), which is all the
/// Arabic corpus needs; other scripts match case-sensitively.
pub fn highlight(text: &str, direct: &[&str], related: &[&str], fuzzy: &[&str]) -> Vec<Segment> {
    let mut tokens: Vec<&str> = direct
        .iter()
        .chain(related)
        .chain(fuzzy)
        .copied()
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() || text.is_empty() {
        return vec![Segment::new(text, SegmentKind::Plain)];
    }

    // Longest first so the alternation prefers the widest token at a position.
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
    tokens.dedup();

    let alternation = tokens.iter().map(|t| regex_lite::escape(t)).collect::<Vec<_>>().join("|");
    let pattern = match Regex::new(&format!("(?i)(?:{})", alternation)) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(error = %e, tokens = tokens.len(), "highlight pattern rejected");
            return vec![Segment::new(text, SegmentKind::Plain)];
        }
    };

    let direct = lowercase_set(direct);
    let related = lowercase_set(related);
    let fuzzy = lowercase_set(fuzzy);
    let classify = |matched: &str| {
        let key = matched.to_lowercase();
        if direct.contains(&key) {
            SegmentKind::Direct
        } else if related.contains(&key) {
            SegmentKind::Related
        } else if fuzzy.contains(&key) {
            SegmentKind::Fuzzy
        } else {
            SegmentKind::Plain
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::new(&text[last..m.start()], SegmentKind::Plain));
        }
        segments.push(Segment::new(m.as_str(), classify(m.as_str())));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::new(&text[last..], SegmentKind::Plain));
    }

    segments
}

fn lowercase_set(tokens: &[&str]) -> HashSet<String> {
    tokens.iter().map(|t| t.to_lowercase()).collect()
}
