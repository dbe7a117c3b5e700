//! Fuzzy lemma/root lookup over an in-memory Tantivy index
//!
//! One document per verse, with every normalized lemma and root of the verse
//! indexed as whitespace tokens. A lookup combines an exact term clause
//! (boosted) with a Levenshtein clause, so exact lemma/root hits rank first and
//! near misses follow in the index's own scoring order.

use crate::morphology::{MorphologyIndex, TokenField};
use crate::verse::Verse;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::*;
use tantivy::tokenizer::WhitespaceTokenizer;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

const WRITER_MEMORY_BUDGET: usize = 50_000_000;
const EXACT_TERM_BOOST: f32 = 4.0;
/// Largest edit distance Tantivy's Levenshtein automata support.
pub const MAX_EDIT_DISTANCE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuzzyField {
    Lemma,
    Root,
}

impl FuzzyField {
    pub fn token_field(self) -> TokenField {
        match self {
            FuzzyField::Lemma => TokenField::Lemma,
            FuzzyField::Root => TokenField::Root,
        }
    }
}

/// Ranked lemma/root candidate lookup. Returns verse `gid`s, best first.
pub trait FuzzyLookup: Send + Sync {
    fn query_by_field(&self, field: FuzzyField, value: &str, limit: usize) -> Result<Vec<u64>>;
}

pub struct FuzzyIndex {
    reader: IndexReader,
    gid_field: Field,
    lemma_field: Field,
    root_field: Field,
    max_distance: u8,
    doc_count: u64,
}

impl FuzzyIndex {
    /// Build the index over `corpus`. Rebuilding after a corpus change is the
    /// caller's job, and must not overlap with queries on the old instance.
    pub fn build(corpus: &[Verse], morphology: &MorphologyIndex, max_distance: u8) -> Result<Self> {
        let start = std::time::Instant::now();

        let mut schema_builder = Schema::builder();
        let gid_field = schema_builder.add_u64_field("gid", STORED | INDEXED);
        let indexing = TextFieldIndexing::default()
            .set_tokenizer("whitespace")
            .set_index_option(IndexRecordOption::WithFreqs);
        let text_options = TextOptions::default().set_indexing_options(indexing);
        let lemma_field = schema_builder.add_text_field("lemma", text_options.clone());
        let root_field = schema_builder.add_text_field("root", text_options);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        index.tokenizers().register("whitespace", WhitespaceTokenizer::default());

        // Single writer thread keeps one segment with documents in corpus order,
        // which is what equal scores fall back to.
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_MEMORY_BUDGET)
            .context("Failed to create fuzzy index writer")?;

        for verse in corpus {
            let mut doc = TantivyDocument::default();
            doc.add_u64(gid_field, verse.gid);
            if let Some(words) = morphology.get(verse.gid) {
                for word in words {
                    if let Some(lemma) = TokenField::Lemma.key(word) {
                        doc.add_text(lemma_field, lemma);
                    }
                    if let Some(root) = TokenField::Root.key(word) {
                        doc.add_text(root_field, root);
                    }
                }
            }
            writer.add_document(doc)?;
        }
        writer.commit().context("Failed to commit fuzzy index")?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let doc_count = reader.searcher().num_docs();

        tracing::info!(
            verses = doc_count,
            max_distance,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built fuzzy lemma/root index"
        );

        Ok(Self {
            reader,
            gid_field,
            lemma_field,
            root_field,
            max_distance: max_distance.min(MAX_EDIT_DISTANCE),
            doc_count,
        })
    }

    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    pub fn max_distance(&self) -> u8 {
        self.max_distance
    }

    fn search_field(&self, field: FuzzyField) -> Field {
        match field {
            FuzzyField::Lemma => self.lemma_field,
            FuzzyField::Root => self.root_field,
        }
    }

    fn build_query(&self, field: Field, value: &str) -> BooleanQuery {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for piece in value.split_whitespace() {
            let term = Term::from_field_text(field, piece);
            let exact: Box<dyn Query> = Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
            clauses.push((Occur::Should, Box::new(BoostQuery::new(exact, EXACT_TERM_BOOST))));
            if self.max_distance > 0 {
                clauses.push((Occur::Should, Box::new(FuzzyTermQuery::new(term, self.max_distance, true))));
            }
        }
        BooleanQuery::new(clauses)
    }
}

impl FuzzyLookup for FuzzyIndex {
    fn query_by_field(&self, field: FuzzyField, value: &str, limit: usize) -> Result<Vec<u64>> {
        if value.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(self.search_field(field), value);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut gids = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            if let Some(gid) = doc.get_first(self.gid_field).and_then(|v| v.as_u64()) {
                gids.push(gid);
            }
        }
        Ok(gids)
    }
}
