//! Relevance search over the stored corpus
//!
//! Ranking operates directly over stored field values at query time; there
//! is no inverted index. Candidate retrieval is bounded, scoring is
//! multi-signal and additive, and pagination happens after the full sort.

mod engine;
mod scoring;
mod snippet;

pub use engine::{SearchEngine, SearchHit, SearchQuery, SearchResponse};
pub use scoring::score_page;
pub use snippet::generate_snippet;
