//! Search execution
//!
//! Candidate retrieval goes through storage (bounded fetch); ranking,
//! pagination, and snippet generation happen here. Pagination is applied
//! after the full candidate set is sorted, never before.

use crate::config::SearchConfig;
use crate::search::scoring::score_page;
use crate::search::snippet::generate_snippet;
use crate::storage::{PageRecord, SqliteStorage, Storage};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Snippet window size
const SNIPPET_LEN: usize = 200;

/// A search request
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The query string (mandatory; validated by the caller)
    pub query: String,

    /// Optional exact-domain restriction
    pub domain: Option<String>,

    /// Result page size
    pub limit: usize,

    /// Result offset, applied after sorting
    pub offset: usize,
}

impl SearchQuery {
    /// Creates a query with the default page size and no offset
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            domain: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// One ranked search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub snippet: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_author: String,
    pub crawled_at: String,
    pub score: f64,
}

/// A ranked, paginated search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub results: Vec<SearchHit>,
}

/// Relevance search over the stored corpus
pub struct SearchEngine {
    storage: Arc<Mutex<SqliteStorage>>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Creates a new search engine over shared storage
    pub fn new(storage: Arc<Mutex<SqliteStorage>>, config: SearchConfig) -> Self {
        Self { storage, config }
    }

    /// Runs a search request
    ///
    /// The candidate fetch is capped at the configured limit; matches
    /// beyond the cap are invisible to this query. Ties keep retrieval
    /// order (the sort is stable; no secondary key is defined).
    pub fn search(&self, request: &SearchQuery) -> crate::Result<SearchResponse> {
        let candidates = {
            let storage = self.storage.lock().unwrap();
            storage.find_candidates(
                &request.query,
                request.domain.as_deref(),
                self.config.candidate_limit,
            )?
        };

        let mut scored: Vec<(PageRecord, f64)> = candidates
            .into_iter()
            .map(|page| {
                let score = score_page(&page, &request.query);
                (page, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total = scored.len();
        let results = scored
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|(page, score)| hit_from_page(page, score, &request.query))
            .collect();

        Ok(SearchResponse {
            query: request.query.clone(),
            total,
            limit: request.limit,
            offset: request.offset,
            results,
        })
    }
}

/// Builds the outward result shape, honoring the page's nosnippet flag
fn hit_from_page(page: PageRecord, score: f64, query: &str) -> SearchHit {
    let (snippet, meta_description) = if page.nosnippet {
        (String::new(), String::new())
    } else {
        (
            generate_snippet(&page.content, query, SNIPPET_LEN),
            page.meta_description,
        )
    };

    SearchHit {
        url: page.url,
        title: page.title,
        domain: page.domain,
        snippet,
        meta_description,
        meta_keywords: page.meta_keywords,
        meta_author: page.meta_author,
        crawled_at: page.crawled_at,
        score,
    }
}
