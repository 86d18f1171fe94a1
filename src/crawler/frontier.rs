//! Frontier queue and visited-set
//!
//! The frontier is a plain FIFO queue: breadth-first order, no priorities.
//! It lives only for the duration of one crawl invocation and is owned by
//! that job exclusively. The visited-set, by contrast, is process-wide and
//! shared across concurrent jobs.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use url::Url;

/// A URL queued for fetching, with its breadth-first depth
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// The normalized URL to fetch
    pub url: Url,

    /// Distance from the seed (seed itself is depth 0)
    pub depth: u32,
}

/// FIFO frontier for one crawl invocation
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an entry at the back
    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    /// Dequeues the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Process-wide set of visited normalized URLs
///
/// Append-only, checked before enqueue and before processing. Shared by
/// every concurrent job, so a URL claimed by one job is treated as visited
/// by all others — including URLs a failing job claimed but never durably
/// stored; that skew is inherited behavior, not corrected here. The set is
/// never persisted (a process restart permits re-crawling) and never
/// bounded; the construction site can swap in a bounded set without
/// touching the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    /// Creates an empty visited-set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the URL has been visited
    pub fn contains(&self, url: &str) -> bool {
        self.inner.lock().unwrap().contains(url)
    }

    /// Marks a URL visited; returns true if it was not already present
    pub fn insert(&self, url: &str) -> bool {
        self.inner.lock().unwrap().insert(url.to_string())
    }

    /// Number of visited URLs
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Returns true if nothing has been visited
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
