//! Per-origin robots record caching
//!
//! Cached records expire after 24 hours so directive changes made by site
//! owners are picked up within a day.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cached robots data for one origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub robots: ParsedRobots,

    /// Sitemap URLs declared in the robots.txt
    pub sitemaps: Vec<String>,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(robots: ParsedRobots, sitemaps: Vec<String>) -> Self {
        Self {
            robots,
            sitemaps,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached record is stale (older than 24 hours)
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.fetched_at;
        age > Duration::hours(24)
    }
}

/// Shared per-origin robots cache
///
/// One instance is wired per process and shared by every crawl job, so an
/// origin's robots.txt is fetched at most once per TTL window across
/// concurrent jobs. The cache is never persisted and grows with the number
/// of distinct origins seen; construction sites can swap in a bounded map
/// without touching the engine.
#[derive(Debug, Clone, Default)]
pub struct RobotsCache {
    inner: Arc<Mutex<HashMap<String, CachedRobots>>>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record for an origin if it is still fresh
    pub fn fresh(&self, origin: &str) -> Option<CachedRobots> {
        let map = self.inner.lock().unwrap();
        map.get(origin).filter(|c| !c.is_stale()).cloned()
    }

    /// Stores a record for an origin, replacing any previous one
    ///
    /// Concurrent jobs refreshing the same origin overwrite each other;
    /// both wrote equivalent data, so the race is harmless.
    pub fn store(&self, origin: &str, record: CachedRobots) {
        let mut map = self.inner.lock().unwrap();
        map.insert(origin.to_string(), record);
    }

    /// Number of origins currently cached
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Returns true if no origins are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
