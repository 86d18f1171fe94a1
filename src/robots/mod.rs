//! Compliance engine
//!
//! This module answers the three admission questions the crawler asks about
//! publisher directives: may this URL be fetched, how long must we wait
//! between fetches, and which sitemap URLs does the origin declare. All
//! three resolve through a per-origin cached record fetched lazily on first
//! query and reused for 24 hours.

mod cache;
mod parser;
mod sitemap;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;
pub use sitemap::parse_sitemap;

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Answers robots/sitemap queries for the crawler
///
/// The engine shares one [`RobotsCache`] with every concurrent job.
/// A robots resource that cannot be fetched resolves to the permissive
/// default (everything allowed, no delay, no sitemaps) rather than an
/// error; compliance failures never propagate to the caller.
pub struct ComplianceEngine {
    client: Client,
    cache: RobotsCache,
    user_agent: String,
}

impl ComplianceEngine {
    /// Creates a new compliance engine
    ///
    /// # Arguments
    ///
    /// * `cache` - The shared per-origin cache
    /// * `user_agent` - The crawler's fixed user-agent string
    /// * `timeout` - The robots/sitemap fetch budget (shorter than page
    ///   navigation budgets)
    pub fn new(cache: RobotsCache, user_agent: String, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.clone())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            cache,
            user_agent,
        })
    }

    /// Checks whether a URL may be fetched under the origin's robots rules
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let record = self.lookup(&origin_of(url)).await;
        record.robots.is_allowed(url.as_str(), &self.user_agent)
    }

    /// Returns the origin's crawl-delay for our user agent, in seconds
    pub async fn crawl_delay(&self, url: &Url) -> Option<f64> {
        let record = self.lookup(&origin_of(url)).await;
        record.robots.crawl_delay(&self.user_agent)
    }

    /// Returns the candidate URLs found in the origin's sitemaps
    ///
    /// Sitemap locations come from the cached robots record; when none are
    /// declared, `{origin}/sitemap.xml` is probed as a best-effort default.
    /// Unreachable or malformed sitemaps contribute nothing.
    pub async fn sitemap_urls(&self, origin: &str) -> Vec<String> {
        let record = self.lookup(origin).await;

        let locations = if record.sitemaps.is_empty() {
            vec![format!("{}/sitemap.xml", origin)]
        } else {
            record.sitemaps.clone()
        };

        let mut urls = Vec::new();
        for location in locations {
            match self.fetch_body(&location).await {
                Some(body) => urls.extend(parse_sitemap(&body)),
                None => tracing::debug!("Sitemap {} not available", location),
            }
        }

        urls
    }

    /// Read-through cache lookup for an origin's robots record
    ///
    /// No lock is held across the fetch; two jobs racing on a cold origin
    /// fetch redundantly and store equivalent records.
    async fn lookup(&self, origin: &str) -> CachedRobots {
        if let Some(record) = self.cache.fresh(origin) {
            return record;
        }

        tracing::debug!("Fetching robots.txt for origin: {}", origin);
        let record = match self.fetch_body(&format!("{}/robots.txt", origin)).await {
            Some(content) => {
                let robots = ParsedRobots::from_content(&content);
                let sitemaps = robots.sitemaps();
                CachedRobots::new(robots, sitemaps)
            }
            None => CachedRobots::new(ParsedRobots::allow_all(), Vec::new()),
        };

        self.cache.store(origin, record.clone());
        record
    }

    /// Fetches a body, treating any non-200 status or transport error as
    /// absence
    async fn fetch_body(&self, url: &str) -> Option<String> {
        let response = self.client.get(url).send().await.ok()?;
        if response.status() != reqwest::StatusCode::OK {
            return None;
        }
        response.text().await.ok()
    }
}

/// Serializes a URL's origin as `scheme://host[:port]`
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
