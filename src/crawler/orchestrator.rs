//! Crawl orchestration
//!
//! The orchestrator owns the per-job breadth-first loop: admission checks,
//! fetching through the extractor, persistence, link discovery, politeness
//! delays, and the job lifecycle record. Submissions are fire-and-forget;
//! the caller observes progress only through the persisted CrawlJob row.

use crate::config::Config;
use crate::crawler::frontier::{Frontier, FrontierEntry, VisitedSet};
use crate::render::{Extractor, PageExtract};
use crate::robots::{origin_of, ComplianceEngine};
use crate::storage::{CrawlJobRecord, NewPage, SqliteStorage, Storage};
use crate::url::{extract_domain, is_admissible_domain, normalize_url};
use crate::{LensError, UrlError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Coordinates crawl jobs over the shared storage, compliance engine,
/// extractor, and visited-set
///
/// Cloning is cheap; every clone shares the same underlying components,
/// which is how a detached job task keeps using them after `submit`
/// returns.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    compliance: Arc<ComplianceEngine>,
    extractor: Arc<Extractor>,
    visited: VisitedSet,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// The visited-set and the compliance engine's cache are passed in so
    /// production wiring can share one instance per process while tests
    /// run isolated ones.
    pub fn new(
        config: Arc<Config>,
        storage: Arc<Mutex<SqliteStorage>>,
        compliance: Arc<ComplianceEngine>,
        extractor: Arc<Extractor>,
        visited: VisitedSet,
    ) -> Self {
        Self {
            config,
            storage,
            compliance,
            extractor,
            visited,
        }
    }

    /// Submits a crawl: creates a pending job and starts it as a detached
    /// task
    ///
    /// Returns the job id immediately; the caller never blocks on
    /// completion. A missing depth falls back to the configured default.
    pub fn submit(
        &self,
        seed_url: &str,
        max_depth: Option<u32>,
        submitted_by: &str,
    ) -> crate::Result<String> {
        let (job_id, seed, depth) = self.create_pending_job(seed_url, max_depth, submitted_by)?;

        let orchestrator = self.clone();
        let spawned_id = job_id.clone();
        tokio::spawn(async move {
            orchestrator.crawl(&seed, depth, &spawned_id).await;
        });

        Ok(job_id)
    }

    /// Submits a crawl and runs it on the current task until it reaches a
    /// terminal state (the CLI path; API submissions use [`submit`])
    ///
    /// [`submit`]: Orchestrator::submit
    pub async fn submit_and_wait(
        &self,
        seed_url: &str,
        max_depth: Option<u32>,
        submitted_by: &str,
    ) -> crate::Result<CrawlJobRecord> {
        let (job_id, seed, depth) = self.create_pending_job(seed_url, max_depth, submitted_by)?;

        self.crawl(&seed, depth, &job_id).await;

        let storage = self.storage.lock().unwrap();
        Ok(storage.get_job(&job_id)?)
    }

    /// Normalizes the seed, applies the default depth, and records the
    /// pending job
    fn create_pending_job(
        &self,
        seed_url: &str,
        max_depth: Option<u32>,
        submitted_by: &str,
    ) -> crate::Result<(String, String, u32)> {
        let seed = normalize_url(seed_url)?;
        let depth = max_depth.unwrap_or(self.config.crawler.default_max_depth);

        let job_id = Uuid::new_v4().to_string();
        let job = CrawlJobRecord::pending(&job_id, seed.as_str(), depth, submitted_by);
        {
            let mut storage = self.storage.lock().unwrap();
            storage.create_job(&job)?;
        }

        Ok((job_id, seed.to_string(), depth))
    }

    /// Runs a crawl job to its terminal state
    ///
    /// Never returns an error to the caller: a failure escaping the inner
    /// loop transitions the job to failed with the captured error text.
    pub async fn crawl(&self, seed_url: &str, max_depth: u32, job_id: &str) {
        if let Err(e) = self.run_job(seed_url, max_depth, job_id).await {
            tracing::error!("Crawl job {} failed: {}", job_id, e);
            let mut storage = self.storage.lock().unwrap();
            if let Err(update_err) = storage.mark_job_failed(job_id, &e.to_string()) {
                tracing::error!(
                    "Could not record failure for job {}: {}",
                    job_id,
                    update_err
                );
            }
        }
    }

    /// The breadth-first crawl loop
    async fn run_job(&self, seed_url: &str, max_depth: u32, job_id: &str) -> crate::Result<()> {
        // The job enters running before any validation; a bad seed then
        // takes the legal running -> failed transition.
        {
            let mut storage = self.storage.lock().unwrap();
            storage.mark_job_running(job_id)?;
        }

        let seed = normalize_url(seed_url)?;
        let seed_host = extract_domain(&seed).ok_or(UrlError::MissingHost)?;

        if !is_admissible_domain(&seed_host, &self.config.domains) {
            return Err(LensError::SeedNotAdmissible {
                url: seed.to_string(),
            });
        }

        tracing::info!("Crawl job {} started at {}", job_id, seed);

        let mut frontier = Frontier::new();
        frontier.push(FrontierEntry {
            url: seed.clone(),
            depth: 0,
        });

        self.seed_from_sitemaps(&mut frontier, &seed, &seed_host)
            .await;

        let mut processed: u32 = 0;
        let max_pages = self.config.crawler.max_pages;

        while let Some(entry) = frontier.pop() {
            if processed >= max_pages {
                tracing::info!(
                    "Crawl job {} reached the page ceiling of {}",
                    job_id,
                    max_pages
                );
                break;
            }

            // Entries can outlive the bound when the queue was seeded
            // before a shallower re-submission; drop without fetching.
            if entry.depth > max_depth {
                continue;
            }

            if self.visited.contains(entry.url.as_str()) {
                continue;
            }

            if self.compliance.is_allowed(&entry.url).await {
                match self.extractor.fetch_and_parse(&entry.url).await {
                    Some(extract) => {
                        processed += self.persist_and_expand(
                            &mut frontier,
                            extract,
                            &entry,
                            max_depth,
                            &seed_host,
                            job_id,
                            processed,
                        );
                    }
                    None => {
                        tracing::debug!("Skipping {} (no extraction)", entry.url);
                    }
                }
            } else {
                tracing::debug!("Skipping {} (disallowed by robots.txt)", entry.url);
            }

            // Politeness delay between dequeues, regardless of outcome
            let delay = self.effective_delay(&entry.url).await;
            tokio::time::sleep(delay).await;
        }

        {
            let mut storage = self.storage.lock().unwrap();
            storage.mark_job_completed(job_id, processed)?;
        }
        tracing::info!("Crawl job {} completed: {} pages", job_id, processed);

        Ok(())
    }

    /// Persists an extracted page and enqueues its links
    ///
    /// Returns 1 when the page was persisted, 0 when persistence failed
    /// (logged, loop continues).
    fn persist_and_expand(
        &self,
        frontier: &mut Frontier,
        extract: PageExtract,
        entry: &FrontierEntry,
        max_depth: u32,
        seed_host: &str,
        job_id: &str,
        processed_before: u32,
    ) -> u32 {
        let nofollow = extract.nofollow;
        let links = extract.links.clone();
        let page = new_page(extract, job_id);

        let persisted = {
            let mut storage = self.storage.lock().unwrap();
            storage.upsert_page(&page)
        };

        match persisted {
            Ok(_) => {
                self.visited.insert(entry.url.as_str());
                let processed = processed_before + 1;

                {
                    let mut storage = self.storage.lock().unwrap();
                    if let Err(e) = storage.update_job_progress(job_id, processed) {
                        tracing::warn!("Progress update failed for job {}: {}", job_id, e);
                    }
                }

                if processed % 10 == 0 {
                    tracing::info!(
                        "Job {}: {} pages processed, {} queued",
                        job_id,
                        processed,
                        frontier.len()
                    );
                }

                if entry.depth < max_depth && !nofollow {
                    self.enqueue_links(frontier, &links, entry.depth + 1, seed_host);
                }

                1
            }
            Err(e) => {
                tracing::warn!("Failed to persist {}: {}", entry.url, e);
                0
            }
        }
    }

    /// Seeds the frontier with same-domain sitemap entries at depth 1
    async fn seed_from_sitemaps(&self, frontier: &mut Frontier, seed: &Url, seed_host: &str) {
        let origin = origin_of(seed);
        let sitemap_urls = self.compliance.sitemap_urls(&origin).await;
        if sitemap_urls.is_empty() {
            return;
        }

        tracing::debug!(
            "Seeding frontier with {} sitemap entries for {}",
            sitemap_urls.len(),
            origin
        );
        self.enqueue_links(frontier, &sitemap_urls, 1, seed_host);
    }

    /// Filters and enqueues discovered links
    ///
    /// A link is enqueued only when it normalizes, stays on the seed host,
    /// passes the domain allow-list, and has not been visited.
    fn enqueue_links(&self, frontier: &mut Frontier, links: &[String], depth: u32, seed_host: &str) {
        for link in links {
            let url = match normalize_url(link) {
                Ok(u) => u,
                Err(e) => {
                    tracing::trace!("Dropping link {}: {}", link, e);
                    continue;
                }
            };

            if !self.admissible_link(&url, seed_host) {
                continue;
            }

            if self.visited.contains(url.as_str()) {
                continue;
            }

            frontier.push(FrontierEntry { url, depth });
        }
    }

    /// Domain confinement plus the allow-list policy
    fn admissible_link(&self, url: &Url, seed_host: &str) -> bool {
        match extract_domain(url) {
            Some(host) => host == seed_host && is_admissible_domain(&host, &self.config.domains),
            None => false,
        }
    }

    /// Effective politeness delay: robots crawl-delay can only raise the
    /// configured floor
    async fn effective_delay(&self, url: &Url) -> Duration {
        let configured = Duration::from_millis(self.config.crawler.default_delay_ms);

        let robots = self
            .compliance
            .crawl_delay(url)
            .await
            .map(Duration::from_secs_f64)
            .unwrap_or(Duration::ZERO);

        configured.max(robots)
    }
}

/// Builds the persisted shape from an extract
fn new_page(extract: PageExtract, crawl_id: &str) -> NewPage {
    NewPage {
        url: extract.url,
        domain: extract.domain,
        title: extract.title,
        meta_description: extract.meta_description,
        meta_keywords: extract.meta_keywords,
        meta_author: extract.meta_author,
        content: extract.content,
        links: extract.links,
        nofollow: extract.nofollow,
        nosnippet: extract.nosnippet,
        crawl_id: crawl_id.to_string(),
    }
}
