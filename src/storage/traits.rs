//! Storage trait and error types

use crate::storage::{CrawlJobRecord, JobStatus, NewPage, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid job transition: {from:?} -> {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The crawler and search engine depend only on this interface. The page
/// table relies on three indexed access paths: unique normalized URL,
/// domain, and (submitter, submission time) for jobs.
pub trait Storage {
    // ===== Pages =====

    /// Inserts a page or updates the existing row for its normalized URL
    ///
    /// Re-crawls update in place: the existing row identifier and first
    /// crawl timestamp are preserved, everything else (including the
    /// provenance crawl id) is replaced.
    ///
    /// # Returns
    ///
    /// The page id (newly assigned or preserved)
    fn upsert_page(&mut self, page: &NewPage) -> StorageResult<i64>;

    /// Gets a page by its normalized URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Total number of persisted pages
    fn count_pages(&self) -> StorageResult<u64>;

    /// Number of pages most recently touched by a given crawl job
    fn count_pages_for_crawl(&self, crawl_id: &str) -> StorageResult<u64>;

    /// Retrieves candidate pages whose title, content, or meta description
    /// contains the query (case-insensitive), optionally restricted to one
    /// domain, capped at `limit`
    fn find_candidates(
        &self,
        query: &str,
        domain: Option<&str>,
        limit: usize,
    ) -> StorageResult<Vec<PageRecord>>;

    // ===== Crawl jobs =====

    /// Creates a job record (normally in pending state)
    fn create_job(&mut self, job: &CrawlJobRecord) -> StorageResult<()>;

    /// Gets a job by id
    fn get_job(&self, job_id: &str) -> StorageResult<CrawlJobRecord>;

    /// Transitions a job to running, stamping `started_at`
    fn mark_job_running(&mut self, job_id: &str) -> StorageResult<()>;

    /// Transitions a job to completed, stamping `completed_at` and the
    /// final processed count
    fn mark_job_completed(&mut self, job_id: &str, pages_processed: u32) -> StorageResult<()>;

    /// Transitions a job to failed, stamping `failed_at` and the error text
    fn mark_job_failed(&mut self, job_id: &str, error: &str) -> StorageResult<()>;

    /// Updates the running processed count without a status change
    fn update_job_progress(&mut self, job_id: &str, pages_processed: u32) -> StorageResult<()>;

    /// Lists jobs for a submitter, most recent first
    fn find_jobs_by_submitter(
        &self,
        submitted_by: &str,
        limit: usize,
    ) -> StorageResult<Vec<CrawlJobRecord>>;
}
