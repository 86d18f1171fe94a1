//! Storage module for persisted crawl state
//!
//! This module handles all database operations, including:
//! - SQLite schema management
//! - Page persistence (one row per normalized URL, upserted in place)
//! - Crawl job records and their monotonic lifecycle
//! - Candidate retrieval for the search engine

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

use crate::LensError;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, LensError> {
    SqliteStorage::new(path)
}

/// A persisted page, one row per normalized URL
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub domain: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_author: String,
    pub content: String,
    pub links: Vec<String>,
    pub nofollow: bool,
    pub nosnippet: bool,
    pub crawled_at: String,
    pub updated_at: String,
    pub crawl_id: String,
}

/// A page ready to be persisted; the storage layer assigns identity and
/// timestamps
#[derive(Debug, Clone)]
pub struct NewPage {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub meta_author: String,
    pub content: String,
    pub links: Vec<String>,
    pub nofollow: bool,
    pub nosnippet: bool,
    pub crawl_id: String,
}

/// A crawl job record
#[derive(Debug, Clone)]
pub struct CrawlJobRecord {
    pub id: String,
    pub url: String,
    pub max_depth: u32,
    pub status: JobStatus,
    pub submitted_by: String,
    pub submitted_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub failed_at: Option<String>,
    pub pages_processed: u32,
    pub error: Option<String>,
}

impl CrawlJobRecord {
    /// Creates a pending job record for a fresh submission
    pub fn pending(id: &str, url: &str, max_depth: u32, submitted_by: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            max_depth,
            status: JobStatus::Pending,
            submitted_by: submitted_by.to_string(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
            started_at: None,
            completed_at: None,
            failed_at: None,
            pages_processed: 0,
            error: None,
        }
    }
}

/// Status of a crawl job
///
/// Transitions are monotonic: pending → running → (completed | failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether a transition to `next` is legal
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    /// Returns true once the job can no longer change status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}
