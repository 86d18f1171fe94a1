//! SQLite storage implementation

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CrawlJobRecord, JobStatus, NewPage, PageRecord};
use crate::LensError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    pub fn new(path: &Path) -> Result<Self, LensError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and ephemeral runs)
    pub fn new_in_memory() -> Result<Self, LensError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_page(row: &Row) -> rusqlite::Result<PageRecord> {
        let links_json: String = row.get(8)?;
        Ok(PageRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            domain: row.get(2)?,
            title: row.get(3)?,
            meta_description: row.get(4)?,
            meta_keywords: row.get(5)?,
            meta_author: row.get(6)?,
            content: row.get(7)?,
            links: serde_json::from_str(&links_json).unwrap_or_default(),
            nofollow: row.get(9)?,
            nosnippet: row.get(10)?,
            crawled_at: row.get(11)?,
            updated_at: row.get(12)?,
            crawl_id: row.get(13)?,
        })
    }

    fn row_to_job(row: &Row) -> rusqlite::Result<CrawlJobRecord> {
        let status_str: String = row.get(3)?;
        Ok(CrawlJobRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            max_depth: row.get(2)?,
            status: JobStatus::from_db_string(&status_str).unwrap_or(JobStatus::Failed),
            submitted_by: row.get(4)?,
            submitted_at: row.get(5)?,
            started_at: row.get(6)?,
            completed_at: row.get(7)?,
            failed_at: row.get(8)?,
            pages_processed: row.get(9)?,
            error: row.get(10)?,
        })
    }

    /// Reads a job and checks that its status may move to `next`
    fn check_transition(&self, job_id: &str, next: JobStatus) -> StorageResult<()> {
        let current = self.get_job(job_id)?.status;
        if !current.can_transition_to(next) {
            return Err(StorageError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        Ok(())
    }
}

const PAGE_COLUMNS: &str = "id, url, domain, title, meta_description, meta_keywords, \
    meta_author, content, links, nofollow, nosnippet, crawled_at, updated_at, crawl_id";

const JOB_COLUMNS: &str = "id, url, max_depth, status, submitted_by, submitted_at, \
    started_at, completed_at, failed_at, pages_processed, error";

impl Storage for SqliteStorage {
    // ===== Pages =====

    fn upsert_page(&mut self, page: &NewPage) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let links_json = serde_json::to_string(&page.links)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE url = ?1",
                params![page.url],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            // Update in place, preserving the row id and first-crawl time
            self.conn.execute(
                "UPDATE pages SET domain = ?1, title = ?2, meta_description = ?3, \
                 meta_keywords = ?4, meta_author = ?5, content = ?6, links = ?7, \
                 nofollow = ?8, nosnippet = ?9, updated_at = ?10, crawl_id = ?11 \
                 WHERE id = ?12",
                params![
                    page.domain,
                    page.title,
                    page.meta_description,
                    page.meta_keywords,
                    page.meta_author,
                    page.content,
                    links_json,
                    page.nofollow,
                    page.nosnippet,
                    now,
                    page.crawl_id,
                    id
                ],
            )?;
            Ok(id)
        } else {
            self.conn.execute(
                "INSERT INTO pages (url, domain, title, meta_description, meta_keywords, \
                 meta_author, content, links, nofollow, nosnippet, crawled_at, updated_at, \
                 crawl_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, ?12)",
                params![
                    page.url,
                    page.domain,
                    page.title,
                    page.meta_description,
                    page.meta_keywords,
                    page.meta_author,
                    page.content,
                    links_json,
                    page.nofollow,
                    page.nosnippet,
                    now,
                    page.crawl_id
                ],
            )?;
            Ok(self.conn.last_insert_rowid())
        }
    }

    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM pages WHERE url = ?1", PAGE_COLUMNS))?;

        let page = stmt
            .query_row(params![url], Self::row_to_page)
            .optional()?;

        Ok(page)
    }

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_pages_for_crawl(&self, crawl_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE crawl_id = ?1",
            params![crawl_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn find_candidates(
        &self,
        query: &str,
        domain: Option<&str>,
        limit: usize,
    ) -> StorageResult<Vec<PageRecord>> {
        let pattern = format!("%{}%", escape_like(query));

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages \
             WHERE (title LIKE ?1 ESCAPE '\\' \
                OR content LIKE ?1 ESCAPE '\\' \
                OR meta_description LIKE ?1 ESCAPE '\\') \
               AND (?2 IS NULL OR domain = ?2) \
             ORDER BY id \
             LIMIT ?3",
            PAGE_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![pattern, domain, limit as i64],
            Self::row_to_page,
        )?;

        let mut pages = Vec::new();
        for row in rows {
            pages.push(row?);
        }
        Ok(pages)
    }

    // ===== Crawl jobs =====

    fn create_job(&mut self, job: &CrawlJobRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO crawl_jobs (id, url, max_depth, status, submitted_by, submitted_at, \
             started_at, completed_at, failed_at, pages_processed, error) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                job.id,
                job.url,
                job.max_depth,
                job.status.to_db_string(),
                job.submitted_by,
                job.submitted_at,
                job.started_at,
                job.completed_at,
                job.failed_at,
                job.pages_processed,
                job.error
            ],
        )?;
        Ok(())
    }

    fn get_job(&self, job_id: &str) -> StorageResult<CrawlJobRecord> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawl_jobs WHERE id = ?1",
            JOB_COLUMNS
        ))?;

        stmt.query_row(params![job_id], Self::row_to_job)
            .optional()?
            .ok_or_else(|| StorageError::JobNotFound(job_id.to_string()))
    }

    fn mark_job_running(&mut self, job_id: &str) -> StorageResult<()> {
        self.check_transition(job_id, JobStatus::Running)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_jobs SET status = ?1, started_at = ?2 WHERE id = ?3",
            params![JobStatus::Running.to_db_string(), now, job_id],
        )?;
        Ok(())
    }

    fn mark_job_completed(&mut self, job_id: &str, pages_processed: u32) -> StorageResult<()> {
        self.check_transition(job_id, JobStatus::Completed)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_jobs SET status = ?1, completed_at = ?2, pages_processed = ?3 \
             WHERE id = ?4",
            params![
                JobStatus::Completed.to_db_string(),
                now,
                pages_processed,
                job_id
            ],
        )?;
        Ok(())
    }

    fn mark_job_failed(&mut self, job_id: &str, error: &str) -> StorageResult<()> {
        self.check_transition(job_id, JobStatus::Failed)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE crawl_jobs SET status = ?1, failed_at = ?2, error = ?3 WHERE id = ?4",
            params![JobStatus::Failed.to_db_string(), now, error, job_id],
        )?;
        Ok(())
    }

    fn update_job_progress(&mut self, job_id: &str, pages_processed: u32) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE crawl_jobs SET pages_processed = ?1 WHERE id = ?2",
            params![pages_processed, job_id],
        )?;
        Ok(())
    }

    fn find_jobs_by_submitter(
        &self,
        submitted_by: &str,
        limit: usize,
    ) -> StorageResult<Vec<CrawlJobRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawl_jobs WHERE submitted_by = ?1 \
             ORDER BY submitted_at DESC LIMIT ?2",
            JOB_COLUMNS
        ))?;

        let rows = stmt.query_map(params![submitted_by, limit as i64], Self::row_to_job)?;

        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(row?);
        }
        Ok(jobs)
    }
}

/// Escapes SQL LIKE wildcards in a user query
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
