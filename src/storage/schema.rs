//! Database schema definitions
//!
//! All DDL is idempotent; the three indexes below are the only access
//! structures the crawler and search engine rely on.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per unique normalized URL
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    domain TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    meta_description TEXT NOT NULL DEFAULT '',
    meta_keywords TEXT NOT NULL DEFAULT '',
    meta_author TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    links TEXT NOT NULL DEFAULT '[]',
    nofollow INTEGER NOT NULL DEFAULT 0,
    nosnippet INTEGER NOT NULL DEFAULT 0,
    crawled_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    crawl_id TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_domain ON pages(domain);

-- One row per crawl invocation
CREATE TABLE IF NOT EXISTS crawl_jobs (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    max_depth INTEGER NOT NULL,
    status TEXT NOT NULL,
    submitted_by TEXT NOT NULL,
    submitted_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    failed_at TEXT,
    pages_processed INTEGER NOT NULL DEFAULT 0,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_submitter ON crawl_jobs(submitted_by, submitted_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
