use serde::Deserialize;

/// Main configuration structure for Ygglens
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub domains: DomainPolicy,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Depth bound used when a submission does not carry one
    #[serde(rename = "default-max-depth", default = "default_max_depth")]
    pub default_max_depth: u32,

    /// Global page-count ceiling per crawl job
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Politeness delay between successive fetches within one job
    /// (milliseconds); robots.txt crawl-delay can only raise it
    #[serde(rename = "default-delay", default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// Per-page navigation timeout (seconds)
    #[serde(rename = "nav-timeout", default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,

    /// robots.txt / sitemap fetch timeout (seconds); shorter than the
    /// navigation budget
    #[serde(rename = "robots-timeout", default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user-agent string: `Name/Version (+url; email)`
    pub fn agent_string(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Domain admission policy
#[derive(Debug, Clone, Deserialize)]
pub struct DomainPolicy {
    /// Hostname suffixes eligible for crawling
    #[serde(rename = "allowed-suffixes", default = "default_suffixes")]
    pub allowed_suffixes: Vec<String>,

    /// Operator exception admitting private/loopback hosts (local mirrors,
    /// test servers)
    #[serde(rename = "allow-private-hosts", default)]
    pub allow_private_hosts: bool,
}

impl Default for DomainPolicy {
    fn default() -> Self {
        Self {
            allowed_suffixes: default_suffixes(),
            allow_private_hosts: false,
        }
    }
}

/// Search engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of candidate pages fetched for ranking
    #[serde(rename = "candidate-limit", default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Result page size when the caller does not specify one
    #[serde(rename = "default-limit", default = "default_result_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            default_limit: default_result_limit(),
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages() -> u32 {
    100
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_nav_timeout() -> u64 {
    30
}

fn default_robots_timeout() -> u64 {
    5
}

fn default_suffixes() -> Vec<String> {
    vec![".ygg".to_string()]
}

fn default_candidate_limit() -> usize {
    1000
}

fn default_result_limit() -> usize {
    20
}
