//! Integration tests for the crawl engine
//!
//! These tests use wiremock to stand up mock sites and drive full crawl
//! jobs end-to-end against temporary databases.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ygglens::config::{
    Config, CrawlerConfig, DomainPolicy, SearchConfig, StorageConfig, UserAgentConfig,
};
use ygglens::crawler::{Orchestrator, VisitedSet};
use ygglens::render::{Extractor, HttpRenderer};
use ygglens::robots::{ComplianceEngine, RobotsCache};
use ygglens::storage::{JobStatus, SqliteStorage, Storage};

/// Creates a test configuration pointing at the given database
fn test_config(db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            default_max_depth: 2,
            max_pages: 100,
            default_delay_ms: 10, // Very short for testing
            nav_timeout_secs: 5,
            robots_timeout_secs: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "LensBot".to_string(),
            crawler_version: "0.3".to_string(),
            contact_url: "https://lens.ygg/about".to_string(),
            contact_email: "admin@lens.ygg".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string(),
        },
        domains: DomainPolicy {
            allowed_suffixes: vec![".ygg".to_string()],
            // Mock servers live on the loopback interface
            allow_private_hosts: true,
        },
        search: SearchConfig::default(),
    }
}

/// Wires an orchestrator with isolated shared state over the given config
fn build_orchestrator(config: Config) -> (Orchestrator, Arc<Mutex<SqliteStorage>>) {
    let config = Arc::new(config);
    let storage = Arc::new(Mutex::new(
        SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap(),
    ));

    let user_agent = config.user_agent.agent_string();
    let compliance = Arc::new(
        ComplianceEngine::new(
            RobotsCache::new(),
            user_agent.clone(),
            Duration::from_secs(config.crawler.robots_timeout_secs),
        )
        .unwrap(),
    );
    let renderer = Arc::new(HttpRenderer::new(
        user_agent,
        Duration::from_secs(config.crawler.nav_timeout_secs),
    ));
    let extractor = Arc::new(Extractor::new(renderer));

    let orchestrator = Orchestrator::new(
        config,
        storage.clone(),
        compliance,
        extractor,
        VisitedSet::new(),
    );

    (orchestrator, storage)
}

/// Mounts a permissive robots.txt
async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content.to_string()))
        .mount(server)
        .await;
}

/// Mounts an HTML page
async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn db_path(dir: &tempfile::TempDir) -> String {
    dir.path().join("test.db").to_string_lossy().to_string()
}

#[tokio::test]
async fn test_two_page_crawl_end_to_end() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <main>Welcome home</main>
            <a href="/about">About</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><head><title>About</title></head><body>About us</body></html>"#.to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 2);
    assert!(job.started_at.is_some());
    assert!(job.completed_at.is_some());

    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_pages().unwrap(), 2);
    // pagesProcessed equals the pages actually persisted for this job
    assert_eq!(storage.count_pages_for_crawl(&job.id).unwrap(), 2);

    let root_url = format!("{}/", server.uri());
    let home = storage.get_page_by_url(&root_url).unwrap().unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.content, "Welcome home");
    assert_eq!(home.crawl_id, job.id);

    let about_url = format!("{}/about", server.uri());
    let about = storage.get_page_by_url(&about_url).unwrap().unwrap();
    assert_eq!(about.title, "About");
}

#[tokio::test]
async fn test_depth_bound_stops_link_following() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/deeper">Deeper</a></body></html>"#.to_string(),
    )
    .await;
    mount_page(&server, "/deeper", "<html><body>deep</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();

    // A link discovered at max_depth is never enqueued
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 1);

    let storage = storage.lock().unwrap();
    let deeper_url = format!("{}/deeper", server.uri());
    assert!(storage.get_page_by_url(&deeper_url).unwrap().is_none());
}

#[tokio::test]
async fn test_robots_disallow_skips_url() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/private">Secret</a>
            <a href="/about">About</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/private", "<html><body>secret</body></html>".to_string()).await;
    mount_page(&server, "/about", "<html><body>about</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    // The disallowed URL is silently passed over, not an error
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 2);

    let storage = storage.lock().unwrap();
    let private_url = format!("{}/private", server.uri());
    assert!(storage.get_page_by_url(&private_url).unwrap().is_none());
}

#[tokio::test]
async fn test_noindex_meta_page_not_persisted() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/hidden">Hidden</a></body></html>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/hidden",
        r#"<html><head><meta name="robots" content="noindex"></head>
           <body>not for the index</body></html>"#
            .to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 1);

    let storage = storage.lock().unwrap();
    let hidden_url = format!("{}/hidden", server.uri());
    assert!(storage.get_page_by_url(&hidden_url).unwrap().is_none());
}

#[tokio::test]
async fn test_x_robots_tag_header_excludes_page() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/hidden">Hidden</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>header-hidden</body></html>")
                .insert_header("content-type", "text/html")
                .insert_header("X-Robots-Tag", "noindex"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    assert_eq!(job.pages_processed, 1);

    let storage = storage.lock().unwrap();
    let hidden_url = format!("{}/hidden", server.uri());
    assert!(storage.get_page_by_url(&hidden_url).unwrap().is_none());
}

#[tokio::test]
async fn test_nofollow_page_links_not_followed() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><head><meta name="robots" content="nofollow"></head>
           <body><a href="/leaf">Leaf</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/leaf", "<html><body>leaf</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(2), "tester")
        .await
        .unwrap();

    assert_eq!(job.pages_processed, 1);

    let storage = storage.lock().unwrap();
    let root_url = format!("{}/", server.uri());
    let root = storage.get_page_by_url(&root_url).unwrap().unwrap();
    assert!(root.nofollow);
    assert!(root.links.is_empty());

    let leaf_url = format!("{}/leaf", server.uri());
    assert!(storage.get_page_by_url(&leaf_url).unwrap().is_none());
}

#[tokio::test]
async fn test_nosnippet_suppresses_description_not_content() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><head>
            <meta name="robots" content="nosnippet">
            <meta name="description" content="should be suppressed">
        </head><body>the content stays</body></html>"#
            .to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    orchestrator
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();

    let storage = storage.lock().unwrap();
    let root_url = format!("{}/", server.uri());
    let page = storage.get_page_by_url(&root_url).unwrap().unwrap();
    assert!(page.nosnippet);
    assert_eq!(page.meta_description, "");
    assert_eq!(page.content, "the content stays");
}

#[tokio::test]
async fn test_cross_domain_links_not_followed() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="https://elsewhere.ygg/page">Away</a></body></html>"#.to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(2), "tester")
        .await
        .unwrap();

    // Only the seed host is crawled, so only the seed page persists
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 1);
    assert_eq!(storage.lock().unwrap().count_pages().unwrap(), 1);
}

#[tokio::test]
async fn test_sitemap_seeds_frontier() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(
        &server,
        &format!("User-agent: *\nAllow: /\nSitemap: {}/map.xml", base),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/map.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{}/a</loc></url><url><loc>{}/b</loc></url></urlset>",
            base, base
        )))
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>root</body></html>".to_string()).await;
    mount_page(&server, "/a", "<html><body>page a</body></html>".to_string()).await;
    mount_page(&server, "/b", "<html><body>page b</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&base, Some(1), "tester")
        .await
        .unwrap();

    // Root (depth 0) plus the two sitemap entries at depth 1
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 3);

    let storage = storage.lock().unwrap();
    assert!(storage
        .get_page_by_url(&format!("{}/a", base))
        .unwrap()
        .is_some());
    assert!(storage
        .get_page_by_url(&format!("{}/b", base))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_recrawl_updates_in_place() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>v1</body></html>"#.to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db = db_path(&dir);

    // First crawl
    let (first, _) = build_orchestrator(test_config(&db));
    let first_job = first
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();
    assert_eq!(first_job.pages_processed, 1);

    // A fresh orchestrator (fresh visited-set, same database) models a
    // process restart; the re-crawl must update, not duplicate
    let (second, storage) = build_orchestrator(test_config(&db));
    let second_job = second
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();
    assert_eq!(second_job.pages_processed, 1);

    let storage = storage.lock().unwrap();
    assert_eq!(storage.count_pages().unwrap(), 1);

    let root_url = format!("{}/", server.uri());
    let page = storage.get_page_by_url(&root_url).unwrap().unwrap();
    assert_eq!(page.crawl_id, second_job.id);
}

#[tokio::test]
async fn test_visited_set_shared_within_process() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", "<html><body>once</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _storage) = build_orchestrator(test_config(&db_path(&dir)));

    let first = orchestrator
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();
    assert_eq!(first.pages_processed, 1);

    // Same process: the URL is already claimed, the second job finds
    // nothing to do but still completes
    let second = orchestrator
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();
    assert_eq!(second.status, JobStatus::Completed);
    assert_eq!(second.pages_processed, 0);
}

#[tokio::test]
async fn test_seed_outside_allowlist_fails_job() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&db_path(&dir));
    config.domains.allow_private_hosts = false;

    let (orchestrator, _storage) = build_orchestrator(config);

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.failed_at.is_some());
}

#[tokio::test]
async fn test_fetch_error_is_skip_not_failure() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/missing">Missing</a></body></html>"#.to_string(),
    )
    .await;
    // /missing is not mounted: the mock server answers 404

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();

    // The dead link is logged and skipped; the job still completes
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 1);
}

#[tokio::test]
async fn test_robots_fetched_once_per_origin() {
    let server = MockServer::start().await;

    // Every admission and delay query for this origin must be served from
    // the shared cache after the first fetch
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#.to_string(),
    )
    .await;
    mount_page(&server, "/a", "<html><body>a</body></html>".to_string()).await;
    mount_page(&server, "/b", "<html><body>b</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(1), "tester")
        .await
        .unwrap();
    assert_eq!(job.pages_processed, 3);

    // MockServer verifies the expectation on drop
}

#[tokio::test]
async fn test_submit_is_fire_and_forget() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", "<html><body>solo</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, storage) = build_orchestrator(test_config(&db_path(&dir)));

    // Returns immediately; progress is observable only through the job row
    let job_id = orchestrator
        .submit(&server.uri(), Some(0), "tester")
        .unwrap();

    for _ in 0..250 {
        let job = {
            let storage = storage.lock().unwrap();
            storage.get_job(&job_id).unwrap()
        };
        if job.status.is_terminal() {
            assert_eq!(job.status, JobStatus::Completed);
            assert_eq!(job.pages_processed, 1);
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    panic!("job never reached a terminal state");
}

#[tokio::test]
async fn test_robots_fetch_failure_is_permissive() {
    let server = MockServer::start().await;
    // No robots.txt mounted: the 404 resolves to "no restrictions"
    mount_page(&server, "/", "<html><body>open</body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (orchestrator, _storage) = build_orchestrator(test_config(&db_path(&dir)));

    let job = orchestrator
        .submit_and_wait(&server.uri(), Some(0), "tester")
        .await
        .unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.pages_processed, 1);
}
