//! Rendering capability contract and the bundled HTTP implementation
//!
//! Rendering a page's DOM is an external capability: the crawler consumes
//! only the contract below ({html, links, response headers} under a bounded
//! navigation budget). The bundled [`HttpRenderer`] fulfils the contract
//! with a plain HTTP fetch plus anchor extraction, which is sufficient for
//! server-rendered sites; a headless-browser implementation plugs in behind
//! the same trait for client-rendered ones.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use url::Url;

/// Errors a renderer can surface
///
/// The crawler treats every variant uniformly as "no extraction possible";
/// the distinction exists for logging.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation timeout for {url}")]
    Timeout { url: String },
}

/// A rendered page as returned by the rendering capability
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The final document markup
    pub html: String,

    /// Absolute same-document anchor targets
    pub links: Vec<String>,

    /// Response headers, as received
    pub headers: HashMap<String, String>,
}

/// The rendering capability contract
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders a URL within a bounded navigation budget
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError>;
}

/// HTTP-fetch implementation of the rendering contract
///
/// The underlying client is initialized lazily on the first fetch and
/// shared by every subsequent one; per-fetch state is scoped to the request
/// and released on every path.
pub struct HttpRenderer {
    user_agent: String,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpRenderer {
    /// Creates a new HTTP renderer
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The crawler's user-agent string
    /// * `timeout` - The per-navigation budget
    pub fn new(user_agent: String, timeout: Duration) -> Self {
        Self {
            user_agent,
            timeout,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, RenderError> {
        self.client
            .get_or_try_init(|| async {
                Client::builder()
                    .user_agent(self.user_agent.clone())
                    .timeout(self.timeout)
                    .connect_timeout(Duration::from_secs(10))
                    .gzip(true)
                    .brotli(true)
                    .build()
            })
            .await
            .map_err(|e| RenderError::Navigation {
                url: String::new(),
                message: format!("client init: {}", e),
            })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url) -> Result<RenderedPage, RenderError> {
        let client = self.client().await?;

        let response = client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let links = extract_anchor_targets(&html, &final_url);

        Ok(RenderedPage {
            html,
            links,
            headers,
        })
    }
}

/// Extracts absolute anchor targets from markup
///
/// Excluded: `javascript:`, `mailto:`, `tel:` and `data:` targets,
/// fragment-only anchors, download links, and anything that does not
/// resolve to an HTTP(S) URL against the base.
pub fn extract_anchor_targets(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://site.ygg/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.ygg/page">Link</a></body></html>"#;
        let links = extract_anchor_targets(html, &base_url());
        assert_eq!(links, vec!["https://other.ygg/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let links = extract_anchor_targets(html, &base_url());
        assert_eq!(links, vec!["https://site.ygg/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        let links = extract_anchor_targets(html, &base_url());
        assert_eq!(links, vec!["https://site.ygg/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">Js</a>
            <a href="mailto:x@site.ygg">Mail</a>
            <a href="tel:+1234">Call</a>
            <a href="data:text/html,hi">Data</a>
        </body></html>"#;
        assert!(extract_anchor_targets(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(extract_anchor_targets(html, &base_url()).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let html = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        assert!(extract_anchor_targets(html, &base_url()).is_empty());
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"<html><body>
            <a href="/valid">Valid</a>
            <a href="javascript:alert('no')">Invalid</a>
            <a href="/another-valid">Valid</a>
        </body></html>"#;
        let links = extract_anchor_targets(html, &base_url());
        assert_eq!(links.len(), 2);
    }
}
