//! Page extraction
//!
//! Turns a rendered page into the persisted shape: title, meta fields,
//! whitespace-normalized main-content text, outbound links, and the
//! directive flags recorded for downstream respect. Metadata and the
//! meta-robots string are read from the markup before any content cleanup;
//! only afterwards is the indexable text pulled from the best-matching
//! main-content container with chrome elements skipped.

use crate::render::client::{RenderedPage, Renderer};
use crate::render::directives::Directives;
use crate::url::extract_domain;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use url::Url;

/// Containers tried, in order, for the main-content text
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "#content",
    "#main",
    ".content",
    ".main-content",
];

/// Elements that never contribute indexable text
const CHROME_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "iframe", "svg",
];

/// Class/id fragments marking obvious page chrome
const CHROME_HINTS: &[&str] = &[
    "nav",
    "menu",
    "sidebar",
    "footer",
    "header",
    "banner",
    "breadcrumb",
    "cookie",
];

/// Extracted page content, ready for persistence
#[derive(Debug, Clone)]
pub struct PageExtract {
    /// Canonical URL of the page
    pub url: String,

    /// Hostname of the page
    pub domain: String,

    /// Page title (empty if absent)
    pub title: String,

    /// Meta description (emptied when the page asserts nosnippet)
    pub meta_description: String,

    /// Comma-separated meta keywords
    pub meta_keywords: String,

    /// Meta author
    pub meta_author: String,

    /// Whitespace-normalized indexable text
    pub content: String,

    /// Outbound anchor targets (empty when the page asserts nofollow)
    pub links: Vec<String>,

    /// Effective nofollow flag, recorded for downstream respect
    pub nofollow: bool,

    /// Effective nosnippet flag, recorded for downstream respect
    pub nosnippet: bool,
}

/// Fetches pages through the rendering capability and extracts their
/// indexable shape
pub struct Extractor {
    renderer: Arc<dyn Renderer>,
}

impl Extractor {
    /// Creates a new extractor over a rendering capability
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Renders and extracts a page
    ///
    /// Returns `None` when the page cannot be fetched, or when either the
    /// `X-Robots-Tag` header or the meta-robots tag asserts `noindex`; in
    /// both cases the page is not persisted and its links are not
    /// followed. Render failures are logged, never propagated.
    pub async fn fetch_and_parse(&self, url: &Url) -> Option<PageExtract> {
        let rendered = match self.renderer.render(url).await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("No extraction for {}: {}", url, e);
                return None;
            }
        };

        self.parse_rendered(url, rendered)
    }

    fn parse_rendered(&self, url: &Url, rendered: RenderedPage) -> Option<PageExtract> {
        let document = Html::parse_document(&rendered.html);

        // Directives from both sources, OR-combined
        let header_flags = Directives::from_headers(&rendered.headers);
        let meta_flags = meta_content(&document, "robots")
            .map(|value| Directives::parse(&value))
            .unwrap_or_default();
        let effective = header_flags | meta_flags;

        if effective.noindex {
            tracing::debug!("Page {} excluded by noindex directive", url);
            return None;
        }

        let domain = extract_domain(url)?;

        // Metadata first, while the full markup is intact
        let title = extract_title(&document).unwrap_or_default();
        let meta_description = if effective.nosnippet {
            String::new()
        } else {
            meta_content(&document, "description").unwrap_or_default()
        };
        let meta_keywords = meta_content(&document, "keywords").unwrap_or_default();
        let meta_author = meta_content(&document, "author").unwrap_or_default();

        // Indexable text from the main-content container, chrome stripped
        let content = extract_content(&document);

        let links = if effective.nofollow {
            Vec::new()
        } else {
            rendered.links
        };

        Some(PageExtract {
            url: url.to_string(),
            domain,
            title,
            meta_description,
            meta_keywords,
            meta_author,
            content,
            links,
            nofollow: effective.nofollow,
            nosnippet: effective.nosnippet,
        })
    }
}

/// Extracts the page title
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads the content attribute of a named meta tag
fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name=\"{}\"]", name)).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts whitespace-normalized text from the best-matching content
/// container, falling back to the full body
fn extract_content(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(container) = document.select(&selector).next() {
                let text = collect_text(container);
                if !text.is_empty() {
                    return text;
                }
            }
        }
    }

    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return collect_text(body);
        }
    }

    String::new()
}

/// Collects text below an element, skipping chrome subtrees, and normalizes
/// whitespace
fn collect_text(root: ElementRef) -> String {
    let mut out = String::new();
    collect_text_into(root, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text_into(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&text.text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    if !is_chrome(&child_ref) {
                        collect_text_into(child_ref, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Heuristic for non-content structural elements
fn is_chrome(element: &ElementRef) -> bool {
    let value = element.value();

    if CHROME_TAGS.contains(&value.name()) {
        return true;
    }

    if let Some(role) = value.attr("role") {
        if matches!(role, "navigation" | "banner" | "contentinfo") {
            return true;
        }
    }

    for attr in ["class", "id"] {
        if let Some(attr_value) = value.attr(attr) {
            let lowered = attr_value.to_lowercase();
            if CHROME_HINTS.iter().any(|hint| lowered.contains(hint)) {
                return true;
            }
        }
    }

    false
}
