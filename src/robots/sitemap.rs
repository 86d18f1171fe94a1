//! Sitemap body parsing
//!
//! Extracts candidate URLs from sitemap XML. The parser is intentionally
//! lenient: every `<loc>` element counts, whether it sits in a `<urlset>`
//! or a `<sitemapindex>`, and malformed input yields an empty list rather
//! than an error.

use scraper::{Html, Selector};

/// Extracts every `<loc>` occurrence from a sitemap body
///
/// # Arguments
///
/// * `body` - The raw sitemap document
///
/// # Returns
///
/// All non-empty `<loc>` text contents, in document order
pub fn parse_sitemap(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);

    let selector = match Selector::parse("loc") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}
