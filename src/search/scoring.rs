//! Relevance scoring
//!
//! All signal contributions are additive; the sum is rounded to two
//! decimals at the end. Content term frequency saturates (linear up to 10
//! hits, logarithmic beyond) so long pages cannot dominate purely by
//! repetition.

use crate::storage::PageRecord;
use regex::Regex;
use url::Url;

/// Scores a candidate page against a query (higher is better)
pub fn score_page(page: &PageRecord, query: &str) -> f64 {
    let query_lower = query.trim().to_lowercase();
    let words: Vec<&str> = query_lower.split_whitespace().collect();

    let mut score = 0.0_f64;

    // Path shape: homepage boost and depth penalty
    let (is_homepage, segment_count) = path_shape(&page.url);

    if is_homepage {
        let label = page.domain.split('.').next().unwrap_or("");
        if !label.is_empty() && (query_lower == label || contains_word(&query_lower, label)) {
            score += 100.0;
        } else {
            score += 20.0;
        }
    }

    score -= 2.0 * segment_count as f64;

    // Title: exact equality beats per-word hits
    let title_lower = page.title.to_lowercase();
    if !title_lower.is_empty() && title_lower == query_lower {
        score += 50.0;
    } else {
        for word in &words {
            if contains_word(&title_lower, word) {
                score += 15.0;
            }
        }
    }

    // Keywords: exact keyword match beats a substring hit
    let keywords: Vec<String> = page
        .meta_keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.iter().any(|k| *k == query_lower) {
        score += 30.0;
    } else if !query_lower.is_empty() && keywords.iter().any(|k| k.contains(&query_lower)) {
        score += 10.0;
    }

    // Meta description: per-word substring hits
    let description_lower = page.meta_description.to_lowercase();
    for word in &words {
        if description_lower.contains(word) {
            score += 5.0;
        }
    }

    // Author
    if !query_lower.is_empty() && page.meta_author.to_lowercase().contains(&query_lower) {
        score += 5.0;
    }

    // Content: saturating term frequency
    let matches = count_occurrences(&page.content, query_lower.as_str());
    score += matches.min(10) as f64 + 2.0 * ((matches + 1) as f64).ln();

    (score * 100.0).round() / 100.0
}

/// Returns (is_homepage, non-empty path segment count) for a stored URL
fn path_shape(url: &str) -> (bool, usize) {
    match Url::parse(url) {
        Ok(parsed) => {
            let count = parsed.path().split('/').filter(|s| !s.is_empty()).count();
            (count == 0, count)
        }
        Err(_) => (false, 0),
    }
}

/// Whole-word, case-insensitive containment
fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }

    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

/// Counts escaped, case-insensitive literal occurrences
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    Regex::new(&format!("(?i){}", regex::escape(needle)))
        .map(|re| re.find_iter(haystack).count())
        .unwrap_or(0)
}
