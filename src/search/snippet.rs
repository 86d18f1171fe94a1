//! Snippet generation
//!
//! A snippet is a window of content around the first query hit, or a plain
//! prefix of the content when the query never occurs in it.

use regex::Regex;

const ELLIPSIS: &str = "...";

/// Generates a snippet for a search hit
///
/// Locates the first case-insensitive occurrence of the query in the
/// content and returns a window of `max_len / 2` characters on each side,
/// ellipsis-prefixed/suffixed where the window cuts the content. A query
/// absent from the content yields the first `max_len` characters with a
/// trailing ellipsis.
///
/// # Arguments
///
/// * `content` - The page content
/// * `query` - The search query
/// * `max_len` - The window size (200 gives the classic ±100 window)
pub fn generate_snippet(content: &str, query: &str, max_len: usize) -> String {
    if content.is_empty() {
        return String::new();
    }

    let query = query.trim();
    let hit = if query.is_empty() {
        None
    } else {
        Regex::new(&format!("(?i){}", regex::escape(query)))
            .ok()
            .and_then(|re| re.find(content))
    };

    match hit {
        Some(m) => {
            let half = max_len / 2;
            let start = floor_char_boundary(content, m.start().saturating_sub(half));
            let end = ceil_char_boundary(content, (m.end() + half).min(content.len()));

            let mut snippet = String::new();
            if start > 0 {
                snippet.push_str(ELLIPSIS);
            }
            snippet.push_str(&content[start..end]);
            if end < content.len() {
                snippet.push_str(ELLIPSIS);
            }
            snippet
        }
        None => {
            let prefix: String = content.chars().take(max_len).collect();
            format!("{}{}", prefix, ELLIPSIS)
        }
    }
}

/// Largest char boundary not greater than `index`
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary not less than `index`
fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}
