//! Robots directive flags from page-level sources
//!
//! A page can carry crawl directives in two places: the `X-Robots-Tag`
//! response header and the in-page `<meta name="robots">` tag. Each source
//! is parsed independently into the same flag set and the effective
//! directive is the OR of the two, so a restriction from either source
//! sticks.

use std::collections::HashMap;
use std::ops::BitOr;

/// Page-level robots directive flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directives {
    /// Page must not be indexed (and, for us, not persisted)
    pub noindex: bool,

    /// Links on the page must not be followed
    pub nofollow: bool,

    /// No snippet/description may be shown for the page
    pub nosnippet: bool,
}

impl Directives {
    /// Parses a directive value string (`"noindex, nofollow"` etc.)
    ///
    /// Tokens are separated by commas and/or whitespace and matched
    /// case-insensitively. Unknown tokens (including `all`, `index`,
    /// `follow`) are ignored; absence of a restriction is the default.
    pub fn parse(value: &str) -> Self {
        let mut flags = Self::default();

        for token in value.split(|c: char| c == ',' || c.is_whitespace()) {
            match token.trim().to_lowercase().as_str() {
                "noindex" => flags.noindex = true,
                "nofollow" => flags.nofollow = true,
                "nosnippet" => flags.nosnippet = true,
                "none" => {
                    // Shorthand for noindex + nofollow
                    flags.noindex = true;
                    flags.nofollow = true;
                }
                _ => {}
            }
        }

        flags
    }

    /// Parses the `X-Robots-Tag` header out of a response header map
    ///
    /// Header names are matched case-insensitively; a missing header means
    /// no restrictions.
    pub fn from_headers(headers: &HashMap<String, String>) -> Self {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("x-robots-tag"))
            .map(|(_, value)| Self::parse(value))
            .unwrap_or_default()
    }

    /// Returns true if no restriction is set
    pub fn is_unrestricted(&self) -> bool {
        !self.noindex && !self.nofollow && !self.nosnippet
    }
}

impl BitOr for Directives {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            noindex: self.noindex || rhs.noindex,
            nofollow: self.nofollow || rhs.nofollow,
            nosnippet: self.nosnippet || rhs.nosnippet,
        }
    }
}
