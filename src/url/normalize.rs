use crate::UrlError;
use url::Url;

/// Normalizes a URL into the canonical form used for dedup and persistence
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or non-HTTP(S)
/// 2. Leave scheme and host untouched (the parser already lowercases them)
/// 3. Strip the trailing slash from the path, except for the root path,
///    which is forced to `/`
/// 4. Remove the fragment (everything after #)
///
/// Two URLs differing only by fragment or trailing slash normalize to the
/// same string. Normalization is idempotent.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use ygglens::url::normalize_url;
///
/// let url = normalize_url("https://site.ygg/docs/").unwrap();
/// assert_eq!(url.as_str(), "https://site.ygg/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    // Path: root stays "/", anything else loses a single trailing slash
    let path = url.path().to_string();
    if path.is_empty() {
        url.set_path("/");
    } else if path.len() > 1 && path.ends_with('/') {
        url.set_path(&path[..path.len() - 1]);
    }

    url.set_fragment(None);

    Ok(url)
}
