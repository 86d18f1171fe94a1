use url::Url;

/// Extracts the host from a URL
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ygglens::url::extract_domain;
///
/// let url = Url::parse("https://site.ygg/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("site.ygg".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a host names a private or loopback address
///
/// Covers `localhost`, the IPv4 loopback and RFC 1918 ranges, and the IPv6
/// loopback. Hostname heuristics only; no DNS resolution is performed.
pub fn is_private_host(host: &str) -> bool {
    if host == "localhost" || host == "::1" || host == "[::1]" {
        return true;
    }

    if host.starts_with("127.") || host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }

    // 172.16.0.0/12
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some(second) = rest.split('.').next() {
            if let Ok(octet) = second.parse::<u8>() {
                return (16..=31).contains(&octet);
            }
        }
    }

    false
}
