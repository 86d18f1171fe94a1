//! URL handling module for Ygglens
//!
//! This module provides URL normalization, host extraction, and the domain
//! admission policy that restricts crawling to allow-listed suffixes.

mod domain;
mod normalize;

use crate::config::DomainPolicy;

// Re-export main functions
pub use domain::{extract_domain, is_private_host};
pub use normalize::normalize_url;

/// Checks whether a hostname may be crawled under the domain policy
///
/// A host is admissible when it carries one of the allow-listed suffixes
/// (e.g. `.ygg`). Private and loopback hosts are admissible only when the
/// operator has enabled the exception, which is how local test servers get
/// through.
///
/// # Arguments
///
/// * `host` - The hostname to check (lowercase)
/// * `policy` - The configured domain policy
///
/// # Returns
///
/// * `true` - If the host may be crawled
/// * `false` - If the host is outside the allow-list
pub fn is_admissible_domain(host: &str, policy: &DomainPolicy) -> bool {
    if policy
        .allowed_suffixes
        .iter()
        .any(|suffix| host.ends_with(suffix.as_str()))
    {
        return true;
    }

    policy.allow_private_hosts && is_private_host(host)
}
