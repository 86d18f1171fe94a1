use crate::config::types::{Config, CrawlerConfig, DomainPolicy, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_domain_policy(&config.domains)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.nav_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "nav_timeout must be >= 1s, got {}s",
            config.nav_timeout_secs
        )));
    }

    if config.robots_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "robots_timeout must be >= 1s, got {}s",
            config.robots_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &crate::config::types::StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the domain admission policy
fn validate_domain_policy(policy: &DomainPolicy) -> Result<(), ConfigError> {
    if policy.allowed_suffixes.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_suffixes cannot be empty".to_string(),
        ));
    }

    for suffix in &policy.allowed_suffixes {
        if !suffix.starts_with('.') {
            return Err(ConfigError::InvalidSuffix(format!(
                "Suffix '{}' must start with '.'",
                suffix
            )));
        }

        let body = &suffix[1..];
        if body.is_empty()
            || !body
                .chars()
                .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ConfigError::InvalidSuffix(format!(
                "Suffix '{}' contains invalid characters",
                suffix
            )));
        }

        if body.contains("..") || body.ends_with('.') {
            return Err(ConfigError::InvalidSuffix(format!(
                "Suffix '{}' is malformed",
                suffix
            )));
        }
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &crate::config::types::SearchConfig) -> Result<(), ConfigError> {
    if config.candidate_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "candidate_limit must be >= 1, got {}",
            config.candidate_limit
        )));
    }

    if config.default_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "default_limit must be >= 1, got {}",
            config.default_limit
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
