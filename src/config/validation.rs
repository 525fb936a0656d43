use crate::config::types::{CrawlerConfig, SiteConfig, SiteProfile, UserAgentConfig};
use crate::url::matches_domain;
use crate::ConfigError;
use url::Url;

/// Validates the entire site profile
pub fn validate(profile: &SiteProfile) -> Result<(), ConfigError> {
    validate_site_config(&profile.site)?;
    validate_crawler_config(&profile.crawler)?;
    validate_user_agent_config(&profile.user_agent)?;
    Ok(())
}

/// Validates a crawl start URL against the profile domain
pub fn validate_base_url(base_url: &str, domain: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use HTTP or HTTPS",
            base_url
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidUrl(format!("Base URL '{}' has no host", base_url)))?
        .to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if !matches_domain(domain, host) {
        return Err(ConfigError::Validation(format!(
            "Base URL '{}' is outside the profile domain '{}'",
            base_url, domain
        )));
    }

    Ok(url)
}

fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    validate_domain_pattern(&site.domain)?;

    if let Some(base_url) = &site.base_url {
        validate_base_url(base_url, &site.domain)?;
    }

    for path in &site.sitemap_paths {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "sitemap path '{}' must start with '/'",
                path
            )));
        }
    }

    if site.keep_query_params.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keep-query-params cannot contain empty names".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page-limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "delay-ms must be <= 60000, got {}",
            config.delay_ms
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates a domain pattern (supports a leading `*.` wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    // localhost-style hosts are allowed so profiles can target local mirrors
    if !domain.contains('.') && domain != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
