use crate::config::types::{Config, CrawlConfig, HttpConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on the worker pool size
pub const MAX_CONCURRENCY: u32 = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawl engine configuration
pub fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.max_concurrency
        )));
    }

    if config.max_body_size == Some(0) {
        return Err(ConfigError::Validation(
            "max_body_size must be greater than 0 when set".to_string(),
        ));
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    for name in config.headers.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "header names cannot be empty".to_string(),
            ));
        }
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}
