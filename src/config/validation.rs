use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.backoff_base < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff_base must be >= 1, got {}",
            config.backoff_base
        )));
    }

    if config.max_concurrency < 1 || config.max_concurrency > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 1000, got {}",
            config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.pool.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent pool cannot be empty".to_string(),
        ));
    }

    if let Some(index) = config.pool.iter().position(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user-agent pool entry {} is blank",
            index
        )));
    }

    Ok(())
}
