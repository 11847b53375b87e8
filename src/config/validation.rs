//! Configuration validation logic.

use crate::api::MAX_PAGE_SIZE;
use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.api.page_size == 0 || config.api.page_size > MAX_PAGE_SIZE {
        return Err(Error::ConfigValidation {
            field: "api.page_size".to_string(),
            message: format!(
                "Page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, config.api.page_size
            ),
        });
    }

    if config.api.max_retries == 0 {
        return Err(Error::ConfigValidation {
            field: "api.max_retries".to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }

    if !(config.api.rate_limit_delay_secs >= 0.0) {
        return Err(Error::ConfigValidation {
            field: "api.rate_limit_delay_secs".to_string(),
            message: format!(
                "Delay must be a non-negative number (got {})",
                config.api.rate_limit_delay_secs
            ),
        });
    }

    if config.output.date_format.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "output.date_format".to_string(),
            message: "Date bucket format cannot be empty".to_string(),
        });
    }

    if config.output.base_dir.as_os_str().is_empty() {
        return Err(Error::MissingConfig("output.base_dir".to_string()));
    }

    Ok(())
}

/// Validate a bearer token before using it.
pub fn validate_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::MissingConfig("access token".to_string()));
    }

    let lower = token.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_token") {
        return Err(Error::ConfigValidation {
            field: "token".to_string(),
            message: "Token appears to be a placeholder. Provide your actual access token."
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = Config::default();
        config.api.page_size = 0;
        assert!(validate_config(&config).is_err());

        config.api.page_size = 51;
        assert!(validate_config(&config).is_err());

        config.api.page_size = 50;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_negative_delay_rejected() {
        let mut config = Config::default();
        config.api.rate_limit_delay_secs = -1.0;
        assert!(validate_config(&config).is_err());

        config.api.rate_limit_delay_secs = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_token_validation() {
        assert!(validate_token("AQX-real-looking-token").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("REPLACEME").is_err());
        assert!(validate_token("your_token_here").is_err());
    }
}
