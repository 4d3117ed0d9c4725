use crate::config::types::{CalendarConfig, Config, MarketplaceConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_marketplace_config(&config.marketplace)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_calendar_config(&config.calendar)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates marketplace access configuration
fn validate_marketplace_config(config: &MarketplaceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.locale.is_empty() {
        return Err(ConfigError::Validation("locale cannot be empty".to_string()));
    }

    if config.currency.len() != 3 || !config.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "currency must be a three letter code, got '{}'",
            config.currency
        )));
    }

    if config.items_per_grid < 1 || config.items_per_grid > 100 {
        return Err(ConfigError::Validation(format!(
            "items_per_grid must be between 1 and 100, got {}",
            config.items_per_grid
        )));
    }

    if config.reviews_page_size < 1 || config.reviews_page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "reviews_page_size must be between 1 and 100, got {}",
            config.reviews_page_size
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(key) = &config.api_key {
        if key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api_key cannot be blank when set".to_string(),
            ));
        }
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

/// Validates calendar refresh configuration
fn validate_calendar_config(config: &CalendarConfig) -> Result<(), ConfigError> {
    if config.suspicious_booking_nights >= config.fabricated_booking_nights {
        return Err(ConfigError::Validation(format!(
            "suspicious_booking_nights ({}) must be lower than fabricated_booking_nights ({})",
            config.suspicious_booking_nights, config.fabricated_booking_nights
        )));
    }

    if config.months < 1 || config.months > 24 {
        return Err(ConfigError::Validation(format!(
            "months must be between 1 and 24, got {}",
            config.months
        )));
    }

    if config.max_rate_quotes < 1 {
        return Err(ConfigError::Validation(format!(
            "max_rate_quotes must be >= 1, got {}",
            config.max_rate_quotes
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
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

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
