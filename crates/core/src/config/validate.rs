use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Portal base URL is an http(s) origin and the timeout is non-zero
/// - Scheduler trigger time is a valid hour/minute and the tick interval
///   is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Portal validation
    if config.portal.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "portal.base_url cannot be empty".to_string(),
        ));
    }
    if !config.portal.base_url.starts_with("http") {
        return Err(ConfigError::ValidationError(format!(
            "portal.base_url must be an http(s) origin, got '{}'",
            config.portal.base_url
        )));
    }
    if config.portal.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "portal.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Scheduler validation
    if config.scheduler.tick_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.tick_interval_secs cannot be 0".to_string(),
        ));
    }
    if config.scheduler.daily_hour > 23 {
        return Err(ConfigError::ValidationError(format!(
            "scheduler.daily_hour must be 0-23, got {}",
            config.scheduler.daily_hour
        )));
    }
    if config.scheduler.daily_minute > 59 {
        return Err(ConfigError::ValidationError(format!(
            "scheduler.daily_minute must be 0-59, got {}",
            config.scheduler.daily_minute
        )));
    }

    Ok(())
}
