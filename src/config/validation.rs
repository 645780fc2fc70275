use crate::config::types::DownloadConfig;
use crate::ConfigError;

/// Validates a fully-assembled download configuration
pub fn validate(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.shard_size < 1 {
        return Err(ConfigError::Validation(format!(
            "max-videos must be >= 1, got {}",
            config.shard_size
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.max_retries > 100 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 100, got {}",
            config.max_retries
        )));
    }

    if config.retry_delay.as_secs() > 3600 {
        return Err(ConfigError::Validation(format!(
            "retry-delay must be <= 3600s, got {}s",
            config.retry_delay.as_secs()
        )));
    }

    if config.input_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "input path cannot be empty".to_string(),
        ));
    }

    if config.output_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
