//! Configuration validation.

use tracing::warn;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, TrellisConfig};

/// Validates semantic constraints the schema cannot express.
pub fn validate_config(config: &TrellisConfig) -> ConfigResult<()> {
    let mount = &config.application.mount_path;
    if mount.is_empty() {
        return Err(ConfigError::Invalid(
            "application.mount_path must not be empty".to_string(),
        ));
    }
    if mount.contains('/') {
        return Err(ConfigError::Invalid(format!(
            "application.mount_path must be a single path segment, got '{mount}'"
        )));
    }

    if config.store.max_pages_per_session == 0 {
        return Err(ConfigError::Invalid(
            "store.max_pages_per_session must be at least 1".to_string(),
        ));
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        warn!("logging.output is 'file' but logging.file_path is unset; falling back to stdout");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TrellisConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_mount_path_is_rejected() {
        let mut config = TrellisConfig::default();
        config.application.mount_path = String::new();

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_multi_segment_mount_path_is_rejected() {
        let mut config = TrellisConfig::default();
        config.application.mount_path = "shop/app".to_string();

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_store_capacity_is_rejected() {
        let mut config = TrellisConfig::default();
        config.store.max_pages_per_session = 0;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
