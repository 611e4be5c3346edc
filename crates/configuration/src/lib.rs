//! # Journal Configuration
//!
//! Strongly-typed, file-loadable parameter sets for every tunable analysis
//! in the workspace: drift detection, note sentiment, and cohort splitting.
//! Each parameter struct carries the documented defaults, so consumers can
//! run entirely without a configuration file.

use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalyticsConfig, CohortParams, DriftParams, SentimentParams, SplitMethod};

/// Loads the analytics configuration from the `analytics.toml` file.
///
/// The file is optional; a missing file (or any missing section) resolves
/// to the default parameter set.
pub fn load_config() -> Result<AnalyticsConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("analytics").required(false))
        .build()?;

    let config = builder.try_deserialize::<AnalyticsConfig>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects parameter combinations that would make an analysis meaningless.
pub fn validate(config: &AnalyticsConfig) -> Result<(), ConfigError> {
    if config.drift.z_score_window < 2 {
        return Err(ConfigError::ValidationError(
            "drift.z_score_window must be at least 2".to_string(),
        ));
    }
    if config.drift.z_score_threshold <= 0.0 || config.drift.cusum_threshold <= 0.0 {
        return Err(ConfigError::ValidationError(
            "drift thresholds must be positive".to_string(),
        ));
    }
    if config.drift.cusum_drift < 0.0 {
        return Err(ConfigError::ValidationError(
            "drift.cusum_drift must not be negative".to_string(),
        ));
    }
    if let Some(pct) = config.cohort.split_point {
        if pct > 100 {
            return Err(ConfigError::ValidationError(format!(
                "cohort.split_point must be between 0 and 100, got {pct}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AnalyticsConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_loads_full_defaults() {
        let config = from_toml("");
        assert_eq!(config.drift.z_score_window, 20);
        assert_eq!(config.sentiment.min_note_length, 10);
        assert_eq!(config.cohort.method, SplitMethod::Equal);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config = from_toml(
            r#"
            [drift]
            z_score_window = 30

            [cohort]
            method = "percentage"
            split_point = 70
            "#,
        );
        assert_eq!(config.drift.z_score_window, 30);
        assert_eq!(config.drift.z_score_threshold, 2.0);
        assert_eq!(config.cohort.method, SplitMethod::Percentage);
        assert_eq!(config.cohort.split_point, Some(70));
    }

    #[test]
    fn rejects_degenerate_windows() {
        let config = from_toml("[drift]\nz_score_window = 1\n");
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
