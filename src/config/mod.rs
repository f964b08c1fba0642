//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `SKILLCAST`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use skillcast::config::SkillConfig;
//!
//! let config = SkillConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;

pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root configuration for the skill request-processing core.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SkillConfig {
    /// Skill identity configuration
    #[serde(default)]
    pub skill: SkillSection,
}

/// Identity settings consumed by the mediator's verification step.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SkillSection {
    /// The application id every inbound envelope must assert, compared
    /// exactly and case-sensitively.
    pub expected_application_id: Option<String>,
}

impl SkillConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present (development), then reads variables
    /// with the `SKILLCAST` prefix, e.g.
    /// `SKILLCAST__SKILL__EXPECTED_APPLICATION_ID=amzn1.ask.skill.xxx`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SKILLCAST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the expected application id is missing
    /// or blank. Identity verification cannot run without it.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.skill.expected_application_id.as_deref() {
            None => Err(ValidationError::MissingRequired(
                "skill.expected_application_id",
            )),
            Some(id) if id.trim().is_empty() => Err(ValidationError::BlankApplicationId),
            Some(_) => Ok(()),
        }
    }

    /// The configured expected application id, if any.
    pub fn expected_application_id(&self) -> Option<&str> {
        self.skill.expected_application_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn load_reads_prefixed_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SKILLCAST__SKILL__EXPECTED_APPLICATION_ID", "app-42");
        let config = SkillConfig::load().unwrap();
        env::remove_var("SKILLCAST__SKILL__EXPECTED_APPLICATION_ID");
        assert_eq!(config.expected_application_id(), Some("app-42"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_application_id() {
        let config = SkillConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_application_id() {
        let config = SkillConfig {
            skill: SkillSection {
                expected_application_id: Some("   ".to_string()),
            },
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::BlankApplicationId)
        ));
    }
}
