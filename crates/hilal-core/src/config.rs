use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};
use crate::types::CalendarVariant;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// `tabular` or `official`.
    pub default: String,
    /// Capacity of the observational month cache.
    pub cache_capacity: usize,
}

impl CalendarConfig {
    /// ## Summary
    /// Returns the configured default calendar variant.
    ///
    /// ## Errors
    /// Returns `UnknownVariant` if the token is neither `tabular` nor `official`.
    pub fn variant(&self) -> CoreResult<CalendarVariant> {
        self.default.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Safety cap for materializing unbounded rules.
    pub max_instances: usize,
    /// Ceiling on the number of periods a single enumeration may advance.
    pub max_periods: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional `hilal.toml`, and `HILAL_*` environment
    /// variables. Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("calendar.default", CalendarVariant::Official.as_str())?
            .set_default("calendar.cache_capacity", 512)?
            .set_default("engine.max_instances", 1000)?
            .set_default("engine.max_periods", 200_000)?
            .set_default("logging.level", "warn")?
            // TOML file
            .add_source(config::File::with_name("hilal.toml").required(false))
            // Environment
            .add_source(
                config::Environment::with_prefix("HILAL")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize cleanly but are unusable.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` naming the offending key, or `UnknownVariant`.
    pub fn validate(&self) -> CoreResult<()> {
        self.calendar.variant()?;
        if self.calendar.cache_capacity == 0 {
            return Err(CoreError::InvalidConfiguration(
                "calendar.cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.engine.max_periods == 0 {
            return Err(CoreError::InvalidConfiguration(
                "engine.max_periods must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
