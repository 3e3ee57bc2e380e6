//! TOML-based engine configuration.
//!
//! Stores the user-tunable knobs of the streak engine:
//! - Daily session target and grace-period behavior
//! - Habit-day boundary hour and timezone offset
//! - Cache TTL and history lookback window
//!
//! Configuration is stored at `~/.config/kindled/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_TTL_SECS;
use crate::calendar::{HabitCalendar, DEFAULT_BOUNDARY_HOUR};
use crate::error::{ConfigError, ValidationError};
use crate::streak::DEFAULT_LOOKBACK_DAYS;

/// Returns `~/.config/kindled[-dev]/` based on KINDLED_ENV.
///
/// Set KINDLED_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("KINDLED_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("kindled-dev")
    } else {
        base_dir.join("kindled")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/kindled/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sessions per habit day required for the day to count.
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
    /// Local hour (0-23) at which a new habit day begins.
    #[serde(default = "default_boundary_hour")]
    pub boundary_hour: u32,
    /// Offset in hours from UTC used to read the local clock.
    #[serde(default)]
    pub timezone_offset_hours: i32,
    /// Whether an incomplete "today" is skipped instead of breaking the
    /// streak.
    #[serde(default = "default_true")]
    pub grace_period: bool,
    /// Cache entry lifetime in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
    /// History reconstruction window in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

// Default functions
fn default_daily_target() -> u32 {
    2
}
fn default_boundary_hour() -> u32 {
    DEFAULT_BOUNDARY_HOUR
}
fn default_true() -> bool {
    true
}
fn default_cache_ttl_secs() -> i64 {
    DEFAULT_TTL_SECS
}
fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_target: default_daily_target(),
            boundary_hour: default_boundary_hour(),
            timezone_offset_hours: 0,
            grace_period: true,
            cache_ttl_secs: default_cache_ttl_secs(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl EngineConfig {
    /// Check every field the calculators will later rely on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.daily_target == 0 {
            return Err(ValidationError::non_positive("daily_target"));
        }
        if self.lookback_days == 0 {
            return Err(ValidationError::non_positive("lookback_days"));
        }
        if self.cache_ttl_secs <= 0 {
            return Err(ValidationError::non_positive("cache_ttl_secs"));
        }
        // Boundary hour and offset share the calendar's own rules.
        self.calendar().map(|_| ())
    }

    /// Build the habit calendar this configuration describes.
    pub fn calendar(&self) -> Result<HabitCalendar, ValidationError> {
        HabitCalendar::new(self.boundary_hour, self.timezone_offset_hours)
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: EngineConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.daily_target, 2);
        assert_eq!(cfg.boundary_hour, 3);
        assert_eq!(cfg.timezone_offset_hours, 0);
        assert!(cfg.grace_period);
        assert_eq!(cfg.cache_ttl_secs, 300);
        assert_eq!(cfg.lookback_days, 365);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: EngineConfig = toml::from_str("daily_target = 3\nboundary_hour = 5\n").unwrap();
        assert_eq!(cfg.daily_target, 3);
        assert_eq!(cfg.boundary_hour, 5);
        assert_eq!(cfg.lookback_days, 365);
        assert!(cfg.grace_period);
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = EngineConfig {
            daily_target: 4,
            boundary_hour: 4,
            timezone_offset_hours: 9,
            grace_period: false,
            cache_ttl_secs: 60,
            lookback_days: 30,
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = EngineConfig::default();
        cfg.daily_target = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.boundary_hour = 24;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.cache_ttl_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_calendar_uses_configured_boundary() {
        let mut cfg = EngineConfig::default();
        cfg.boundary_hour = 5;
        let cal = cfg.calendar().unwrap();
        assert_eq!(cal.boundary_hour(), 5);
    }
}
