//! `huddle.toml` configuration.
//!
//! Settings are resolved in this order, later wins:
//! 1. built-in defaults
//! 2. the config file (`--config PATH`, or `./huddle.toml` if present)
//! 3. environment variables (`HUDDLE_TIMEZONE`, `HUDDLE_SLOT_MINUTES`, `HUDDLE_LOG`)

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "huddle.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Slot length used when a command omits `--duration`.
    pub default_slot_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_slot_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// IANA zone for date-times given without an offset.
    pub timezone: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub input: InputConfig,
    pub log: LogConfig,
}

impl Config {
    /// Resolve configuration from `path`, the default file, and the environment.
    ///
    /// An explicit path must exist. The default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(tz) = std::env::var("HUDDLE_TIMEZONE") {
            self.input.timezone = tz;
        }
        if let Ok(minutes) = std::env::var("HUDDLE_SLOT_MINUTES") {
            self.engine.default_slot_minutes = minutes
                .trim()
                .parse()
                .with_context(|| format!("HUDDLE_SLOT_MINUTES is not a number: '{}'", minutes))?;
        }
        if let Ok(level) = std::env::var("HUDDLE_LOG") {
            self.log.level = level;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.engine.default_slot_minutes <= 0 {
            bail!(
                "engine.default_slot_minutes must be positive, got {}",
                self.engine.default_slot_minutes
            );
        }
        EnvFilter::try_new(&self.log.level)
            .with_context(|| format!("Invalid log level: '{}'", self.log.level))?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.input
            .timezone
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown IANA timezone: '{}'", self.input.timezone))
    }
}
