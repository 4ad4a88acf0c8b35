//! Layered settings.
//!
//! Built-in defaults, then an optional TOML file, then `ENGINEWATCH_*`
//! environment variables (`ENGINEWATCH_TELEGRAM__TOKEN=...`). The binary
//! applies command-line flags last.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

use crate::alert::TelegramSettings;
use crate::data::duration::parse_duration;
use crate::data::table::DEFAULT_TABLE_CAPACITY;
use crate::data::Thresholds;
use crate::monitor::DEFAULT_ITERATIONS;

pub const ENV_PREFIX: &str = "ENGINEWATCH";

/// Legacy variable names still honoured for the bot credentials.
const TOKEN_VAR: &str = "TELEGRAM_TOKEN";
const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port name; when unset the first likely microcontroller port is used.
    pub port: Option<String>,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 9600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub iterations: usize,
    /// Pause between iterations, e.g. "1s" or "500ms".
    pub interval: String,
    /// Rows kept in the sample table.
    pub capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            interval: "1s".to_string(),
            capacity: DEFAULT_TABLE_CAPACITY,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
            .with_context(|| format!("invalid interval {:?}", self.interval))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub serial: SerialConfig,
    pub monitor: MonitorConfig,
    pub thresholds: Thresholds,
    pub telegram: TelegramSettings,
}

impl Settings {
    /// Load settings from defaults, `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env.clone()),
        );

        let config = builder.build().with_context(|| match path {
            Some(p) => format!("failed to read configuration from {}", p.display()),
            None => "failed to read configuration".to_string(),
        })?;
        let mut settings: Settings = config
            .try_deserialize()
            .context("invalid configuration")?;

        let lookup = |key: &str| match &env {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        if settings.telegram.token.is_none() {
            settings.telegram.token = lookup(TOKEN_VAR);
        }
        if settings.telegram.chat_id.is_none() {
            settings.telegram.chat_id = lookup(CHAT_ID_VAR);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.temp_min >= t.temp_max {
            bail!("temp_min ({}) must be below temp_max ({})", t.temp_min, t.temp_max);
        }
        if t.rpm_min >= t.rpm_max {
            bail!("rpm_min ({}) must be below rpm_max ({})", t.rpm_min, t.rpm_max);
        }
        if t.vib_medium >= t.vib_high {
            bail!("vib_medium ({}) must be below vib_high ({})", t.vib_medium, t.vib_high);
        }
        if self.monitor.capacity == 0 {
            bail!("monitor.capacity must be at least 1");
        }
        if self.serial.baud == 0 {
            bail!("serial.baud must be positive");
        }
        self.monitor.interval()?;
        Ok(())
    }
}
