use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PixcycleError, Result};

/// Top-level playlist file: the apps, the order they are visited in and the
/// scheduler tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub apps: Vec<AppEntry>,
    pub queue: Vec<usize>,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            apps: vec![AppEntry {
                name: "fireflies".to_string(),
                night_visible: true,
                display_secs: 10.0,
                repetitions: 1,
                star_file: "../fireflies/fireflies.star".to_string(),
                args: "n_fireflies=15 glow=15 color=#FFFF00 rnd_color=False show_clock=True"
                    .to_string(),
                webp_file: "../fireflies/fireflies.webp".to_string(),
            }],
            queue: vec![0],
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            PixcycleError::config(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }
}

/// One app as written in the playlist file. Validated into an
/// [`AppDefinition`](crate::AppDefinition) by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    /// Shown outside the day window too.
    pub night_visible: bool,
    pub display_secs: f64,
    #[serde(default = "default_repetitions")]
    pub repetitions: u32,
    pub star_file: String,
    /// Space-delimited `key=value` tokens handed to the renderer.
    #[serde(default)]
    pub args: String,
    pub webp_file: String,
}

fn default_repetitions() -> u32 {
    1
}

/// Timing knobs for the playback loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Lower bound applied to every post-push sleep.
    #[serde(default = "default_min_sleep_secs")]
    pub min_sleep_secs: f64,
    /// Pause inserted after a pass that displayed nothing.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: f64,
    #[serde(default)]
    pub command_timeout_secs: Option<f64>,
}

fn default_min_sleep_secs() -> f64 {
    1.0
}

fn default_idle_secs() -> f64 {
    30.0
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            min_sleep_secs: default_min_sleep_secs(),
            idle_secs: default_idle_secs(),
            command_timeout_secs: None,
        }
    }
}

impl SchedulerSettings {
    pub fn min_sleep(&self) -> Result<Duration> {
        positive_secs("min_sleep_secs", self.min_sleep_secs)
    }

    pub fn idle(&self) -> Result<Duration> {
        positive_secs("idle_secs", self.idle_secs)
    }

    pub fn command_timeout(&self) -> Result<Option<Duration>> {
        self.command_timeout_secs
            .map(|secs| positive_secs("command_timeout_secs", secs))
            .transpose()
    }
}

/// Converts a seconds value from configuration, rejecting zero, negative and
/// non-finite values.
pub(crate) fn positive_secs(field: &str, secs: f64) -> Result<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs)
            .map_err(|err| PixcycleError::config(format!("`{field}` = {secs}: {err}")))
    } else {
        Err(PixcycleError::config(format!(
            "`{field}` must be a positive number of seconds, got {secs}"
        )))
    }
}
