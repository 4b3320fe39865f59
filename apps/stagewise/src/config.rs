//! # Wizard Configuration
//!
//! TOML definition of a wizard flow.
//!
//! ```toml
//! transition_duration_ms = 600
//!
//! [[stages]]
//! key = "credentials"
//! title = "Credentials"
//! ```
//!
//! ## Environment Variables
//!
//! - `STAGEWISE_TRANSITION_MS`: overrides `transition_duration_ms`
//!
//! Flows are capped at [`MAX_STAGES`] stages and [`MAX_TRANSITION_MS`].

use serde::{Deserialize, Serialize};
use stagewise_core::{DEFAULT_TRANSITION_MS, StageError};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the transition duration.
pub const TRANSITION_MS_ENV: &str = "STAGEWISE_TRANSITION_MS";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Maximum number of stages in a flow.
pub const MAX_STAGES: usize = 4096;

/// Maximum transition duration (one minute).
pub const MAX_TRANSITION_MS: u64 = 60_000;

/// One stage of the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stable identity of the stage.
    pub key: String,
    /// Display title; falls back to the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StageConfig {
    fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: Some(title.to_string()),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }
}

/// A complete wizard definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "default_transition_ms")]
    pub transition_duration_ms: u64,
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,
}

fn default_transition_ms() -> u64 {
    DEFAULT_TRANSITION_MS
}

fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new("credentials", "Credentials"),
        StageConfig::new("identity", "Identity"),
        StageConfig::new("preferences", "Preferences"),
        StageConfig::new("confirm", "Confirm"),
    ]
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            transition_duration_ms: default_transition_ms(),
            stages: default_stages(),
        }
    }
}

impl WizardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, StageError> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| StageError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, StageError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            StageError::Io(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(StageError::Config(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            StageError::Io(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` if given, otherwise the defaults, then apply env overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, StageError> {
        let config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.with_transition_override(std::env::var(TRANSITION_MS_ENV).ok().as_deref())
    }

    /// Apply a raw `STAGEWISE_TRANSITION_MS` value, if present.
    pub fn with_transition_override(mut self, raw: Option<&str>) -> Result<Self, StageError> {
        match raw {
            Some(raw) => {
                let ms = raw.trim().parse().map_err(|_| {
                    StageError::Config(format!(
                        "{} must be a non-negative integer, got '{}'",
                        TRANSITION_MS_ENV, raw
                    ))
                })?;
                self.with_transition_ms(ms)
            }
            None => Ok(self),
        }
    }

    /// Override the transition duration.
    pub fn with_transition_ms(mut self, ms: u64) -> Result<Self, StageError> {
        check_transition_ms(ms)?;
        self.transition_duration_ms = ms;
        Ok(self)
    }

    /// Resize the flow to `count` stages, keeping existing stages in order
    /// and naming new ones `stage-<n>`.
    pub fn with_stage_count(mut self, count: usize) -> Result<Self, StageError> {
        if count == 0 {
            return Err(StageError::EmptyFlow);
        }
        check_stage_count(count)?;
        self.stages.truncate(count);
        let mut n = self.stages.len();
        while self.stages.len() < count {
            let key = format!("stage-{}", n + 1);
            if !self.stages.iter().any(|s| s.key == key) {
                self.stages.push(StageConfig {
                    key,
                    title: None,
                });
            }
            n += 1;
        }
        Ok(self)
    }

    /// At least one stage, non-empty unique keys, everything within caps.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.stages.is_empty() {
            return Err(StageError::EmptyFlow);
        }
        check_stage_count(self.stages.len())?;
        check_transition_ms(self.transition_duration_ms)?;

        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            if stage.key.trim().is_empty() {
                return Err(StageError::Config("Stage key must not be empty".to_string()));
            }
            if !seen.insert(stage.key.as_str()) {
                return Err(StageError::Config(format!(
                    "Duplicate stage key '{}'",
                    stage.key
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }
}

fn check_stage_count(count: usize) -> Result<(), StageError> {
    if count > MAX_STAGES {
        return Err(StageError::Config(format!(
            "Flow of {} stages exceeds maximum allowed {}",
            count, MAX_STAGES
        )));
    }
    Ok(())
}

fn check_transition_ms(ms: u64) -> Result<(), StageError> {
    if ms > MAX_TRANSITION_MS {
        return Err(StageError::Config(format!(
            "Transition of {} ms exceeds maximum allowed {} ms",
            ms, MAX_TRANSITION_MS
        )));
    }
    Ok(())
}
