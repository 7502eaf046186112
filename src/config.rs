use crate::errors::{AppError, AppResult};
use crate::processor::TaskSettings;
use crate::types::{InputsConfiguration, ORBIT_LENGTH_MS};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from config.toml and environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub inputs: InputsSection,
    pub timing: TimingConfig,
    pub publishing: PublishingConfig,
}

/// Trigger input naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsSection {
    /// Input names in bit order; missing trailing names fall back to defaults
    pub names: Vec<String>,
    pub reference_input: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub orbit_length_ms: f64,
    pub orbits_per_time_frame: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// JSON-lines snapshot file
    pub output: PathBuf,
    /// Time frames per monitoring cycle when replaying a capture
    pub cycle_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inputs: InputsSection {
                names: Vec::new(),
                reference_input: "MTVX".to_string(),
            },
            timing: TimingConfig {
                orbit_length_ms: ORBIT_LENGTH_MS,
                orbits_per_time_frame: 128,
            },
            publishing: PublishingConfig {
                output: PathBuf::from("./ratemon_snapshots.jsonl"),
                cycle_size: 10,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional `config.toml` in the working
    /// directory and `RATEMON_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `RATEMON_TIMING__ORBITS_PER_TIME_FRAME=32`. `RATEMON_INPUTS__NAMES`
    /// takes a comma-separated list.
    pub fn load() -> AppResult<Self> {
        Self::load_from(None)
    }

    /// As [`AppConfig::load`], reading `path` (which must exist) instead of
    /// `config.toml`
    pub fn load_from(path: Option<&Path>) -> AppResult<Self> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let config = Config::builder()
            .set_default("inputs.names", Vec::<String>::new())?
            .set_default("inputs.reference_input", defaults.inputs.reference_input)?
            .set_default("timing.orbit_length_ms", defaults.timing.orbit_length_ms)?
            .set_default(
                "timing.orbits_per_time_frame",
                defaults.timing.orbits_per_time_frame as i64,
            )?
            .set_default(
                "publishing.output",
                defaults.publishing.output.to_string_lossy().into_owned(),
            )?
            .set_default(
                "publishing.cycle_size",
                defaults.publishing.cycle_size as i64,
            )?
            .add_source(file)
            .add_source(
                Environment::with_prefix("RATEMON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("inputs.names"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.timing.orbit_length_ms.is_finite() || self.timing.orbit_length_ms <= 0.0 {
            return Err(AppError::Config(format!(
                "timing.orbit_length_ms must be positive, got {}",
                self.timing.orbit_length_ms
            )));
        }
        if self.timing.orbits_per_time_frame == 0 {
            return Err(AppError::Config(
                "timing.orbits_per_time_frame must be greater than 0".to_string(),
            ));
        }
        if self.publishing.cycle_size == 0 {
            return Err(AppError::Config(
                "publishing.cycle_size must be greater than 0".to_string(),
            ));
        }
        if self.inputs.reference_input.trim().is_empty() {
            return Err(AppError::Config(
                "inputs.reference_input must not be empty".to_string(),
            ));
        }
        self.input_table().map(|_| ())
    }

    /// Named input table built from `inputs.names`
    pub fn input_table(&self) -> AppResult<InputsConfiguration> {
        if self.inputs.names.is_empty() {
            Ok(InputsConfiguration::default())
        } else {
            InputsConfiguration::from_names(&self.inputs.names)
        }
    }

    pub fn task_settings(&self) -> TaskSettings {
        TaskSettings {
            reference_input: self.inputs.reference_input.trim().to_string(),
            orbit_length_ms: self.timing.orbit_length_ms,
            filter: Vec::new(),
        }
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::InvalidData(format!("TOML error: {}", e)))
    }
}
