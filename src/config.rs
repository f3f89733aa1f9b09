use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::form::{AdvancePolicy, FormSettings};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Behaviour of the form engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Full duration of an animated expand or collapse (default: 300)
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    /// Collapsed height used when neither the host nor the step provide one
    #[serde(default = "default_element_height")]
    pub default_element_height: f32,
    #[serde(default = "default_cta_height")]
    pub default_cta_height: f32,
    /// Drop taps while a step is expanding or collapsing
    #[serde(default = "default_true")]
    pub ignore_input_while_animating: bool,
    /// Which halves of an advance are animated
    #[serde(default)]
    pub advance: AdvancePolicy,
}

fn default_animation_ms() -> u64 {
    300
}

fn default_element_height() -> f32 {
    50.0
}

fn default_cta_height() -> f32 {
    50.0
}

fn default_true() -> bool {
    true
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            animation_ms: default_animation_ms(),
            default_element_height: default_element_height(),
            default_cta_height: default_cta_height(),
            ignore_input_while_animating: default_true(),
            advance: AdvancePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
    /// Form units drawn per terminal row (default: 25, so the overlap is two rows)
    #[serde(default = "default_units_per_row")]
    pub units_per_row: f32,
}

fn default_refresh_rate_ms() -> u64 {
    50
}

fn default_units_per_row() -> f32 {
    25.0
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate_ms(),
            units_per_row: default_units_per_row(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Number of steps in the demo form
    #[serde(default = "default_demo_steps")]
    pub steps: usize,
}

fn default_demo_steps() -> usize {
    4
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            steps: default_demo_steps(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_true")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".stacked-form".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

impl Config {
    /// Path to the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".stacked-form/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::project_config_path(), config_path)
    }

    /// Load with an explicit project config location.
    pub fn load_from(project_config: &Path, config_path: Option<&str>) -> Result<Self> {
        // Embedded defaults so the demo runs without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config.to_path_buf()));
        }

        // User config in ~/.config/stacked-form/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("stacked-form").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // STACKED_FORM__FORM__ANIMATION_MS=500 and friends
        builder = builder.add_source(
            config::Environment::with_prefix("STACKED_FORM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .stacked-form/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::project_config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(config_path, self.to_toml()?).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Engine settings from the `form` section
    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            animation: Duration::from_millis(self.form.animation_ms),
            default_element_height: self.form.default_element_height,
            default_cta_height: self.form.default_cta_height,
            ignore_input_while_animating: self.form.ignore_input_while_animating,
            advance: self.form.advance,
        }
    }

    pub fn refresh_rate(&self) -> Duration {
        Duration::from_millis(self.ui.refresh_rate_ms)
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}
