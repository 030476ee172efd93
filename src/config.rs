//! Host configuration for the terminal front end.
//!
//! Only the host side is configurable here: frame period, how long a key
//! without a release event counts as held (before and after autorepeat
//! starts), and the virtual axes synthesized from key pairs. Binding profiles
//! themselves are built in code.
//!
//! File loading requires the `config` feature (`serde` + `toml` + `dirs`).

use crate::error::{BindError, Result};
use crate::poll::PhysicalControl;
use std::collections::HashSet;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::Deserialize;
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Default frame period (~60 Hz)
pub const DEFAULT_TICK_MS: u64 = 16;
/// Terminals rarely report key releases; a key with no press/repeat for this
/// long is treated as released.
pub const DEFAULT_HOLD_TIMEOUT_MS: u64 = 120;
/// Window after a fresh press in which the first autorepeat must arrive.
/// Common keyboard repeat delays run from 250 to 660 ms.
pub const DEFAULT_REPEAT_DELAY_MS: u64 = 700;
/// Units per second a virtual axis moves toward its target.
pub const DEFAULT_SENSITIVITY: f32 = 3.0;
/// Units per second a virtual axis falls back to rest.
pub const DEFAULT_GRAVITY: f32 = 3.0;

/// Top-level host settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct Config {
    pub tick_ms: u64,
    pub hold_timeout_ms: u64,
    pub repeat_delay_ms: u64,
    pub axes: Vec<AxisConfig>,
}

/// A virtual analog axis driven by two keys.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(deny_unknown_fields))]
pub struct AxisConfig {
    pub name: String,
    pub positive: String,
    pub negative: String,
    #[cfg_attr(feature = "config", serde(default = "default_sensitivity"))]
    pub sensitivity: f32,
    #[cfg_attr(feature = "config", serde(default = "default_gravity"))]
    pub gravity: f32,
    /// Jump to zero when the direction reverses instead of sliding through it
    #[cfg_attr(feature = "config", serde(default = "default_snap"))]
    pub snap: bool,
}

#[cfg(feature = "config")]
fn default_sensitivity() -> f32 {
    DEFAULT_SENSITIVITY
}

#[cfg(feature = "config")]
fn default_gravity() -> f32 {
    DEFAULT_GRAVITY
}

#[cfg(feature = "config")]
fn default_snap() -> bool {
    true
}

impl AxisConfig {
    pub fn new(name: impl Into<String>, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positive: positive.into(),
            negative: negative.into(),
            sensitivity: DEFAULT_SENSITIVITY,
            gravity: DEFAULT_GRAVITY,
            snap: true,
        }
    }

    /// Parse both key names.
    pub fn controls(&self) -> Result<(PhysicalControl, PhysicalControl)> {
        Ok((self.positive.parse()?, self.negative.parse()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            hold_timeout_ms: DEFAULT_HOLD_TIMEOUT_MS,
            repeat_delay_ms: DEFAULT_REPEAT_DELAY_MS,
            axes: vec![
                AxisConfig::new("Horizontal", "Right", "Left"),
                AxisConfig::new("Vertical", "Up", "Down"),
                AxisConfig::new("VimHorizontal", "l", "h"),
                AxisConfig::new("VimVertical", "k", "j"),
            ],
        }
    }
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }

    pub fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_delay_ms)
    }

    /// Check ranges, key names and axis name uniqueness.
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(BindError::invalid_argument("tick_ms must be greater than zero"));
        }
        if self.repeat_delay_ms < self.hold_timeout_ms {
            return Err(BindError::invalid_argument(
                "repeat_delay_ms must not be shorter than hold_timeout_ms",
            ));
        }
        let mut names = HashSet::new();
        for axis in &self.axes {
            if axis.name.is_empty() {
                return Err(BindError::invalid_argument("axis name must not be empty"));
            }
            if !names.insert(axis.name.as_str()) {
                return Err(BindError::invalid_argument(format!(
                    "axis '{}' is defined more than once",
                    axis.name
                )));
            }
            if axis.sensitivity <= 0.0 || axis.gravity <= 0.0 {
                return Err(BindError::invalid_argument(format!(
                    "axis '{}' needs positive sensitivity and gravity",
                    axis.name
                )));
            }
            axis.controls()?;
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl Config {
    /// Location of the user config file, `<config_dir>/rebind/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rebind").join("config.toml"))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(source: &str, origin: &Path) -> Result<Self> {
        let config: Config =
            toml::from_str(source).map_err(|err| BindError::config(origin, err.to_string()))?;
        config
            .validate()
            .map_err(|err| BindError::config(origin, err.to_string()))?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|err| BindError::config(path, err.to_string()))?;
        let config = Self::from_toml(&source, path)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the user config file, falling back to defaults when it does not exist.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyCode;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick(), Duration::from_millis(16));
        assert_eq!(config.axes.len(), 4);
        assert_eq!(
            config.axes[0].controls().unwrap(),
            (
                PhysicalControl::Key(KeyCode::Right),
                PhysicalControl::Key(KeyCode::Left)
            )
        );
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.axes.push(AxisConfig::new("Horizontal", "d", "a"));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.axes[0].positive = "Hyper".to_string();
        assert!(matches!(
            config.validate(),
            Err(BindError::UnknownKey { .. })
        ));

        let mut config = Config::default();
        config.axes[1].gravity = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.repeat_delay_ms = 50;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_toml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
tick_ms = 33

[[axes]]
name = "Strafe"
positive = "d"
negative = "a"
gravity = 6.0
"#
        )
        .expect("write config");

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.tick_ms, 33);
        assert_eq!(config.hold_timeout_ms, DEFAULT_HOLD_TIMEOUT_MS);
        assert_eq!(config.repeat_delay(), Duration::from_millis(DEFAULT_REPEAT_DELAY_MS));
        assert_eq!(config.axes.len(), 1);
        let strafe = &config.axes[0];
        assert_eq!(strafe.name, "Strafe");
        assert_eq!(strafe.sensitivity, DEFAULT_SENSITIVITY);
        assert_eq!(strafe.gravity, 6.0);
        assert!(strafe.snap);
    }

    #[cfg(feature = "config")]
    #[test]
    fn load_reports_path_on_error() {
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        std::fs::write(file.path(), "tick_ms = \"fast\"").expect("write config");

        match Config::load(file.path()) {
            Err(BindError::ConfigError { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected ConfigError, got {other:?}"),
        }

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Config::load(&missing),
            Err(BindError::ConfigError { .. })
        ));
    }
}
