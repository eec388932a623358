//! Configuration for the constellation terminal app.
//!
//! Settings live in `config.toml` inside the platform config directory.
//! Every key is optional; a missing file means defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use constellation_core::{FieldParams, ThemePreference, Viewport};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "CONSTELLATION_CONFIG";

const CONFIG_FILE: &str = "config.toml";

/// Accepted range for `cell_width_px` and `cell_height_px`.
const CELL_SIZE_PX: std::ops::RangeInclusive<u32> = 1..=256;

/// Errors raised while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "failed to read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => write!(f, "failed to parse {}: {e}", path.display()),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Light/dark preference.
    pub theme: ThemePreference,
    /// Animation frames per second.
    pub fps: u32,
    /// Virtual pixels per terminal column.
    pub cell_width_px: u32,
    /// Virtual pixels per terminal row.
    pub cell_height_px: u32,
    /// Headline drawn over the background.
    pub title: String,
    /// Second line under the title.
    pub tagline: String,
    /// Constellation tuning.
    pub field: FieldParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Auto,
            fps: 30,
            cell_width_px: 8,
            cell_height_px: 16,
            title: "constellation".to_string(),
            tagline: String::new(),
            field: FieldParams::default(),
        }
    }
}

impl Config {
    /// Load from `CONSTELLATION_CONFIG` or the platform config directory.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => match default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse(_, e) => ConfigError::Parse(path.to_path_buf(), e),
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=240).contains(&self.fps) {
            return Err(ConfigError::Invalid(format!(
                "fps must be between 1 and 240, got {}",
                self.fps
            )));
        }
        if !CELL_SIZE_PX.contains(&self.cell_width_px)
            || !CELL_SIZE_PX.contains(&self.cell_height_px)
        {
            return Err(ConfigError::Invalid(format!(
                "cell_width_px and cell_height_px must be between {} and {}",
                CELL_SIZE_PX.start(),
                CELL_SIZE_PX.end()
            )));
        }

        let field = &self.field;
        if field.area_per_point == 0 {
            return Err(ConfigError::Invalid(
                "field.area_per_point must be positive".to_string(),
            ));
        }
        for (key, value) in [
            ("max_speed", field.max_speed),
            ("min_radius", field.min_radius),
            ("max_radius", field.max_radius),
            ("link_distance", field.link_distance),
            ("link_opacity", field.link_opacity),
            ("link_falloff", field.link_falloff),
            ("light_link_boost", field.light_link_boost),
            ("dark_point_opacity", field.dark_point_opacity),
            ("light_point_opacity", field.light_point_opacity),
            ("line_width", field.line_width),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "field.{key} must be a finite number, got {value}"
                )));
            }
        }
        if field.max_speed < 0.0 {
            return Err(ConfigError::Invalid(
                "field.max_speed must not be negative".to_string(),
            ));
        }
        if field.min_radius < 0.0 || field.min_radius > field.max_radius {
            return Err(ConfigError::Invalid(
                "field.min_radius must be between 0 and field.max_radius".to_string(),
            ));
        }
        if field.link_falloff <= 0.0 {
            return Err(ConfigError::Invalid(
                "field.link_falloff must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Virtual-pixel viewport for a terminal of `columns` by `rows` cells.
    pub fn viewport(&self, columns: u16, rows: u16) -> Viewport {
        Viewport::new(
            (columns as u32).saturating_mul(self.cell_width_px),
            (rows as u32).saturating_mul(self.cell_height_px),
        )
    }
}

/// Default config file location.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "constellation").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
