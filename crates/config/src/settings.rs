// Report settings
// Loaded from ~/.config/salesgrid/config.toml or an explicit --config file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use salesgrid_engine::{AgeWindow, SalesError};

pub const DEFAULT_DATABASE: &str = "data/sales.db";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_OUTPUT_NAME: &str = "sales_analysis.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file holding Customer, Sales, Orders and Items
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_DATABASE) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory receiving both CSV files (created if missing)
    pub dir: PathBuf,
    /// Base file name; each path prefixes its own tag
    pub name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub output: OutputSettings,
    pub filter: AgeWindow,
}

/// Values supplied on the command line or through the environment.
/// `None` leaves the loaded setting untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_name: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
}

impl Settings {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("salesgrid").join("config.toml"))
    }

    pub fn from_toml(s: &str) -> Result<Self, SalesError> {
        let settings: Settings = toml::from_str(s).map_err(|e| SalesError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_file(path: &Path) -> Result<Self, SalesError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SalesError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&contents).map_err(|e| match e {
            SalesError::Config(msg) => SalesError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Resolve settings: an explicit file must exist; otherwise the user
    /// config file is used when present, else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SalesError> {
        if let Some(path) = explicit {
            log::debug!("loading config from {}", path.display());
            return Self::load_file(path);
        }
        match Self::config_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::load_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply overrides, then re-validate.
    pub fn apply(mut self, overrides: &Overrides) -> Result<Self, SalesError> {
        if let Some(ref path) = overrides.database {
            self.database.path = path.clone();
        }
        if let Some(ref dir) = overrides.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(ref name) = overrides.output_name {
            self.output.name = name.clone();
        }
        if let Some(min) = overrides.min_age {
            self.filter.min_age = min;
        }
        if let Some(max) = overrides.max_age {
            self.filter.max_age = max;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SalesError> {
        if self.filter.is_empty() {
            return Err(SalesError::Config(format!(
                "min_age ({}) is greater than max_age ({})",
                self.filter.min_age, self.filter.max_age
            )));
        }
        let name = self.output.name.as_str();
        if name.trim().is_empty() {
            return Err(SalesError::Config("output name is empty".into()));
        }
        if name.trim() != name {
            return Err(SalesError::Config(format!(
                "output name has leading or trailing whitespace: {name:?}"
            )));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(SalesError::Config(format!(
                "output name must be a file name, not a path: {name}"
            )));
        }
        Ok(())
    }
}
