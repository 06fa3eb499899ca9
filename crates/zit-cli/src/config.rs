//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use zit_core::{ExcludeSet, LUNCH, STOP};
use zit_store::Store;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the CSV logs.
    pub data_dir: PathBuf,
    /// Projects whose time is reported as excluded rather than worked.
    pub exclude_projects: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().unwrap_or_else(|| PathBuf::from(".zit")),
            exclude_projects: vec![STOP.to_string(), LUNCH.to_string()],
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ZIT_DATA_DIR, ZIT_EXCLUDE_PROJECTS
        figment = figment.merge(Env::prefixed("ZIT_"));

        figment.extract()
    }

    pub fn exclude_set(&self) -> ExcludeSet {
        ExcludeSet::new(self.exclude_projects.iter().cloned())
    }

    pub fn store(&self) -> Store {
        Store::new(&self.data_dir)
    }
}

/// Returns the platform-specific config directory for zit.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("zit"))
}

/// Returns the default data directory, `~/.zit`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".zit"))
}
