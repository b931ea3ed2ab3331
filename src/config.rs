use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::item::ItemRegistry;

pub const DEFAULT_CONFIG_PATH: &str = "config/loadout.toml";

/// Player loadout settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadoutConfig {
    /// Number of inventory slots (at least 1).
    pub inventory_capacity: usize,
    /// JSON item catalog; the built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// `tracing` filter used by the binary when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for LoadoutConfig {
    fn default() -> Self {
        Self {
            inventory_capacity: 12,
            catalog_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl LoadoutConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|err| {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                Self::default()
            }),
            Err(err) => {
                warn!("Could not read {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse configuration from TOML text, normalizing out-of-range values.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: LoadoutConfig = toml::from_str(contents)?;
        if config.inventory_capacity == 0 {
            warn!("inventory_capacity must be at least 1");
            config.inventory_capacity = 1;
        }
        Ok(config)
    }

    /// Builds the item catalog this configuration points at
    ///
    /// A missing or invalid catalog file falls back to the built-in items.
    pub fn catalog(&self) -> ItemRegistry {
        let Some(path) = &self.catalog_path else {
            return ItemRegistry::create_default();
        };
        ItemRegistry::load_from_path(path).unwrap_or_else(|err| {
            warn!("Failed to load catalog {}: {err}. Using built-in items", path.display());
            ItemRegistry::create_default()
        })
    }
}
