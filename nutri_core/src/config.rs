//! Configuration file support for nutri.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nutri/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub energy: EnergyConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Energy constants used by the calculators
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// kcal of surplus/deficit per kg of body mass change
    #[serde(default = "default_energy_per_kg")]
    pub energy_per_kg: f64,

    /// kcal per kg body weight for the pocket formula
    #[serde(default = "default_pocket_kcal_per_kg")]
    pub pocket_kcal_per_kg: f64,

    #[serde(default = "default_activity_factor")]
    pub default_activity_factor: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            energy_per_kg: default_energy_per_kg(),
            pocket_kcal_per_kg: default_pocket_kcal_per_kg(),
            default_activity_factor: default_activity_factor(),
        }
    }
}

/// Food catalog source
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// CSV food table; the built-in reference catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("nutri")
}

fn default_energy_per_kg() -> f64 {
    crate::projection::DEFAULT_ENERGY_PER_KG
}

fn default_pocket_kcal_per_kg() -> f64 {
    crate::energy::DEFAULT_POCKET_KCAL_PER_KG
}

fn default_activity_factor() -> f64 {
    1.2
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject constants that would make the calculators divide by zero
    pub fn validate(&self) -> Result<()> {
        if !(self.energy.energy_per_kg.is_finite() && self.energy.energy_per_kg > 0.0) {
            return Err(Error::Config(format!(
                "energy_per_kg must be positive, got {}",
                self.energy.energy_per_kg
            )));
        }
        if self.energy.pocket_kcal_per_kg < 0.0 {
            return Err(Error::Config(format!(
                "pocket_kcal_per_kg must not be negative, got {}",
                self.energy.pocket_kcal_per_kg
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("nutri").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
