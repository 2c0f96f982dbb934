//! Bot configuration loader.

use std::path::Path;

use bot_core::BotConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for bot difficulty settings.
///
/// Every entry point validates the parsed configuration, so a returned
/// [`BotConfig`] is always accepted by [`BotController::activate`](bot_core::BotController::activate).
pub struct BotConfigLoader;

impl BotConfigLoader {
    /// Load a configuration from a TOML file.
    ///
    /// Fields missing from the file keep their [`BotConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<BotConfig> {
        let content = read_file(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load bot config {}: {}", path.display(), e))
    }

    /// Load a configuration from a RON file.
    pub fn load_ron(path: &Path) -> LoadResult<BotConfig> {
        let content = read_file(path)?;
        let config: BotConfig = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse bot config RON: {}", e))?;
        Self::checked(config)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> LoadResult<BotConfig> {
        let config: BotConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse bot config TOML: {}", e))?;
        Self::checked(config)
    }

    fn checked(config: BotConfig) -> LoadResult<BotConfig> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid bot config `{}`: {}", config.name, e))?;
        tracing::debug!(config = %config.name, "loaded bot config");
        Ok(config)
    }
}
