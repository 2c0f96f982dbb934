//! Difficulty presets shipped with the crate.

use bot_core::BotConfig;

use crate::loaders::{BotConfigLoader, LoadResult};

const NORMAL: &str = include_str!("../data/normal.toml");
const RUSH: &str = include_str!("../data/rush.toml");

/// Balanced economy-first opponent.
pub fn normal() -> LoadResult<BotConfig> {
    BotConfigLoader::from_toml_str(NORMAL)
}

/// Opponent that attacks early and often with small squads.
pub fn rush() -> LoadResult<BotConfig> {
    BotConfigLoader::from_toml_str(RUSH)
}

/// Looks a preset up by name, case-insensitively.
pub fn by_name(name: &str) -> LoadResult<BotConfig> {
    match name.to_ascii_lowercase().as_str() {
        "normal" => normal(),
        "rush" => rush(),
        other => Err(anyhow::anyhow!("Unknown bot preset: {}", other)),
    }
}
