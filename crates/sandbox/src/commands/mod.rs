mod check_config;
mod run_match;

pub use check_config::CheckConfig;
pub use run_match::RunMatch;

use std::path::Path;

use anyhow::Result;
use bot_content::{BotConfigLoader, presets};
use bot_core::BotConfig;

/// Resolves a preset name or a path to a `.toml`/`.ron` file.
fn resolve_config(spec: &str) -> Result<BotConfig> {
    let path = Path::new(spec);
    if !path.exists() {
        return presets::by_name(spec);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => BotConfigLoader::load_ron(path),
        _ => BotConfigLoader::load(path),
    }
}
