//! Bot difficulty definitions and loaders.
//!
//! Tunables live in TOML (or RON) files and are turned into a validated
//! [`BotConfig`](bot_core::BotConfig) here, so the decision core never parses anything:
//! - shipped presets under `data/` (see [`presets`])
//! - user-supplied files through [`BotConfigLoader`]

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub mod presets;

#[cfg(feature = "loaders")]
pub use loaders::{BotConfigLoader, LoadResult};
