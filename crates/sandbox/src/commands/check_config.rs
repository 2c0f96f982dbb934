//! Validate a bot configuration without running it.

use anyhow::Result;
use clap::Parser;

use super::resolve_config;

/// Load and validate a bot configuration
#[derive(Parser)]
pub struct CheckConfig {
    /// Preset name (`normal`, `rush`) or path to a TOML/RON file
    #[arg(value_name = "CONFIG")]
    config: String,
}

impl CheckConfig {
    pub fn execute(self) -> Result<()> {
        let config = resolve_config(&self.config)?;

        println!("✓ {} is valid", config.name);
        println!("  squad size:        {}", config.squad_size);
        println!("  rush interval:     {} ticks", config.rush_interval);
        println!("  building queues:   {}", config.building_queues.join(", "));
        println!("  unit queues:       {}", config.unit_queues.join(", "));
        println!("  units to build:    {}", config.units_to_build.len());
        println!("  support powers:    {}", config.support_powers.len());
        Ok(())
    }
}
