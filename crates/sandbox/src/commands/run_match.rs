//! Play two bots against each other.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use bot_core::{BotController, PlayerId, WorldQuery};
use bot_sandbox::{PowerState, Ruleset, Scenario, Skirmish};
use clap::Parser;

use super::resolve_config;

/// Play two bots against each other on the two-player map
#[derive(Parser)]
pub struct RunMatch {
    /// Configuration of the first player: preset name or file path
    #[arg(long, default_value = "normal")]
    first: String,

    /// Configuration of the second player: preset name or file path
    #[arg(long, default_value = "rush")]
    second: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3000)]
    ticks: u64,

    /// Seed for the first bot; the second uses `seed + 1`
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Ticks between progress reports
    #[arg(long, default_value_t = 500)]
    report_every: u64,
}

impl RunMatch {
    pub fn execute(self) -> Result<()> {
        let scenario = Scenario::two_player();
        let mut world = scenario
            .create_world(Ruleset::standard())
            .context("Failed to create sandbox world")?;

        let mut skirmish_bots = Vec::new();
        for (i, (&player, spec)) in scenario
            .players
            .iter()
            .zip([&self.first, &self.second])
            .enumerate()
        {
            let config = resolve_config(spec)
                .with_context(|| format!("Failed to load config for player {}", player.0))?;
            for decision in &config.support_powers {
                world.add_support_power(
                    player,
                    PowerState {
                        key: format!("{}-{}", decision.order_name, player.0),
                        order_name: decision.order_name.clone(),
                        charge_time: 1500,
                        remaining: 1500,
                        disabled: false,
                        radius: 3,
                        damage: 300,
                    },
                );
            }
            let bot = BotController::activate(config, player, self.seed + i as u64)
                .with_context(|| format!("Failed to activate bot for player {}", player.0))?;
            skirmish_bots.push(bot);
        }

        let mut skirmish = Skirmish::new(world);
        for bot in skirmish_bots {
            skirmish.add_bot(bot);
        }

        for tick in 1..=self.ticks {
            skirmish.step();
            if tick % self.report_every.max(1) == 0 || tick == self.ticks {
                report(&skirmish, tick);
            }
            if skirmish.world().live_players().len() < 2 {
                println!("\nMatch decided at tick {tick}");
                report(&skirmish, tick);
                break;
            }
        }
        Ok(())
    }
}

fn report(skirmish: &Skirmish, tick: u64) {
    println!("── tick {tick} ──");
    for bot in skirmish.bots() {
        let player: PlayerId = bot.player();
        let world = skirmish.world();

        let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
        for actor in world.owned_by(player) {
            *kinds.entry(actor.kind.as_str()).or_default() += 1;
        }
        let economy = world.economy(player);
        let rejected = skirmish
            .rejected()
            .filter(|o| o.player == player)
            .count();

        println!(
            "  player {} ({}): cash {} + {} stored, power {}/{}, squads {}, rejected orders {}",
            player.0,
            bot.config().name,
            economy.cash,
            economy.resources,
            economy.power_drained,
            economy.power_provided,
            bot.squads().squads().len(),
            rejected,
        );
        let summary: Vec<String> = kinds.iter().map(|(k, n)| format!("{k}×{n}")).collect();
        println!("    {}", summary.join(" "));
    }
}
