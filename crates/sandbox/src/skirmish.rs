//! Bots playing against each other in a [`SandboxWorld`].

use bot_core::{BotController, Command, Order, PlayerId};

use crate::error::SandboxError;
use crate::world::SandboxWorld;

/// An order a bot issued and what the sandbox made of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedOrder {
    pub tick: u64,
    pub player: PlayerId,
    pub order: Order,
    pub outcome: Result<(), SandboxError>,
}

/// Runs the host loop: every bot ticks, its orders are applied, then the world
/// advances and damage is reported back to the victims' bots.
pub struct Skirmish {
    world: SandboxWorld,
    bots: Vec<BotController>,
    log: Vec<IssuedOrder>,
}

impl Skirmish {
    pub fn new(world: SandboxWorld) -> Self {
        Self {
            world,
            bots: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn add_bot(&mut self, bot: BotController) {
        self.bots.push(bot);
    }

    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SandboxWorld {
        &mut self.world
    }

    pub fn bots(&self) -> &[BotController] {
        &self.bots
    }

    pub fn bot(&self, player: PlayerId) -> Option<&BotController> {
        self.bots.iter().find(|b| b.player() == player)
    }

    /// Every order issued so far, oldest first.
    pub fn log(&self) -> &[IssuedOrder] {
        &self.log
    }

    /// Orders of `player` with `command`.
    pub fn orders_of(
        &self,
        player: PlayerId,
        command: Command,
    ) -> impl Iterator<Item = &IssuedOrder> {
        self.log
            .iter()
            .filter(move |o| o.player == player && o.order.command == command)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &IssuedOrder> {
        self.log.iter().filter(|o| o.outcome.is_err())
    }

    pub fn step(&mut self) {
        let tick = self.world.tick() + 1;

        for bot in &mut self.bots {
            let mut orders = Vec::new();
            bot.tick(&self.world, &self.world, &mut orders);

            for order in orders {
                let outcome = self.world.apply(bot.player(), &order);
                if let Err(err) = &outcome {
                    tracing::debug!(
                        target: "sandbox",
                        player = bot.player().0,
                        order = order.name(),
                        %err,
                        "order rejected"
                    );
                }
                self.log.push(IssuedOrder {
                    tick,
                    player: bot.player(),
                    order,
                    outcome,
                });
            }
        }

        for hit in self.world.advance() {
            if let Some(bot) = self.bots.iter_mut().find(|b| b.player() == hit.owner) {
                bot.on_damaged(&self.world, hit.event);
            }
        }
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }
}
