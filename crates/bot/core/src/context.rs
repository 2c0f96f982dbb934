//! Per-tick bundle handed to every sub-policy.
//!
//! The controller owns all mutable bot state. Each tick it lends the pieces a policy
//! may touch (RNG, order queue) together with the read-only surfaces as one
//! [`BotContext`], so no policy keeps a reference to the world past the tick.

use crate::config::BotConfig;
use crate::debug::BotDebug;
use crate::fuzzy::AttackOrFlee;
use crate::geometry::{CPos, WDist};
use crate::order::{Order, OrderQueue};
use crate::rng::BotRng;
use crate::world::{ActorCaps, ActorSnapshot, PlayerId, Stance, WorldQuery};

/// Reference points of the bot's base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BaseCenters {
    /// Where the construction vehicle stood on the first tick.
    pub initial: CPos,
    /// Anchor for defensive structures; follows the latest attacker.
    pub defense: CPos,
}

pub struct BotContext<'a> {
    pub world: &'a dyn WorldQuery,
    pub player: PlayerId,
    pub config: &'a BotConfig,
    pub rng: &'a mut BotRng,
    pub orders: &'a mut OrderQueue,
    pub debug: BotDebug,
    pub base: BaseCenters,
    /// General engagement policy consulted by squads.
    pub attack_or_flee: &'a AttackOrFlee,
    /// Ticks since activation.
    pub tick: u64,
}

impl BotContext<'_> {
    pub fn queue(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn owns(&self, actor: &ActorSnapshot) -> bool {
        actor.owner == self.player
    }

    pub fn stance_toward(&self, actor: &ActorSnapshot) -> Stance {
        self.world.stance(self.player, actor.owner)
    }

    /// Live enemy actor.
    pub fn is_enemy(&self, actor: &ActorSnapshot) -> bool {
        actor.owner != self.player
            && (actor.max_hp == 0 || actor.hp > 0)
            && self.stance_toward(actor) == Stance::Enemy
    }

    pub fn own_actors(&self) -> Vec<ActorSnapshot> {
        self.world
            .actors()
            .into_iter()
            .filter(|a| self.owns(a))
            .collect()
    }

    pub fn own_buildings(&self) -> Vec<ActorSnapshot> {
        self.world
            .actors()
            .into_iter()
            .filter(|a| self.owns(a) && a.has(ActorCaps::BUILDING))
            .collect()
    }

    /// Own actors whose type is one of `names`.
    pub fn count_owned(&self, names: &[String]) -> usize {
        self.world
            .actors()
            .iter()
            .filter(|a| self.owns(a) && names.contains(&a.kind))
            .count()
    }

    /// Live enemy that can be targeted.
    pub fn is_hostile_target(&self, actor: &ActorSnapshot) -> bool {
        actor.has(ActorCaps::TARGETABLE) && self.is_enemy(actor)
    }

    pub fn closest_enemy(&self, cell: CPos) -> Option<ActorSnapshot> {
        let enemies = self
            .world
            .actors()
            .into_iter()
            .filter(|a| self.is_hostile_target(a));
        closest_to(enemies, cell)
    }

    pub fn closest_enemy_within(&self, cell: CPos, radius: WDist) -> Option<ActorSnapshot> {
        let enemies = self
            .world
            .actors_in_circle(cell, radius)
            .into_iter()
            .filter(|a| self.is_hostile_target(a));
        closest_to(enemies, cell)
    }

    pub fn enemies_within(&self, cell: CPos, radius: WDist) -> Vec<ActorSnapshot> {
        self.world
            .actors_in_circle(cell, radius)
            .into_iter()
            .filter(|a| self.is_enemy(a))
            .collect()
    }

    /// A random deployed construction yard, falling back to the initial base center.
    pub fn random_base_center(&mut self) -> CPos {
        let yards: Vec<CPos> = self
            .world
            .actors()
            .iter()
            .filter(|a| self.owns(a) && a.is_base_center())
            .map(|a| a.cell)
            .collect();
        self.rng.pick(&yards).copied().unwrap_or(self.base.initial)
    }

    /// Cell of a random own building, falling back to the initial base center.
    pub fn random_own_building_cell(&mut self) -> CPos {
        let cells: Vec<CPos> = self.own_buildings().iter().map(|b| b.cell).collect();
        self.rng.pick(&cells).copied().unwrap_or(self.base.initial)
    }
}

/// Nearest actor to `cell`; ties go to the lowest id.
pub fn closest_to(
    actors: impl IntoIterator<Item = ActorSnapshot>,
    cell: CPos,
) -> Option<ActorSnapshot> {
    actors
        .into_iter()
        .min_by_key(|a| (a.cell.distance_sq(cell), a.id))
}
