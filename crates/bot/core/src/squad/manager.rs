//! Owner of every squad and of the bookkeeping that feeds them.

use std::collections::{BTreeMap, BTreeSet};

use super::{Squad, SquadId, SquadKind};
use crate::bot_debug;
use crate::config::BotConfig;
use crate::context::{BotContext, closest_to};
use crate::fuzzy::AttackOrFlee;
use crate::geometry::WDist;
use crate::order::{Command, Order};
use crate::rng::BotRng;
use crate::timer::IntervalTimer;
use crate::world::{ActorCaps, ActorId, ActorSnapshot, PlayerId, Stance};

/// Squad list, known units and per-enemy aggression.
///
/// Units are "known" once they have been given a role; only unknown units are
/// considered by [`SquadManager::find_new_units`]. Idle armed units that joined no
/// squad yet hang around the base until enough of them form an assault squad.
#[derive(Clone, Debug)]
pub struct SquadManager {
    squads: Vec<Squad>,
    next_id: u32,
    active_units: BTreeSet<ActorId>,
    hanging_around_base: Vec<ActorId>,
    /// Harvesters already sent back to work since they last went idle.
    dispatched_harvesters: BTreeSet<ActorId>,
    aggro: BTreeMap<PlayerId, i32>,

    rush: IntervalTimer,
    attack_force: IntervalTimer,
    assign_roles: IntervalTimer,
    minimum_attack_force: IntervalTimer,
}

impl SquadManager {
    /// Creates the manager with staggered first countdowns.
    pub fn new(config: &BotConfig, rng: &mut BotRng) -> Self {
        let rush = config.rush_interval as i64;
        let rush_countdown = rng.range(rush - rush / 20, rush + rush / 20);
        let staggered = |period: u32, rng: &mut BotRng| {
            IntervalTimer::with_countdown(period, rng.range(0, period as i64))
        };

        Self {
            squads: Vec::new(),
            next_id: 0,
            active_units: BTreeSet::new(),
            hanging_around_base: Vec::new(),
            dispatched_harvesters: BTreeSet::new(),
            aggro: BTreeMap::new(),
            rush: IntervalTimer::with_countdown(config.rush_interval, rush_countdown),
            attack_force: staggered(config.attack_force_interval, rng),
            assign_roles: staggered(config.assign_roles_interval, rng),
            minimum_attack_force: staggered(config.minimum_attack_force_delay, rng),
        }
    }

    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    pub fn squad_of_kind(&self, kind: SquadKind) -> Option<&Squad> {
        self.squads.iter().find(|s| s.kind() == kind)
    }

    pub fn hanging_around_base(&self) -> &[ActorId] {
        &self.hanging_around_base
    }

    pub fn is_known(&self, actor: ActorId) -> bool {
        self.active_units.contains(&actor)
    }

    pub fn aggro(&self, player: PlayerId) -> i32 {
        self.aggro.get(&player).copied().unwrap_or(0)
    }

    pub fn add_aggro(&mut self, player: PlayerId, damage: i32) {
        *self.aggro.entry(player).or_insert(0) += damage;
    }

    /// Adds a squad and returns its index in [`SquadManager::squads`].
    pub fn register(&mut self, kind: SquadKind, target: Option<ActorId>) -> usize {
        let id = SquadId(self.next_id);
        self.next_id += 1;
        self.squads.push(Squad::new(id, kind, target));
        self.squads.len() - 1
    }

    fn find_or_register(&mut self, kind: SquadKind, target: Option<ActorId>) -> usize {
        match self.squads.iter().position(|s| s.kind() == kind) {
            Some(index) => index,
            None => self.register(kind, target),
        }
    }

    /// Forgets dead or lost units and drops squads left without members.
    pub fn clean(&mut self, ctx: &BotContext<'_>) {
        let alive: BTreeSet<ActorId> = ctx
            .own_actors()
            .into_iter()
            .filter(|a| a.max_hp == 0 || a.hp > 0)
            .map(|a| a.id)
            .collect();

        self.active_units.retain(|id| alive.contains(id));
        self.hanging_around_base.retain(|id| alive.contains(id));
        self.dispatched_harvesters.retain(|id| alive.contains(id));

        for squad in &mut self.squads {
            squad.retain_members(|id| alive.contains(id));
        }
        self.squads.retain(Squad::is_valid);
    }

    /// Runs the role-assignment sweep for this tick.
    ///
    /// Returns whether the role timer fired, i.e. whether idle units were handed
    /// new roles this tick.
    pub fn assign_roles(&mut self, ctx: &mut BotContext<'_>, rush: &AttackOrFlee) -> bool {
        self.clean(ctx);

        if self.rush.tick() {
            self.try_rush(ctx, rush);
        }

        if self.attack_force.tick() {
            for squad in &mut self.squads {
                squad.update(ctx);
            }
        }

        if !self.assign_roles.tick() {
            return false;
        }

        self.dispatch_idle_harvesters(ctx);
        self.find_new_units(ctx);
        if self.minimum_attack_force.tick() {
            self.create_attack_force(ctx);
        }
        true
    }

    /// Sends idle, empty harvesters back to the fields, once per idle spell.
    pub fn dispatch_idle_harvesters(&mut self, ctx: &mut BotContext<'_>) {
        for &id in &self.active_units {
            let Some(actor) = ctx.world.actor(id) else {
                continue;
            };
            if !actor.has(ActorCaps::HARVESTER) {
                continue;
            }
            if !actor.is_idle() {
                self.dispatched_harvesters.remove(&id);
                continue;
            }
            if !actor.harvester_empty || self.dispatched_harvesters.contains(&id) {
                continue;
            }

            ctx.queue(harvest_order(ctx, id));
            self.dispatched_harvesters.insert(id);
        }
    }

    /// Gives a role to every own unit seen for the first time.
    pub fn find_new_units(&mut self, ctx: &mut BotContext<'_>) {
        let new_units: Vec<ActorSnapshot> = ctx
            .own_actors()
            .into_iter()
            .filter(|a| {
                a.has(ActorCaps::MOBILE)
                    && !a.has(ActorCaps::BASE_BUILDING)
                    && !self.active_units.contains(&a.id)
            })
            .collect();

        for unit in new_units {
            bot_debug!(ctx.debug, unit = %unit.id, kind = %unit.kind, "found a newly built unit");

            if unit.has(ActorCaps::HARVESTER) {
                ctx.queue(harvest_order(ctx, unit.id));
                self.dispatched_harvesters.insert(unit.id);
            } else {
                self.hanging_around_base.push(unit.id);
            }

            if unit.has(ActorCaps::AIRCRAFT | ActorCaps::ARMED) {
                let air = self.find_or_register(SquadKind::Air, None);
                self.squads[air].add_member(unit.id);
            }

            self.active_units.insert(unit.id);
        }
    }

    /// Turns the units around the base into an assault squad once there are enough.
    pub fn create_attack_force(&mut self, ctx: &mut BotContext<'_>) {
        let size = ctx.config.squad_size as usize
            + ctx.rng.below(ctx.config.squad_size_random_bonus as usize);
        if self.hanging_around_base.len() < size {
            return;
        }

        let target = self.choose_enemy_target(ctx);
        let index = self.register(SquadKind::Assault, target);
        for id in std::mem::take(&mut self.hanging_around_base) {
            let is_aircraft = ctx
                .world
                .actor(id)
                .is_some_and(|a| a.has(ActorCaps::AIRCRAFT));
            if !is_aircraft {
                self.squads[index].add_member(id);
            }
        }

        let squad = &self.squads[index];
        bot_debug!(
            ctx.debug,
            squad = %squad.id(),
            members = squad.members().len(),
            "assault squad formed"
        );
    }

    /// Throws idle ground units at an enemy construction yard whose defenders the
    /// rush policy says can be beaten.
    pub fn try_rush(&mut self, ctx: &mut BotContext<'_>, rush: &AttackOrFlee) {
        let yards: Vec<ActorSnapshot> = ctx
            .world
            .actors()
            .into_iter()
            .filter(|a| ctx.is_enemy(a) && a.is_base_center())
            .collect();

        let own: Vec<ActorSnapshot> = self
            .active_units
            .iter()
            .filter_map(|&id| ctx.world.actor(id))
            .filter(|a| a.has(ActorCaps::ARMED) && !a.has(ActorCaps::AIRCRAFT) && a.is_idle())
            .collect();

        if yards.is_empty() || own.len() < ctx.config.squad_size as usize {
            return;
        }

        let radius = WDist::from_cells(ctx.config.rush_attack_scan_radius);
        for yard in yards {
            let defenders: Vec<ActorSnapshot> = ctx
                .world
                .actors_in_circle(yard.cell, radius)
                .into_iter()
                .filter(|a| ctx.is_enemy(a) && a.has(ActorCaps::ARMED))
                .collect();

            if !rush.can_attack(&own, &defenders, ctx.debug) {
                continue;
            }

            let target = ctx.rng.pick(&defenders).map_or(yard.id, |a| a.id);
            let index = self.find_or_register(SquadKind::Rush, Some(target));
            for unit in &own {
                self.squads[index].add_member(unit.id);
            }

            bot_debug!(ctx.debug, yard = %yard.id, units = own.len(), "rushing enemy base");
            return;
        }
    }

    /// Picks the actor to send the next assault squad at.
    ///
    /// The enemy player with the highest aggro is chosen, ties broken at random, and
    /// its actor closest to one of our base centers becomes the target. An enemy
    /// owning nothing gets its aggro cooled instead.
    pub fn choose_enemy_target(&mut self, ctx: &mut BotContext<'_>) -> Option<ActorId> {
        let live = ctx.world.live_players();
        if !live.contains(&ctx.player) {
            return None;
        }

        let enemies: Vec<PlayerId> = live
            .into_iter()
            .filter(|&p| p != ctx.player && ctx.world.stance(ctx.player, p) == Stance::Enemy)
            .collect();
        let top = enemies.iter().map(|&p| self.aggro(p)).max()?;
        let least_liked: Vec<PlayerId> = enemies
            .into_iter()
            .filter(|&p| self.aggro(p) == top)
            .collect();
        let enemy = *ctx.rng.pick(&least_liked)?;

        let center = ctx.random_base_center();
        let owned = ctx
            .world
            .actors()
            .into_iter()
            .filter(|a| a.owner == enemy && (a.max_hp == 0 || a.hp > 0));

        match closest_to(owned, center) {
            Some(target) => {
                if least_liked.len() > 1 {
                    self.add_aggro(enemy, 1);
                }
                Some(target.id)
            }
            None => {
                let aggro = self.aggro.entry(enemy).or_insert(0);
                *aggro = *aggro / 2 - 1;
                bot_debug!(ctx.debug, enemy = enemy.0, "no target found for enemy player");
                None
            }
        }
    }

    /// Points the protection squad at `attacker`, filling it with armed units around
    /// the base if it has no members.
    pub fn protect_own(&mut self, ctx: &mut BotContext<'_>, attacker: ActorId) {
        let index = self.find_or_register(SquadKind::Protection, Some(attacker));
        let squad = &mut self.squads[index];

        if squad.target_actor(ctx).is_none() {
            squad.set_target(Some(attacker));
        }

        if !squad.is_valid() {
            let center = ctx.random_base_center();
            let radius = WDist::from_cells(ctx.config.protect_unit_scan_radius);
            for unit in ctx.world.actors_in_circle(center, radius) {
                if ctx.owns(&unit) && !unit.has(ActorCaps::BUILDING) && unit.has(ActorCaps::ARMED)
                {
                    squad.add_member(unit.id);
                }
            }
        }
    }
}

fn harvest_order(ctx: &BotContext<'_>, harvester: ActorId) -> Order {
    let order = Order::new(Command::Harvest, harvester);
    match ctx.world.next_resource_cell(harvester) {
        Some(cell) => order.with_cell(cell),
        None => order,
    }
}
