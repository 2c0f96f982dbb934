//! Squads of units acting together.
//!
//! # Design
//!
//! A [`Squad`] is a list of unit handles, an optional target handle and a small state
//! machine. Nothing in a squad outlives a tick: members and target are plain
//! [`ActorId`]s resolved against the world on every update, so a unit that died since
//! the last tick simply stops resolving.
//!
//! States are the [`SquadState`] enum; each squad kind starts in its own idle state
//! and every state decides on its own when to move on. See [`state`] for the machine
//! and `ground`, `air` and `protection` for the per-kind behavior.
//!
//! The [`SquadManager`] owns every squad, prunes the ones that lost all members and
//! routes freshly produced units into them.

mod air;
mod ground;
pub mod manager;
mod protection;
pub mod state;

pub use manager::SquadManager;
pub use state::{SquadState, StateMachine};

use crate::context::{BotContext, closest_to};
use crate::geometry::{CPos, WDist};
use crate::order::{Command, Order};
use crate::world::{ActorCaps, ActorId, ActorSnapshot, WorldQuery};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SquadId(pub u32);

impl core::fmt::Display for SquadId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "squad-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum SquadKind {
    /// Main attack force formed from units idling at the base.
    Assault,
    /// Armed aircraft hunting undefended targets.
    Air,
    /// Opportunistic strike on a weakly defended enemy base.
    Rush,
    /// Base defenders gathered when something of ours is attacked.
    Protection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Squad {
    id: SquadId,
    kind: SquadKind,
    members: Vec<ActorId>,
    target: Option<ActorId>,
    fsm: StateMachine,
}

impl Squad {
    pub fn new(id: SquadId, kind: SquadKind, target: Option<ActorId>) -> Self {
        Self {
            id,
            kind,
            members: Vec::new(),
            target,
            fsm: StateMachine::new(SquadState::initial(kind)),
        }
    }

    pub fn id(&self) -> SquadId {
        self.id
    }

    pub fn kind(&self) -> SquadKind {
        self.kind
    }

    pub fn members(&self) -> &[ActorId] {
        &self.members
    }

    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<ActorId>) {
        self.target = target;
    }

    pub fn state(&self) -> SquadState {
        self.fsm.current()
    }

    pub fn previous_state(&self) -> Option<SquadState> {
        self.fsm.previous()
    }

    /// A squad without members does nothing and is pruned by the manager.
    pub fn is_valid(&self) -> bool {
        !self.members.is_empty()
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.contains(&actor)
    }

    pub fn add_member(&mut self, actor: ActorId) {
        if !self.contains(actor) {
            self.members.push(actor);
        }
    }

    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    pub fn retain_members(&mut self, keep: impl FnMut(&ActorId) -> bool) {
        self.members.retain(keep);
    }

    /// Members that still exist, in membership order.
    pub fn member_snapshots(&self, world: &dyn WorldQuery) -> Vec<ActorSnapshot> {
        self.members
            .iter()
            .filter_map(|&id| world.actor(id))
            .collect()
    }

    /// The target if it is still a live, targetable enemy.
    pub fn target_actor(&self, ctx: &BotContext<'_>) -> Option<ActorSnapshot> {
        self.target
            .and_then(|id| ctx.world.actor(id))
            .filter(|actor| ctx.is_hostile_target(actor))
    }

    /// Average cell of the members.
    pub fn center(&self, world: &dyn WorldQuery) -> Option<CPos> {
        let members = self.member_snapshots(world);
        if members.is_empty() {
            return None;
        }

        let n = members.len() as i64;
        let (x, y) = members.iter().fold((0i64, 0i64), |(x, y), a| {
            (x + a.cell.x as i64, y + a.cell.y as i64)
        });
        Some(CPos::new((x / n) as i32, (y / n) as i32))
    }

    pub fn random_member(&self, ctx: &mut BotContext<'_>) -> Option<ActorSnapshot> {
        let members = self.member_snapshots(ctx.world);
        ctx.rng.pick(&members).cloned()
    }

    /// Leaves the current state for `next`.
    ///
    /// With `remember_previous` the old state becomes the one
    /// [`Squad::revert_to_previous_state`] returns to.
    pub fn change_state(
        &mut self,
        next: SquadState,
        remember_previous: bool,
        ctx: &mut BotContext<'_>,
    ) {
        let current = self.fsm.current();
        current.deactivate(self);
        self.fsm.transition(next, remember_previous);
        next.activate(self, ctx);
    }

    /// Goes back to the remembered state, if there is one.
    pub fn revert_to_previous_state(&mut self, save_current: bool, ctx: &mut BotContext<'_>) {
        if let Some(previous) = self.fsm.previous() {
            self.change_state(previous, save_current, ctx);
        }
    }

    pub fn update(&mut self, ctx: &mut BotContext<'_>) {
        if !self.is_valid() {
            return;
        }
        let state = self.fsm.current();
        state.tick(self, ctx);
    }

    /// The current target, or a new one: the enemy closest to a random member.
    ///
    /// `None` means nothing hostile is left to fight.
    fn retarget_near_random_member(&mut self, ctx: &mut BotContext<'_>) -> Option<ActorSnapshot> {
        if let Some(target) = self.target_actor(ctx) {
            return Some(target);
        }

        let member = self.random_member(ctx)?;
        let enemy = ctx.closest_enemy(member.cell)?;
        self.target = Some(enemy.id);
        Some(enemy)
    }

    /// Armed enemies around a random member, or `None` if that member is safe.
    ///
    /// A member near one of our own buildings is always considered safe.
    fn threats_near_random_member(&self, ctx: &mut BotContext<'_>) -> Option<Vec<ActorSnapshot>> {
        let member = self.random_member(ctx)?;
        let around = ctx
            .world
            .actors_in_circle(member.cell, WDist::from_cells(ctx.config.danger_scan_radius));

        if around
            .iter()
            .any(|a| ctx.owns(a) && a.has(ActorCaps::BUILDING))
        {
            return None;
        }

        let threats: Vec<ActorSnapshot> = around
            .into_iter()
            .filter(|a| ctx.is_enemy(a) && a.has(ActorCaps::ARMED))
            .collect();

        (!threats.is_empty()).then_some(threats)
    }

    /// Sends every member to one random own building.
    fn go_to_random_own_building(&self, ctx: &mut BotContext<'_>) {
        let cell = ctx.random_own_building_cell();
        for &member in &self.members {
            ctx.queue(Order::new(Command::Move, member).with_cell(cell));
        }
    }

    fn leader(&self, ctx: &BotContext<'_>, target: CPos) -> Option<ActorSnapshot> {
        closest_to(self.member_snapshots(ctx.world), target)
    }
}
