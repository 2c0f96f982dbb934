//! Air squads: armed aircraft looking for targets without anti-air cover.

use super::{Squad, SquadState};
use crate::context::BotContext;
use crate::geometry::{CPos, WDist};
use crate::order::{Command, Order};
use crate::world::{ActorCaps, ActorId, ActorSnapshot};

/// A position is unsafe once anti-air units times this reach the squad size.
const ANTI_AIR_MULTIPLIER: usize = 3;

pub(super) fn idle(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    if should_flee(squad, ctx) {
        squad.change_state(SquadState::AirFlee, true, ctx);
        return;
    }

    let Some(target) = find_defenseless_target(squad, ctx) else {
        return;
    };
    squad.set_target(Some(target));
    squad.change_state(SquadState::AirAttack, true, ctx);
}

pub(super) fn attack(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    let Some(target) = squad.retarget_near_random_member(ctx) else {
        squad.change_state(SquadState::AirFlee, true, ctx);
        return;
    };

    if !near_pos_safely(squad, ctx, target.cell).safe {
        squad.change_state(SquadState::AirFlee, true, ctx);
        return;
    }

    for member in squad.member_snapshots(ctx.world) {
        if member.is_attacking() {
            continue;
        }
        if !member.reloads_automatically() && !member.has_ammo() {
            continue;
        }
        ctx.queue(Order::new(Command::Attack, member.id).with_actor(target.id));
    }
}

/// Aircraft short on ammo head for a rearm pad; the rest circle over the base.
pub(super) fn flee(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    let home = ctx.random_own_building_cell();
    for member in squad.member_snapshots(ctx.world) {
        if !member.reloads_automatically() && !member.full_ammo() {
            ctx.queue(Order::new(Command::ReturnToBase, member.id));
        } else {
            ctx.queue(Order::new(Command::Move, member.id).with_cell(home));
        }
    }
    squad.change_state(SquadState::AirIdle, true, ctx);
}

fn should_flee(squad: &Squad, ctx: &mut BotContext<'_>) -> bool {
    let Some(threats) = squad.threats_near_random_member(ctx) else {
        return false;
    };
    count_anti_air(&threats) * ANTI_AIR_MULTIPLIER > squad.members().len()
}

fn count_anti_air(actors: &[ActorSnapshot]) -> usize {
    actors
        .iter()
        .filter(|a| a.has(ActorCaps::ARMED | ActorCaps::ANTI_AIR) && !a.has(ActorCaps::AIRCRAFT))
        .count()
}

struct Safety {
    safe: bool,
    /// A random enemy seen at a safe position.
    detected: Option<ActorId>,
}

fn near_pos_safely(squad: &Squad, ctx: &mut BotContext<'_>, cell: CPos) -> Safety {
    let radius = WDist::from_cells(ctx.config.danger_scan_radius);
    let enemies = ctx.enemies_within(cell, radius);
    if enemies.is_empty() {
        return Safety {
            safe: true,
            detected: None,
        };
    }

    if count_anti_air(&enemies) * ANTI_AIR_MULTIPLIER < squad.members().len() {
        Safety {
            safe: true,
            detected: ctx.rng.pick(&enemies).map(|a| a.id),
        }
    } else {
        Safety {
            safe: false,
            detected: None,
        }
    }
}

/// Sweeps the map on a grid twice the danger radius wide for a safe spot with an
/// enemy in it.
fn find_defenseless_target(squad: &Squad, ctx: &mut BotContext<'_>) -> Option<ActorId> {
    let map = ctx.world.map_size();
    let radius = ctx.config.danger_scan_radius.max(1);
    let step = (radius * 2) as usize;
    let extend = |size: i32| if size % radius == 0 { size } else { size + radius };

    for x in (0..extend(map.width)).step_by(step) {
        for y in (0..extend(map.height)).step_by(step) {
            let safety = near_pos_safely(squad, ctx, CPos::new(x, y));
            if safety.safe && safety.detected.is_some() {
                return safety.detected;
            }
        }
    }
    None
}
