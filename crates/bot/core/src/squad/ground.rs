//! Ground squads: assault and rush forces.

use super::{Squad, SquadState};
use crate::context::BotContext;
use crate::geometry::WDist;
use crate::order::{Command, Order};

/// Waits for a target with enemies around it, then commits or retreats.
pub(super) fn idle(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    let target = match squad.target_actor(ctx) {
        Some(target) => target,
        None => {
            let Some(first) = squad.member_snapshots(ctx.world).into_iter().next() else {
                return;
            };
            let Some(enemy) = ctx.closest_enemy(first.cell) else {
                return;
            };
            squad.set_target(Some(enemy.id));
            enemy
        }
    };

    let enemies = ctx.enemies_within(target.cell, WDist::from_cells(ctx.config.idle_scan_radius));
    if enemies.is_empty() {
        return;
    }

    let members = squad.member_snapshots(ctx.world);
    if ctx.attack_or_flee.can_attack(&members, &enemies, ctx.debug) {
        for &member in squad.members() {
            ctx.queue(Order::new(Command::AttackMove, member).with_cell(target.cell));
        }
        squad.change_state(SquadState::GroundAttackMove, true, ctx);
    } else {
        squad.change_state(SquadState::GroundFlee, true, ctx);
    }
}

/// Advances on the target while keeping the group together.
pub(super) fn attack_move(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    let Some(target) = squad.retarget_near_random_member(ctx) else {
        squad.change_state(SquadState::GroundFlee, true, ctx);
        return;
    };
    let Some(leader) = squad.leader(ctx, target.cell) else {
        return;
    };

    let members = squad.member_snapshots(ctx.world);
    let regroup_radius = WDist::from_cells(squad.members().len() as i32) / 3;
    let (close, stragglers): (Vec<_>, Vec<_>) = members
        .iter()
        .partition(|m| m.cell.within(leader.cell, regroup_radius));

    if close.len() < squad.members().len() {
        ctx.queue(Order::new(Command::Stop, leader.id));
        for straggler in stragglers {
            ctx.queue(Order::new(Command::AttackMove, straggler.id).with_cell(leader.cell));
        }
    } else {
        let scan = WDist::from_cells(ctx.config.attack_scan_radius);
        if let Some(enemy) = ctx.closest_enemy_within(leader.cell, scan) {
            squad.set_target(Some(enemy.id));
            squad.change_state(SquadState::GroundAttack, true, ctx);
            return;
        }
        for &member in squad.members() {
            ctx.queue(Order::new(Command::AttackMove, member).with_cell(target.cell));
        }
    }

    if should_flee(squad, ctx) {
        squad.change_state(SquadState::GroundFlee, true, ctx);
    }
}

/// Engages: every member that is not already fighting attacks its nearest enemy.
pub(super) fn attack(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    if squad.retarget_near_random_member(ctx).is_none() {
        squad.change_state(SquadState::GroundFlee, true, ctx);
        return;
    }

    for member in squad.member_snapshots(ctx.world) {
        if member.is_attacking() {
            continue;
        }
        if let Some(enemy) = ctx.closest_enemy(member.cell) {
            ctx.queue(Order::new(Command::Attack, member.id).with_actor(enemy.id));
        }
    }

    if should_flee(squad, ctx) {
        squad.change_state(SquadState::GroundFlee, true, ctx);
    }
}

/// Falls back home; leaving this state disbands the squad.
pub(super) fn flee(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    squad.go_to_random_own_building(ctx);
    squad.change_state(SquadState::GroundIdle, true, ctx);
}

fn should_flee(squad: &Squad, ctx: &mut BotContext<'_>) -> bool {
    let Some(threats) = squad.threats_near_random_member(ctx) else {
        return false;
    };
    let members = squad.member_snapshots(ctx.world);
    !ctx.attack_or_flee.can_attack(&members, &threats, ctx.debug)
}
