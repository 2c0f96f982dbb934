//! Protection squads: defenders chasing whoever attacked the base.

use super::{Squad, SquadState};
use crate::context::BotContext;
use crate::geometry::WDist;
use crate::order::{Command, Order};

pub(super) fn idle(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    squad.change_state(SquadState::ProtectionAttack, true, ctx);
}

pub(super) fn attack(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    let target = match squad.target_actor(ctx) {
        Some(target) => Some(target),
        None => squad.center(ctx.world).and_then(|center| {
            ctx.closest_enemy_within(center, WDist::from_cells(ctx.config.protection_scan_radius))
        }),
    };

    let Some(target) = target else {
        squad.change_state(SquadState::ProtectionFlee, true, ctx);
        return;
    };
    squad.set_target(Some(target.id));

    for &member in squad.members() {
        ctx.queue(Order::new(Command::AttackMove, member).with_cell(target.cell));
    }
}

/// Returns home; leaving this state disbands the squad.
pub(super) fn flee(squad: &mut Squad, ctx: &mut BotContext<'_>) {
    squad.go_to_random_own_building(ctx);
    squad.change_state(SquadState::ProtectionIdle, true, ctx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squad::{SquadId, SquadKind};
    use crate::test_utils::{BOT, ENEMY, Harness, tank};
    use crate::world::ActorId;

    #[test]
    fn defenders_chase_the_attacker() {
        let mut harness = Harness::new();
        harness.world.spawn(tank(1, BOT, 10, 10));
        harness.world.spawn(tank(2, BOT, 12, 10));
        harness.world.spawn(tank(9, ENEMY, 20, 20));

        let mut squad = Squad::new(SquadId(1), SquadKind::Protection, Some(ActorId(9)));
        squad.add_member(ActorId(1));
        squad.add_member(ActorId(2));

        let mut ctx = harness.ctx();
        squad.update(&mut ctx);
        assert_eq!(squad.state(), SquadState::ProtectionAttack);
        squad.update(&mut ctx);

        let orders: Vec<_> = harness.orders.iter().collect();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.command == Command::AttackMove));
    }

    #[test]
    fn nothing_nearby_sends_defenders_home_and_disbands() {
        let mut harness = Harness::new();
        harness.world.spawn(tank(1, BOT, 10, 10));
        harness.world.spawn(tank(9, ENEMY, 60, 60));

        let mut squad = Squad::new(SquadId(1), SquadKind::Protection, None);
        squad.add_member(ActorId(1));

        let mut ctx = harness.ctx();
        squad.update(&mut ctx);
        squad.update(&mut ctx);
        assert_eq!(squad.state(), SquadState::ProtectionFlee);

        squad.update(&mut ctx);
        assert_eq!(squad.state(), SquadState::ProtectionIdle);
        assert!(!squad.is_valid());
    }
}
