//! Squad states and the two-slot machine holding them.

use super::{Squad, SquadKind, air, ground, protection};
use crate::bot_debug;
use crate::context::BotContext;

/// Every state a squad can be in.
///
/// Each variant has three hooks: `activate` when entered, `tick` on every squad
/// update while current, `deactivate` when left. There is no transition table; a
/// state's `tick` decides by itself when to hand over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum SquadState {
    GroundIdle,
    GroundAttackMove,
    GroundAttack,
    GroundFlee,
    AirIdle,
    AirAttack,
    AirFlee,
    ProtectionIdle,
    ProtectionAttack,
    ProtectionFlee,
}

impl SquadState {
    pub fn initial(kind: SquadKind) -> Self {
        match kind {
            SquadKind::Assault | SquadKind::Rush => Self::GroundIdle,
            SquadKind::Air => Self::AirIdle,
            SquadKind::Protection => Self::ProtectionIdle,
        }
    }

    pub(super) fn activate(self, squad: &Squad, ctx: &BotContext<'_>) {
        bot_debug!(
            ctx.debug,
            squad = %squad.id(),
            kind = %squad.kind(),
            state = %self,
            "squad changed state"
        );
    }

    pub(super) fn tick(self, squad: &mut Squad, ctx: &mut BotContext<'_>) {
        match self {
            Self::GroundIdle => ground::idle(squad, ctx),
            Self::GroundAttackMove => ground::attack_move(squad, ctx),
            Self::GroundAttack => ground::attack(squad, ctx),
            Self::GroundFlee => ground::flee(squad, ctx),
            Self::AirIdle => air::idle(squad, ctx),
            Self::AirAttack => air::attack(squad, ctx),
            Self::AirFlee => air::flee(squad, ctx),
            Self::ProtectionIdle => protection::idle(squad, ctx),
            Self::ProtectionAttack => protection::attack(squad, ctx),
            Self::ProtectionFlee => protection::flee(squad, ctx),
        }
    }

    /// Leaving a ground or protection retreat disbands the squad.
    pub(super) fn deactivate(self, squad: &mut Squad) {
        if matches!(self, Self::GroundFlee | Self::ProtectionFlee) {
            squad.clear_members();
        }
    }
}

/// Current state plus at most one remembered predecessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateMachine {
    current: SquadState,
    previous: Option<SquadState>,
}

impl StateMachine {
    pub fn new(initial: SquadState) -> Self {
        Self {
            current: initial,
            previous: None,
        }
    }

    pub fn current(&self) -> SquadState {
        self.current
    }

    pub fn previous(&self) -> Option<SquadState> {
        self.previous
    }

    /// Swaps in `next`, remembering the old state if asked to.
    ///
    /// Hooks are run by [`Squad::change_state`], which owns the squad they act on.
    pub(super) fn transition(&mut self, next: SquadState, remember_previous: bool) {
        if remember_previous {
            self.previous = Some(self.current);
        }
        self.current = next;
    }
}
