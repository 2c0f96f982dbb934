//! One simulation step.

use bot_core::{ActivityKind, ActorCaps, ActorId, ActorSnapshot, CPos, PlayerId, Stance, WorldQuery};

use super::{Hit, SandboxWorld};

/// Direct-fire range in cells.
pub const ATTACK_RANGE: i32 = 5;
/// Resources a harvester at its field collects per tick.
pub const HARVEST_RATE: i32 = 2;
/// Hit points a repairing structure regains per tick.
pub const REPAIR_RATE: i32 = 5;

impl SandboxWorld {
    /// Advances the world by one tick and returns the hits dealt during it.
    pub fn advance(&mut self) -> Vec<Hit> {
        self.tick += 1;
        self.advance_production();
        self.advance_movement();
        self.advance_harvesting();
        self.advance_combat();
        self.advance_repairs();

        for state in self.players.values_mut() {
            state.outage_ticks = state.outage_ticks.saturating_sub(1);
            for power in &mut state.powers {
                power.remaining = power.remaining.saturating_sub(1);
            }
        }

        std::mem::take(&mut self.pending_hits)
    }

    fn advance_production(&mut self) {
        let mut delivered = Vec::new();
        for ((host, category), production) in &mut self.production {
            production.remaining = production.remaining.saturating_sub(1);
            let is_unit = self
                .rules
                .template(&production.item)
                .is_some_and(|t| !t.is_structure());
            if production.remaining == 0 && is_unit {
                delivered.push((*host, category.clone(), production.item.clone()));
            }
        }

        for (host, category, item) in delivered {
            self.production.remove(&(host, category));
            let Some(producer) = self.actors.get(&host).cloned() else {
                continue;
            };
            let exit = self.free_cell_near(producer.cell);
            match self.spawn(producer.owner, &item, exit) {
                Ok(unit) => {
                    if let Some(rally) = producer.rally_point {
                        self.send(unit, rally);
                    }
                }
                Err(err) => tracing::warn!(target: "sandbox", %err, "failed to deliver unit"),
            }
        }
    }

    fn send(&mut self, id: ActorId, cell: CPos) {
        let activity = self.activities.entry(id).or_default();
        activity.destination = Some(cell);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.activity = ActivityKind::Moving;
        }
    }

    fn advance_movement(&mut self) {
        let moving: Vec<(ActorId, CPos)> = self
            .activities
            .iter()
            .filter_map(|(id, a)| a.destination.map(|d| (*id, d)))
            .collect();

        for (id, destination) in moving {
            let Some(actor) = self.actors.get_mut(&id) else {
                continue;
            };
            actor.cell = step_toward(actor.cell, destination);
            if actor.cell != destination {
                continue;
            }
            if actor.activity == ActivityKind::Moving {
                actor.activity = ActivityKind::Idle;
            }

            let deploy = self
                .activities
                .get_mut(&id)
                .map(|a| {
                    a.destination = None;
                    a.deploy_on_arrival
                })
                .unwrap_or(false);
            if deploy {
                if let Err(err) = self.deploy(id) {
                    tracing::debug!(target: "sandbox", actor = %id, %err, "deploy on arrival failed");
                    self.activities.remove(&id);
                }
            }
        }
    }

    fn advance_harvesting(&mut self) {
        let mut gathered: Vec<PlayerId> = Vec::new();
        for actor in self.actors.values() {
            let at_field = self
                .activities
                .get(&actor.id)
                .is_none_or(|a| a.destination.is_none());
            if actor.activity == ActivityKind::Harvesting && at_field {
                gathered.push(actor.owner);
            }
        }

        for owner in gathered {
            let capacity = self.storage_capacity(owner);
            if let Some(state) = self.players.get_mut(&owner) {
                state.resources = (state.resources + HARVEST_RATE).min(capacity);
            }
        }
    }

    fn advance_combat(&mut self) {
        let armed: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.has(ActorCaps::ARMED))
            .map(|a| a.id)
            .collect();

        for id in armed {
            let Some(attacker) = self.actors.get(&id).cloned() else {
                continue;
            };
            let target = self
                .activities
                .get(&id)
                .and_then(|a| a.target)
                .filter(|t| self.actors.contains_key(t))
                .or_else(|| self.auto_target(&attacker));
            let Some(target) = target.and_then(|t| self.actors.get(&t).cloned()) else {
                if attacker.activity == ActivityKind::Attacking {
                    self.activities.remove(&id);
                    if let Some(actor) = self.actors.get_mut(&id) {
                        actor.activity = ActivityKind::Idle;
                    }
                }
                continue;
            };

            let range_sq = ATTACK_RANGE as i64 * ATTACK_RANGE as i64;
            if attacker.cell.distance_sq(target.cell) <= range_sq {
                let amount = (attacker.damage / 4).max(1);
                if let Some(hit) = self.damage(target.id, Some(id), amount) {
                    self.pending_hits.push(hit);
                }
            } else if attacker.has(ActorCaps::MOBILE)
                && attacker.activity == ActivityKind::Attacking
            {
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.cell = step_toward(actor.cell, target.cell);
                }
            }
        }
    }

    /// Closest enemy in range of an actor with no explicit target.
    fn auto_target(&self, attacker: &ActorSnapshot) -> Option<ActorId> {
        let attack_moving = self.activities.get(&attacker.id).is_some_and(|a| a.attack_move);
        let busy = match attacker.activity {
            ActivityKind::Harvesting => true,
            ActivityKind::Moving => !attack_moving,
            _ => false,
        };
        if busy {
            return None;
        }
        let range_sq = ATTACK_RANGE as i64 * ATTACK_RANGE as i64;
        self.actors
            .values()
            .filter(|a| self.stance(attacker.owner, a.owner) == Stance::Enemy)
            .filter(|a| a.cell.distance_sq(attacker.cell) <= range_sq)
            .min_by_key(|a| (a.cell.distance_sq(attacker.cell), a.id))
            .map(|a| a.id)
    }

    fn advance_repairs(&mut self) {
        for actor in self.actors.values_mut().filter(|a| a.repairing) {
            actor.hp = (actor.hp + REPAIR_RATE).min(actor.max_hp);
            if actor.hp >= actor.max_hp {
                actor.repairing = false;
            }
        }
    }
}

/// One cell toward `to`, diagonally while both axes differ.
fn step_toward(from: CPos, to: CPos) -> CPos {
    CPos::new(
        from.x + (to.x - from.x).signum(),
        from.y + (to.y - from.y).signum(),
    )
}

#[cfg(test)]
mod tests {
    use bot_core::{Command, MapSize, Order, ProductionQueues};

    use super::*;
    use crate::rules::Ruleset;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new(MapSize::new(32, 32), Ruleset::standard());
        world.add_player(P1, 5000);
        world.add_player(P2, 5000);
        world
    }

    #[test]
    fn units_walk_to_their_destination() {
        let mut world = world();
        let tank = world.spawn(P1, "2tnk", CPos::new(2, 2)).unwrap();
        world
            .apply(P1, &Order::new(Command::Move, tank).with_cell(CPos::new(6, 4)))
            .unwrap();

        for _ in 0..3 {
            world.advance();
        }
        assert_eq!(world.actor(tank).unwrap().activity, ActivityKind::Moving);
        world.advance();
        let tank = world.actor(tank).unwrap();
        assert_eq!(tank.cell, CPos::new(6, 4));
        assert!(tank.is_idle());
    }

    #[test]
    fn queued_deploy_happens_on_arrival() {
        let mut world = world();
        let mcv = world.spawn(P1, "mcv", CPos::new(2, 2)).unwrap();
        world
            .apply(P1, &Order::new(Command::Move, mcv).with_cell(CPos::new(4, 2)).queued())
            .unwrap();
        world
            .apply(P1, &Order::new(Command::DeployTransform, mcv).queued())
            .unwrap();
        assert_eq!(world.count_of(P1, "mcv"), 1);

        world.advance();
        world.advance();
        assert_eq!(world.count_of(P1, "mcv"), 0);
        let yard = world.owned_by(P1).next().unwrap();
        assert_eq!((yard.kind.as_str(), yard.cell), ("fact", CPos::new(4, 2)));
    }

    #[test]
    fn finished_units_leave_the_factory() {
        let mut world = world();
        world.spawn(P1, "proc", CPos::new(2, 2)).unwrap();
        let weap = world.spawn(P1, "weap", CPos::new(5, 5)).unwrap();
        world.actor_mut(weap).unwrap().rally_point = Some(CPos::new(9, 5));
        world
            .apply(P1, &Order::new(Command::StartProduction, weap).with_item("jeep"))
            .unwrap();

        for _ in 0..24 {
            world.advance();
        }
        assert_eq!(world.count_of(P1, "jeep"), 1);
        assert!(world.queues(P1, "Vehicle")[0].current.is_none());
        let jeep = world.owned_by(P1).find(|a| a.kind == "jeep").unwrap();
        assert_eq!(jeep.activity, ActivityKind::Moving);
    }

    #[test]
    fn idle_armed_units_return_fire() {
        let mut world = world();
        let ours = world.spawn(P1, "2tnk", CPos::new(10, 10)).unwrap();
        let theirs = world.spawn(P2, "e1", CPos::new(12, 10)).unwrap();

        let hits = world.advance();
        assert!(hits.iter().any(|h| h.owner == P2 && h.event.attacker == Some(ours)));
        assert!(hits.iter().any(|h| h.owner == P1 && h.event.attacker == Some(theirs)));
    }

    #[test]
    fn attack_kills_and_goes_idle() {
        let mut world = world();
        let tank = world.spawn(P1, "2tnk", CPos::new(2, 2)).unwrap();
        let target = world.spawn(P2, "powr", CPos::new(20, 2)).unwrap();
        world
            .apply(P1, &Order::new(Command::Attack, tank).with_actor(target))
            .unwrap();

        for _ in 0..200 {
            world.advance();
        }
        assert!(world.actor(target).is_none());
        assert!(world.actor(tank).unwrap().is_idle());
    }

    #[test]
    fn harvesting_fills_storage() {
        let mut world = world();
        world.spawn(P1, "proc", CPos::new(2, 2)).unwrap();
        world.add_resource(CPos::new(4, 2));
        let harv = world.spawn(P1, "harv", CPos::new(4, 2)).unwrap();
        world.apply(P1, &Order::new(Command::Harvest, harv)).unwrap();

        for _ in 0..10 {
            world.advance();
        }
        assert_eq!(world.economy(P1).resources, HARVEST_RATE * 10);
    }

    #[test]
    fn repair_stops_at_full_health() {
        let mut world = world();
        let powr = world.spawn(P1, "powr", CPos::new(2, 2)).unwrap();
        world.actor_mut(powr).unwrap().hp = 790;
        world
            .apply(P1, &Order::for_player(Command::RepairBuilding).with_actor(powr))
            .unwrap();

        world.advance();
        world.advance();
        let powr = world.actor(powr).unwrap();
        assert_eq!(powr.hp, 800);
        assert!(!powr.repairing);
    }
}
