//! Applying bot orders to the sandbox.

use bot_core::{
    ActivityKind, ActorCaps, ActorId, CPos, Command, DamageEvent, Order, PlayerId,
    ProductionQueues, WorldQuery,
};

use super::{Activity, Hit, Production, SandboxWorld};
use crate::error::{Result, SandboxError};

impl SandboxWorld {
    /// Carries out `order` on behalf of `player`.
    ///
    /// Illegal orders leave the world untouched and report why they were refused.
    pub fn apply(&mut self, player: PlayerId, order: &Order) -> Result<()> {
        match order.command {
            Command::Move | Command::AttackMove => {
                let id = self.owned_subject(player, order)?;
                let cell = required_cell(order)?;
                self.set_destination(id, cell, ActivityKind::Moving);
                if let Some(activity) = self.activities.get_mut(&id) {
                    activity.attack_move = order.command == Command::AttackMove;
                }
            }
            Command::Attack => {
                let id = self.owned_subject(player, order)?;
                let target = order.target_actor().ok_or(SandboxError::MissingArgument {
                    command: order.command,
                    what: "target actor",
                })?;
                if !self.actors.contains_key(&target) {
                    return Err(SandboxError::UnknownActor(target));
                }
                self.activities.insert(
                    id,
                    Activity {
                        target: Some(target),
                        ..Activity::default()
                    },
                );
                self.set_activity(id, ActivityKind::Attacking);
            }
            Command::Stop => {
                let id = self.owned_subject(player, order)?;
                self.activities.remove(&id);
                self.set_activity(id, ActivityKind::Idle);
            }
            Command::Harvest => {
                let id = self.owned_subject(player, order)?;
                let field = order
                    .target_cell()
                    .or_else(|| self.next_resource_cell(id))
                    .ok_or(SandboxError::MissingArgument {
                        command: order.command,
                        what: "resource cell",
                    })?;
                self.set_destination(id, field, ActivityKind::Harvesting);
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.harvester_empty = false;
                }
            }
            Command::ReturnToBase => {
                let id = self.owned_subject(player, order)?;
                let home = self
                    .owned_by(player)
                    .find(|a| a.is_base_center())
                    .or_else(|| self.owned_by(player).find(|a| a.has(ActorCaps::BUILDING)))
                    .map(|a| a.cell);
                if let Some(home) = home {
                    self.set_destination(id, home, ActivityKind::Moving);
                }
            }
            Command::DeployTransform => {
                let id = self.owned_subject(player, order)?;
                let moving = self
                    .activities
                    .get(&id)
                    .is_some_and(|a| a.destination.is_some());
                if order.queued && moving {
                    if let Some(activity) = self.activities.get_mut(&id) {
                        activity.deploy_on_arrival = true;
                    }
                } else {
                    self.deploy(id)?;
                }
            }
            Command::StartProduction => self.start_production(player, order)?,
            Command::CancelProduction => {
                let host = self.owned_subject(player, order)?;
                let key = self.production_key(host, order)?;
                if let Some(production) = self.production.remove(&key) {
                    self.refund(player, production.paid);
                }
            }
            Command::PlaceBuilding => self.place_building(player, order)?,
            Command::SetRallyPoint => {
                let id = self.owned_subject(player, order)?;
                let cell = required_cell(order)?;
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.rally_point = Some(cell);
                }
            }
            Command::RepairBuilding => {
                let id = order.target_actor().ok_or(SandboxError::MissingArgument {
                    command: order.command,
                    what: "target actor",
                })?;
                self.owned(player, id)?;
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.repairing = true;
                }
            }
            Command::SupportPower => self.fire_support_power(player, order)?,
        }
        Ok(())
    }

    fn owned(&self, player: PlayerId, id: ActorId) -> Result<()> {
        let actor = self.actors.get(&id).ok_or(SandboxError::UnknownActor(id))?;
        if actor.owner != player {
            return Err(SandboxError::NotOwned { actor: id, player });
        }
        Ok(())
    }

    fn owned_subject(&self, player: PlayerId, order: &Order) -> Result<ActorId> {
        let id = order.subject.ok_or(SandboxError::MissingArgument {
            command: order.command,
            what: "subject",
        })?;
        self.owned(player, id)?;
        Ok(id)
    }

    fn set_activity(&mut self, id: ActorId, activity: ActivityKind) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.activity = activity;
        }
    }

    fn set_destination(&mut self, id: ActorId, cell: CPos, activity: ActivityKind) {
        self.activities.insert(
            id,
            Activity {
                destination: Some(cell),
                ..Activity::default()
            },
        );
        self.set_activity(id, activity);
    }

    /// Replaces a deployable actor by the structure it turns into.
    pub(super) fn deploy(&mut self, id: ActorId) -> Result<()> {
        let actor = self
            .actors
            .get(&id)
            .cloned()
            .ok_or(SandboxError::UnknownActor(id))?;
        let kind = actor
            .transforms_into
            .clone()
            .ok_or(SandboxError::CannotDeploy(id))?;
        self.template(&kind)?;
        if !self.can_place_building(actor.owner, &kind, actor.cell) {
            return Err(SandboxError::IllegalPlacement {
                item: kind,
                cell: actor.cell,
            });
        }

        self.remove(id);
        self.spawn(actor.owner, &kind, actor.cell)?;
        tracing::debug!(target: "sandbox", actor = %id, %kind, cell = %actor.cell, "deployed");
        Ok(())
    }

    /// Queue key for the item named in a production order.
    fn production_key(&self, host: ActorId, order: &Order) -> Result<(ActorId, String)> {
        let item = required_item(order)?;
        let category = self
            .template(item)?
            .queue
            .clone()
            .ok_or_else(|| SandboxError::NotBuildable {
                item: item.to_owned(),
                queue: host,
            })?;
        Ok((host, category))
    }

    fn start_production(&mut self, player: PlayerId, order: &Order) -> Result<()> {
        let host = self.owned_subject(player, order)?;
        let key = self.production_key(host, order)?;
        let item = required_item(order)?.to_owned();

        let buildable = self
            .queues(player, &key.1)
            .iter()
            .any(|q| q.actor == host && q.can_build(&item));
        if !buildable {
            return Err(SandboxError::NotBuildable { item, queue: host });
        }
        if self.production.contains_key(&key) {
            return Err(SandboxError::QueueBusy(host));
        }

        let template = self.template(&item)?;
        let (cost, build_time) = (template.cost, template.build_time());
        if !self.spend(player, cost) {
            return Err(SandboxError::InsufficientFunds { player, item });
        }
        self.production.insert(
            key,
            Production {
                item,
                remaining: build_time,
                paid: cost,
            },
        );
        Ok(())
    }

    fn place_building(&mut self, player: PlayerId, order: &Order) -> Result<()> {
        let host = self.owned_subject(player, order)?;
        let key = self.production_key(host, order)?;
        let cell = required_cell(order)?;

        let item = match self.production.get(&key) {
            Some(p) if p.remaining == 0 && order.item.as_deref() == Some(p.item.as_str()) => {
                p.item.clone()
            }
            _ => return Err(SandboxError::NothingToPlace(host)),
        };
        if !self.can_place_building(player, &item, cell)
            || !self.is_close_enough_to_base(player, &item, cell)
        {
            return Err(SandboxError::IllegalPlacement { item, cell });
        }

        self.production.remove(&key);
        self.spawn(player, &item, cell)?;
        if let Some(unit) = self.template(&item)?.free_unit.clone() {
            let spot = self.free_cell_near(cell);
            self.spawn(player, &unit, spot)?;
        }
        tracing::debug!(target: "sandbox", player = player.0, %item, %cell, "structure placed");
        Ok(())
    }

    fn fire_support_power(&mut self, player: PlayerId, order: &Order) -> Result<()> {
        let name = order.item.clone().ok_or(SandboxError::MissingArgument {
            command: order.command,
            what: "power name",
        })?;
        let cell = required_cell(order)?;

        let power = self
            .players
            .get_mut(&player)
            .and_then(|state| {
                state
                    .powers
                    .iter_mut()
                    .find(|p| p.order_name == name && p.is_ready() && !p.disabled)
            })
            .ok_or_else(|| SandboxError::PowerNotReady(name.clone()))?;
        power.remaining = power.charge_time;
        let (radius, damage) = (power.radius, power.damage);

        let radius_sq = radius as i64 * radius as i64;
        let victims: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.cell.distance_sq(cell) <= radius_sq)
            .map(|a| a.id)
            .collect();
        for victim in victims {
            if let Some(hit) = self.damage(victim, None, damage) {
                self.pending_hits.push(hit);
            }
        }
        tracing::debug!(target: "sandbox", player = player.0, power = %name, %cell, "support power fired");
        Ok(())
    }

    /// Applies `amount` damage, removing the victim when it dies.
    pub(super) fn damage(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        amount: i32,
    ) -> Option<Hit> {
        let actor = self.actors.get_mut(&victim)?;
        let previous_hp = actor.hp;
        actor.hp -= amount;
        let hit = Hit {
            owner: actor.owner,
            event: DamageEvent {
                victim,
                attacker,
                damage: amount,
                previous_hp,
            },
        };
        if actor.hp <= 0 {
            self.remove(victim);
        }
        Some(hit)
    }
}

fn required_item(order: &Order) -> Result<&str> {
    order.item.as_deref().ok_or(SandboxError::MissingArgument {
        command: order.command,
        what: "item",
    })
}

fn required_cell(order: &Order) -> Result<CPos> {
    order.target_cell().ok_or(SandboxError::MissingArgument {
        command: order.command,
        what: "target cell",
    })
}

#[cfg(test)]
mod tests {
    use bot_core::MapSize;

    use super::*;
    use crate::rules::Ruleset;
    use crate::world::PowerState;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    fn world() -> SandboxWorld {
        let mut world = SandboxWorld::new(MapSize::new(32, 32), Ruleset::standard());
        world.add_player(P1, 5000);
        world.add_player(P2, 5000);
        world
    }

    #[test]
    fn deploy_turns_vehicle_into_yard() {
        let mut world = world();
        let mcv = world.spawn(P1, "mcv", CPos::new(5, 5)).unwrap();

        world
            .apply(P1, &Order::new(Command::DeployTransform, mcv))
            .unwrap();
        assert!(world.actor(mcv).is_none());
        assert_eq!(world.count_of(P1, "fact"), 1);
    }

    #[test]
    fn orders_for_foreign_actors_are_refused() {
        let mut world = world();
        let mcv = world.spawn(P2, "mcv", CPos::new(5, 5)).unwrap();

        let err = world
            .apply(P1, &Order::new(Command::DeployTransform, mcv))
            .unwrap_err();
        assert_eq!(err, SandboxError::NotOwned { actor: mcv, player: P1 });
    }

    #[test]
    fn production_then_placement() {
        let mut world = world();
        let yard = world.spawn(P1, "fact", CPos::new(5, 5)).unwrap();

        world
            .apply(P1, &Order::new(Command::StartProduction, yard).with_item("powr"))
            .unwrap();
        assert_eq!(world.player(P1).unwrap().cash, 4700);
        let err = world
            .apply(P1, &Order::new(Command::StartProduction, yard).with_item("powr"))
            .unwrap_err();
        assert_eq!(err, SandboxError::QueueBusy(yard));

        let place = Order::new(Command::PlaceBuilding, yard)
            .with_item("powr")
            .with_cell(CPos::new(7, 5));
        assert_eq!(world.apply(P1, &place), Err(SandboxError::NothingToPlace(yard)));

        world.finish_production();
        assert!(world.queues(P1, "Building")[0].current.as_ref().unwrap().done);
        world.apply(P1, &place).unwrap();
        assert_eq!(world.count_of(P1, "powr"), 1);
        assert!(world.queues(P1, "Building")[0].current.is_none());
    }

    #[test]
    fn refinery_comes_with_a_harvester() {
        let mut world = world();
        let yard = world.spawn(P1, "fact", CPos::new(5, 5)).unwrap();
        world.spawn(P1, "powr", CPos::new(7, 5)).unwrap();

        world
            .apply(P1, &Order::new(Command::StartProduction, yard).with_item("proc"))
            .unwrap();
        world.finish_production();
        world
            .apply(
                P1,
                &Order::new(Command::PlaceBuilding, yard)
                    .with_item("proc")
                    .with_cell(CPos::new(9, 5)),
            )
            .unwrap();
        assert_eq!(world.count_of(P1, "harv"), 1);
    }

    #[test]
    fn cancel_refunds() {
        let mut world = world();
        let yard = world.spawn(P1, "fact", CPos::new(5, 5)).unwrap();
        world
            .apply(P1, &Order::new(Command::StartProduction, yard).with_item("powr"))
            .unwrap();
        world
            .apply(P1, &Order::new(Command::CancelProduction, yard).with_item("powr"))
            .unwrap();
        assert_eq!(world.player(P1).unwrap().cash, 5000);
    }

    #[test]
    fn support_power_damages_and_recharges() {
        let mut world = world();
        let tank = world.spawn(P2, "2tnk", CPos::new(20, 20)).unwrap();
        world.add_support_power(
            P1,
            PowerState {
                key: "nuke".to_owned(),
                order_name: "NukePowerInfoOrder".to_owned(),
                charge_time: 100,
                remaining: 0,
                disabled: false,
                radius: 2,
                damage: 100,
            },
        );

        let order = Order::for_player(Command::SupportPower)
            .with_item("NukePowerInfoOrder")
            .with_cell(CPos::new(21, 20));
        world.apply(P1, &order).unwrap();
        assert_eq!(world.actor(tank).unwrap().hp, 300);
        assert!(!world.support_powers(P1)[0].ready);
        assert_eq!(
            world.apply(P1, &order),
            Err(SandboxError::PowerNotReady("NukePowerInfoOrder".to_owned()))
        );
    }
}
