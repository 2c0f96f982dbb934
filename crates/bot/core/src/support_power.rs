//! Support power targeting.
//!
//! Each ready power is aimed in two passes. A coarse pass steps a box of
//! `coarse_scan_radius` cells over the whole map and scores the actors inside it;
//! a fine pass then scores individual cells around the best box, each
//! [`Consideration`] looking at actors within its own radius. The best cell gets the
//! power. When either pass finds nothing worth hitting the power waits a random
//! rescan interval before trying again.

use std::collections::BTreeMap;

use crate::bot_debug;
use crate::context::BotContext;
use crate::error::{ConfigError, DecisionError};
use crate::geometry::{CPos, WDist};
use crate::order::{Command, Order};
use crate::timer::IntervalTimer;
use crate::world::{ActorSnapshot, Stance};

/// Ticks to hold off after firing, so the power is not re-aimed before the order lands.
const FIRED_DELAY: u32 = 10;

/// Cells the fine pass reaches beyond each side of the coarse box.
const FINE_SCAN_EXTENSION: i32 = 1;

/// How a matching actor contributes to a consideration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum DecisionMetric {
    /// Flat attractiveness per actor.
    #[default]
    None,
    /// Attractiveness scaled by the actor's cost.
    Value,
    /// Attractiveness scaled by the actor's remaining health fraction.
    Health,
}

/// One scoring rule of a [`SupportPowerDecision`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Consideration {
    /// Stance the bot must have toward the actor's owner.
    pub against: Stance,
    /// Target types, any of which makes an actor count.
    pub types: Vec<String>,
    /// Score per matching actor. Negative values steer the power away.
    pub attractiveness: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metric: DecisionMetric,
    /// Radius in cells around a candidate cell during the fine pass.
    pub check_radius: i32,
}

impl Consideration {
    fn score(&self, ctx: &BotContext<'_>, actor: &ActorSnapshot) -> i64 {
        if ctx.stance_toward(actor) != self.against {
            return 0;
        }
        if !actor.target_types.iter().any(|t| self.types.contains(t)) {
            return 0;
        }

        let attractiveness = self.attractiveness as i64;
        match self.metric {
            DecisionMetric::None => attractiveness,
            DecisionMetric::Value => actor.cost as i64 * attractiveness,
            DecisionMetric::Health if actor.max_hp > 0 => {
                actor.hp as i64 * attractiveness / actor.max_hp as i64
            }
            DecisionMetric::Health => attractiveness,
        }
    }

    fn score_all(&self, ctx: &BotContext<'_>, actors: &[ActorSnapshot]) -> i64 {
        actors.iter().map(|a| self.score(ctx, a)).sum()
    }
}

/// How the bot aims one kind of support power.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportPowerDecision {
    /// Order name of the power this decision applies to.
    pub order_name: String,
    /// Minimum score a location needs to be worth the power.
    pub minimum_attractiveness: i32,
    pub fine_scan_radius: i32,
    pub coarse_scan_radius: i32,
    /// Shortest wait after a failed scan.
    pub minimum_scan_interval: u32,
    /// Longest wait after a failed scan.
    pub maximum_scan_interval: u32,
    pub considerations: Vec<Consideration>,
}

impl SupportPowerDecision {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidSupportPower {
            order: self.order_name.clone(),
            reason,
        };

        if self.order_name.is_empty() {
            return Err(invalid("empty order name"));
        }
        if self.coarse_scan_radius <= 0 || self.fine_scan_radius <= 0 {
            return Err(invalid("scan radii must be positive"));
        }
        if self.minimum_scan_interval > self.maximum_scan_interval {
            return Err(invalid("minimum scan interval exceeds maximum"));
        }
        if self.considerations.is_empty() {
            return Err(invalid("no considerations"));
        }
        if self.considerations.iter().any(|c| c.check_radius < 0) {
            return Err(invalid("negative check radius"));
        }
        Ok(())
    }

    /// Sum of all considerations over `actors`, used by the coarse pass.
    pub fn attractiveness_of(&self, ctx: &BotContext<'_>, actors: &[ActorSnapshot]) -> i64 {
        self.considerations
            .iter()
            .map(|c| c.score_all(ctx, actors))
            .sum()
    }

    /// Score of `cell`; each consideration looks within its own radius.
    pub fn attractiveness_at(&self, ctx: &BotContext<'_>, cell: CPos) -> i64 {
        self.considerations
            .iter()
            .map(|c| {
                let actors = ctx
                    .world
                    .actors_in_circle(cell, WDist::from_cells(c.check_radius));
                c.score_all(ctx, &actors)
            })
            .sum()
    }

    fn next_scan_time(&self, ctx: &mut BotContext<'_>) -> u32 {
        ctx.rng.range(
            self.minimum_scan_interval as i64,
            self.maximum_scan_interval as i64,
        ) as u32
    }

    /// Top-left corner of the best box, or `None` if nothing clears the minimum.
    fn find_coarse_location(&self, ctx: &BotContext<'_>) -> Option<CPos> {
        let map = ctx.world.map_size();
        let step = self.coarse_scan_radius;
        let mut best = Best::new(self.minimum_attractiveness);

        for i in (0..map.width).step_by(step as usize) {
            for j in (0..map.height).step_by(step as usize) {
                let top_left = CPos::new(i, j);
                let bottom_right = CPos::new(i + step, j + step);
                let actors = ctx.world.actors_in_box(top_left, bottom_right);
                best.offer(top_left, self.attractiveness_of(ctx, &actors));
            }
        }
        best.cell
    }

    /// Best cell around a coarse hit, reaching one cell past the coarse box.
    ///
    /// Cells off the map are never scored.
    fn find_fine_location(&self, ctx: &BotContext<'_>, origin: CPos) -> Option<CPos> {
        let map = ctx.world.map_size();
        let mut best = Best::new(self.minimum_attractiveness);
        let offsets = (-FINE_SCAN_EXTENSION..=self.coarse_scan_radius + FINE_SCAN_EXTENSION)
            .step_by(self.fine_scan_radius as usize);

        for i in offsets.clone() {
            for j in offsets.clone() {
                let cell = CPos::new(origin.x + i, origin.y + j);
                if !map.contains(cell) {
                    continue;
                }
                best.offer(cell, self.attractiveness_at(ctx, cell));
            }
        }
        best.cell
    }
}

/// Running best of a scan. A candidate must beat both the best so far (starting at
/// zero) and the minimum.
struct Best {
    minimum: i64,
    score: i64,
    cell: Option<CPos>,
}

impl Best {
    fn new(minimum: i32) -> Self {
        Self {
            minimum: minimum as i64,
            score: 0,
            cell: None,
        }
    }

    fn offer(&mut self, cell: CPos, score: i64) {
        if score <= self.score || score < self.minimum {
            return;
        }
        self.score = score;
        self.cell = Some(cell);
    }
}

/// Per-power rescan waits.
#[derive(Clone, Debug, Default)]
pub struct SupportPowerTargeting {
    /// Keyed by power instance.
    waits: BTreeMap<String, IntervalTimer>,
}

impl SupportPowerTargeting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the power with `key` is waiting out a rescan delay.
    pub fn is_delayed(&self, key: &str) -> bool {
        self.waits.get(key).is_some_and(|t| t.remaining() > 0)
    }

    pub fn tick(&mut self, ctx: &mut BotContext<'_>) {
        let config = ctx.config;
        let powers = ctx.world.support_powers(ctx.player);
        self.waits.retain(|key, _| powers.iter().any(|p| &p.key == key));

        for power in powers {
            if power.disabled {
                continue;
            }

            let wait = self
                .waits
                .entry(power.key.clone())
                .or_insert_with(|| IntervalTimer::new(0));
            let delayed = !wait.tick();
            if !power.ready || delayed {
                continue;
            }

            let Some(decision) = config
                .support_powers
                .iter()
                .find(|d| d.order_name == power.order_name)
            else {
                continue;
            };

            let location = decision
                .find_coarse_location(ctx)
                .and_then(|coarse| decision.find_fine_location(ctx, coarse));

            match location {
                Some(cell) => {
                    bot_debug!(ctx.debug, power = %power.order_name, %cell, "support power target found");
                    wait.delay(FIRED_DELAY);
                    ctx.queue(
                        Order::for_player(Command::SupportPower)
                            .with_item(power.order_name.clone())
                            .with_cell(cell),
                    );
                }
                None => {
                    ctx.debug.decision(&DecisionError::NoValidTarget {
                        purpose: "support power",
                    });
                    wait.delay(decision.next_scan_time(ctx));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    use super::*;
    use crate::debug::BotDebug;
    use crate::geometry::MapSize;
    use crate::test_utils::{BOT, ENEMY, Harness, TestWorld, building, tank};
    use crate::world::{
        ActorId, Economy, ItemInfo, PlayerId, SupportPowerSnapshot, WorldQuery,
    };

    /// Forwards to a [`TestWorld`] and remembers every cell scored by radius.
    struct RecordingWorld<'a> {
        inner: &'a TestWorld,
        scored: RefCell<BTreeSet<CPos>>,
    }

    impl<'a> RecordingWorld<'a> {
        fn new(inner: &'a TestWorld) -> Self {
            Self {
                inner,
                scored: RefCell::new(BTreeSet::new()),
            }
        }

        fn take(&self) -> BTreeSet<CPos> {
            self.scored.take()
        }
    }

    impl WorldQuery for RecordingWorld<'_> {
        fn map_size(&self) -> MapSize {
            self.inner.map_size()
        }

        fn actors(&self) -> Vec<ActorSnapshot> {
            self.inner.actors()
        }

        fn actors_in_circle(&self, center: CPos, radius: WDist) -> Vec<ActorSnapshot> {
            self.scored.borrow_mut().insert(center);
            self.inner.actors_in_circle(center, radius)
        }

        fn stance(&self, of: PlayerId, toward: PlayerId) -> Stance {
            self.inner.stance(of, toward)
        }

        fn live_players(&self) -> Vec<PlayerId> {
            self.inner.live_players()
        }

        fn economy(&self, player: PlayerId) -> Economy {
            self.inner.economy(player)
        }

        fn item_info(&self, name: &str) -> Option<ItemInfo> {
            self.inner.item_info(name)
        }

        fn can_place_building(&self, player: PlayerId, item: &str, cell: CPos) -> bool {
            self.inner.can_place_building(player, item, cell)
        }

        fn is_close_enough_to_base(&self, player: PlayerId, item: &str, cell: CPos) -> bool {
            self.inner.is_close_enough_to_base(player, item, cell)
        }

        fn is_cell_buildable(&self, cell: CPos, producer: &str) -> bool {
            self.inner.is_cell_buildable(cell, producer)
        }

        fn has_resources(&self, cell: CPos) -> bool {
            self.inner.has_resources(cell)
        }

        fn next_resource_cell(&self, harvester: ActorId) -> Option<CPos> {
            self.inner.next_resource_cell(harvester)
        }

        fn support_powers(&self, player: PlayerId) -> Vec<SupportPowerSnapshot> {
            self.inner.support_powers(player)
        }
    }

    fn nuke() -> SupportPowerDecision {
        SupportPowerDecision {
            order_name: "NukePowerInfoOrder".to_owned(),
            minimum_attractiveness: 3000,
            fine_scan_radius: 2,
            coarse_scan_radius: 20,
            minimum_scan_interval: 250,
            maximum_scan_interval: 300,
            considerations: vec![
                Consideration {
                    against: Stance::Enemy,
                    types: vec!["Structure".to_owned()],
                    attractiveness: 1,
                    metric: DecisionMetric::Value,
                    check_radius: 5,
                },
                Consideration {
                    against: Stance::Ally,
                    types: vec!["Structure".to_owned(), "Vehicle".to_owned()],
                    attractiveness: -10,
                    metric: DecisionMetric::Value,
                    check_radius: 7,
                },
            ],
        }
    }

    fn ready_nuke() -> SupportPowerSnapshot {
        SupportPowerSnapshot {
            key: "nuke".to_owned(),
            order_name: "NukePowerInfoOrder".to_owned(),
            ready: true,
            disabled: false,
        }
    }

    fn enemy_structure(id: u32, x: i32, y: i32) -> ActorSnapshot {
        building(id, ENEMY, "fact", x, y)
            .with_target_types(&["Structure"])
            .with_cost(2000)
    }

    #[test]
    fn metrics_scale_attractiveness() {
        let mut harness = Harness::new();
        let ctx = harness.ctx();
        let mut consideration = Consideration {
            against: Stance::Enemy,
            types: vec!["Structure".to_owned()],
            attractiveness: 2,
            metric: DecisionMetric::None,
            check_radius: 5,
        };
        let target = enemy_structure(1, 5, 5).with_health(50, 100);
        assert_eq!(consideration.score(&ctx, &target), 2);

        consideration.metric = DecisionMetric::Value;
        assert_eq!(consideration.score(&ctx, &target), 4000);

        consideration.metric = DecisionMetric::Health;
        assert_eq!(consideration.score(&ctx, &target), 1);

        let own = building(2, BOT, "fact", 5, 5).with_target_types(&["Structure"]);
        assert_eq!(consideration.score(&ctx, &own), 0);
    }

    #[test]
    fn fires_at_a_cluster_of_enemy_structures() {
        let mut harness = Harness::new();
        harness.config.support_powers = vec![nuke()];
        harness.world.powers = vec![ready_nuke()];
        harness.world.spawn(enemy_structure(10, 45, 45));
        harness.world.spawn(enemy_structure(11, 46, 45));

        let mut targeting = SupportPowerTargeting::new();
        targeting.tick(&mut harness.ctx());

        let order = harness.orders.iter().next().unwrap();
        assert_eq!(order.command, Command::SupportPower);
        assert_eq!(order.item.as_deref(), Some("NukePowerInfoOrder"));
        let cell = order.target_cell().unwrap();
        assert!(cell.distance_sq(CPos::new(45, 45)) <= 25);
        assert!(targeting.is_delayed("nuke"));
    }

    #[test]
    fn own_units_nearby_veto_the_strike() {
        let mut harness = Harness::new();
        harness.config.support_powers = vec![nuke()];
        harness.world.powers = vec![ready_nuke()];
        harness.world.spawn(enemy_structure(10, 45, 45));
        for id in 1..=3 {
            harness.world.spawn(
                tank(id, BOT, 44 + id as i32, 46)
                    .with_target_types(&["Vehicle"])
                    .with_cost(800),
            );
        }

        let mut targeting = SupportPowerTargeting::new();
        targeting.tick(&mut harness.ctx());
        assert!(harness.orders.is_empty());
        assert!(targeting.is_delayed("nuke"));
    }

    #[test]
    fn failed_scan_waits_before_rescanning() {
        let mut harness = Harness::new();
        harness.config.support_powers = vec![nuke()];
        harness.world.powers = vec![ready_nuke()];

        let mut targeting = SupportPowerTargeting::new();
        targeting.tick(&mut harness.ctx());
        harness.world.spawn(enemy_structure(10, 45, 45));
        harness.world.spawn(enemy_structure(11, 46, 45));

        let mut waited = 0;
        while harness.orders.is_empty() {
            targeting.tick(&mut harness.ctx());
            waited += 1;
            assert!(waited < 400, "power never fired");
        }
        assert!((250..300).contains(&waited));
    }

    #[test]
    fn fine_scan_stays_within_the_extended_coarse_box() {
        let mut harness = Harness::new();
        for (id, x, y) in [(10, 1, 1), (11, 2, 1), (12, 62, 62), (13, 61, 62)] {
            harness.world.spawn(enemy_structure(id, x, y));
        }
        let decision = nuke();
        let reach = decision.coarse_scan_radius + FINE_SCAN_EXTENSION;

        let world = RecordingWorld::new(&harness.world);
        let map = world.map_size();
        let ctx = BotContext {
            world: &world,
            player: BOT,
            config: &harness.config,
            rng: &mut harness.rng,
            orders: &mut harness.orders,
            debug: BotDebug::new(false, BOT),
            base: harness.base,
            attack_or_flee: &harness.attack_or_flee,
            tick: harness.tick,
        };

        // Both origins sit on a map edge, so part of each fine box is off the map.
        for (origin, per_axis) in [(CPos::ORIGIN, 11), (CPos::new(60, 60), 3)] {
            assert!(decision.find_fine_location(&ctx, origin).is_some());

            let scored = world.take();
            assert_eq!(scored.len(), per_axis * per_axis);
            for cell in scored {
                assert!(map.contains(cell), "{cell:?} is off the map");
                assert!((origin.x - FINE_SCAN_EXTENSION..=origin.x + reach).contains(&cell.x));
                assert!((origin.y - FINE_SCAN_EXTENSION..=origin.y + reach).contains(&cell.y));
            }
        }
    }

    #[test]
    fn powers_without_a_decision_are_ignored() {
        let mut harness = Harness::new();
        harness.world.powers = vec![ready_nuke()];
        harness.world.spawn(enemy_structure(10, 45, 45));

        let mut targeting = SupportPowerTargeting::new();
        targeting.tick(&mut harness.ctx());
        assert!(harness.orders.is_empty());
    }

    #[test]
    fn validation_rejects_inverted_intervals() {
        let mut decision = nuke();
        decision.minimum_scan_interval = 400;
        assert!(matches!(
            decision.validate(),
            Err(ConfigError::InvalidSupportPower { .. })
        ));
        assert!(nuke().validate().is_ok());
    }
}
