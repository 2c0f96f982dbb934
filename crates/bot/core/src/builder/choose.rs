//! Which structure to start next.

use super::BaseBuilder;
use crate::bot_debug;
use crate::context::BotContext;
use crate::world::{Economy, ItemInfo, QueueSnapshot};

/// How [`BaseBuilder::producible`] chooses among candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pick {
    MostPower,
    Random,
}

impl BaseBuilder {
    /// Picks the next structure for `queue`, or `None` to leave it idle this pass.
    ///
    /// Priorities, first match wins: power when short on it, refineries until the
    /// economy is adequate, production when cash piles up, silos when storage is
    /// nearly full, then whichever fraction of the base is furthest below its share.
    pub(super) fn choose_building_to_build(
        &self,
        ctx: &mut BotContext<'_>,
        queue: &QueueSnapshot,
    ) -> Option<String> {
        let config = ctx.config;
        let names = &config.common_names;
        let economy = ctx.world.economy(ctx.player);
        let power = self.producible(ctx, queue, &names.power, Pick::MostPower);

        if economy.excess_power() < self.minimum_excess_power && !economy.outage_active() {
            if let Some(power) = power.as_ref().filter(|p| p.power > 0) {
                bot_debug!(ctx.debug, item = %power.name, "low power, building power plant");
                return Some(power.name.clone());
            }
        }

        if !self.has_adequate_refinery_count(ctx) {
            if let Some(choice) =
                self.with_power_fallback(ctx, queue, &names.refinery, power.as_ref(), &economy)
            {
                bot_debug!(ctx.debug, item = %choice, "building refinery");
                return Some(choice);
            }
        }

        if config.new_production_cash_threshold > 0
            && economy.treasury() > config.new_production_cash_threshold
        {
            if let Some(choice) =
                self.with_power_fallback(ctx, queue, &names.production, power.as_ref(), &economy)
            {
                bot_debug!(ctx.debug, item = %choice, "spending surplus cash on production");
                return Some(choice);
            }
        }

        if economy.storage_alert() {
            if let Some(choice) =
                self.with_power_fallback(ctx, queue, &names.silo, power.as_ref(), &economy)
            {
                bot_debug!(ctx.debug, item = %choice, "storage nearly full, building silo");
                return Some(choice);
            }
        }

        let mut fractions: Vec<(&String, u32)> = config
            .building_fractions
            .iter()
            .map(|(name, fraction)| (name, *fraction))
            .collect();
        ctx.rng.shuffle(&mut fractions);

        let total = self.player_buildings.len();
        for (name, fraction) in fractions {
            if config
                .building_delays
                .get(name)
                .is_some_and(|&earliest| earliest > ctx.tick)
            {
                continue;
            }
            if !queue.can_build(name) {
                continue;
            }

            let count = self.count_buildings(name);
            if count * 100 > fraction as usize * total {
                continue;
            }
            if config
                .building_limits
                .get(name)
                .is_some_and(|&limit| limit as usize <= count)
            {
                continue;
            }

            let info = ctx
                .world
                .item_info(name)
                .unwrap_or_else(|| ItemInfo::new(name.as_str()));
            if economy.excess_power() < self.minimum_excess_power
                || !has_sufficient_power(ctx, &info, &economy)
            {
                if economy.outage_active() {
                    bot_debug!(ctx.debug, item = %name, "power outage, holding production");
                    return None;
                }
                if let Some(power) = power.as_ref().filter(|p| p.power > 0) {
                    bot_debug!(ctx.debug, item = %name, power = %power.name, "building power first");
                    return Some(power.name.clone());
                }
            }

            bot_debug!(ctx.debug, item = %name, count, total, "building toward fraction");
            return Some(name.clone());
        }

        None
    }

    /// A random candidate from `names`, swapped for `power` if it would drain the grid.
    fn with_power_fallback(
        &self,
        ctx: &mut BotContext<'_>,
        queue: &QueueSnapshot,
        names: &[String],
        power: Option<&ItemInfo>,
        economy: &Economy,
    ) -> Option<String> {
        let item = self.producible(ctx, queue, names, Pick::Random)?;
        if has_sufficient_power(ctx, &item, economy) {
            return Some(item.name);
        }
        power.map(|p| p.name.clone())
    }

    /// Buildable members of `names` that are still under their limit.
    fn producible(
        &self,
        ctx: &mut BotContext<'_>,
        queue: &QueueSnapshot,
        names: &[String],
        pick: Pick,
    ) -> Option<ItemInfo> {
        let limits = &ctx.config.building_limits;
        let available: Vec<ItemInfo> = queue
            .buildable
            .iter()
            .filter(|item| names.contains(item))
            .filter(|item| {
                limits
                    .get(*item)
                    .is_none_or(|&limit| self.count_buildings(item) < limit as usize)
            })
            .map(|item| {
                ctx.world
                    .item_info(item)
                    .unwrap_or_else(|| ItemInfo::new(item.as_str()))
            })
            .collect();

        match pick {
            // Ties go to the first candidate.
            Pick::MostPower => available
                .into_iter()
                .reduce(|best, item| if item.power > best.power { item } else { best }),
            Pick::Random => ctx.rng.pick(&available).cloned(),
        }
    }

    fn count_buildings(&self, name: &str) -> usize {
        self.player_buildings
            .iter()
            .filter(|b| b.kind == name)
            .count()
    }

    /// Enough refineries for the current stage of the base.
    ///
    /// Also true while there is nothing to feed them: no power plant or no
    /// construction yard yet.
    pub(super) fn has_adequate_refinery_count(&self, ctx: &BotContext<'_>) -> bool {
        let config = ctx.config;
        let names = &config.common_names;
        if names.refinery.is_empty() {
            return true;
        }

        let barracks = ctx.count_owned(&names.barracks);
        let required = config.initial_minimum_refinery_count
            + if barracks > 0 {
                config.additional_minimum_refinery_count
            } else {
                0
            };

        ctx.count_owned(&names.refinery) >= required as usize
            || ctx.count_owned(&names.power) == 0
            || ctx.count_owned(&names.construction_yard) == 0
    }
}

fn has_sufficient_power(ctx: &BotContext<'_>, item: &ItemInfo, economy: &Economy) -> bool {
    item.power + economy.excess_power() >= ctx.config.minimum_excess_power
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{BOT, Harness, building};
    use crate::world::{ActorCaps, ActorId};

    fn queue(buildable: &[&str]) -> QueueSnapshot {
        QueueSnapshot {
            actor: ActorId(100),
            category: "Building".to_owned(),
            enabled: true,
            buildable: buildable.iter().map(|b| (*b).to_owned()).collect(),
            current: None,
        }
    }

    /// Yard, power plant and refinery: past the early-game priorities.
    fn established_base() -> Harness {
        let mut harness = Harness::new();
        harness.world.spawn(
            building(1, BOT, "fact", 20, 20)
                .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::BASE_PROVIDER),
        );
        harness.world.spawn(building(2, BOT, "powr", 22, 20));
        harness.world.spawn(building(3, BOT, "proc", 24, 20));
        harness.world.add_item(ItemInfo::new("powr").with_power(100));
        harness.world.add_item(ItemInfo::new("proc").with_power(-30));
        harness.world.add_item(ItemInfo::new("barr").with_power(-20));
        harness.world.add_item(ItemInfo::new("weap").with_power(-30));
        harness.world.add_item(ItemInfo::new("silo").with_power(-10));
        harness.world.economy.power_provided = 200;
        harness.world.economy.power_drained = 50;
        harness
    }

    fn builder_for(harness: &mut Harness) -> BaseBuilder {
        let mut builder = BaseBuilder::new("Building", &harness.config);
        builder.player_buildings = harness.ctx().own_buildings();
        builder
    }

    #[test]
    fn refinery_is_adequate_until_barracks_exist() {
        let mut harness = established_base();
        let builder = builder_for(&mut harness);
        assert!(builder.has_adequate_refinery_count(&harness.ctx()));

        harness.world.spawn(building(4, BOT, "barr", 26, 20));
        assert!(!builder.has_adequate_refinery_count(&harness.ctx()));
    }

    #[test]
    fn refinery_without_power_plant_is_not_required() {
        let mut harness = Harness::new();
        harness.world.spawn(building(1, BOT, "fact", 20, 20));
        let builder = builder_for(&mut harness);
        assert!(builder.has_adequate_refinery_count(&harness.ctx()));
    }

    #[test]
    fn missing_refinery_takes_priority() {
        let mut harness = established_base();
        harness.world.spawn(building(4, BOT, "barr", 26, 20));
        let builder = builder_for(&mut harness);

        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["proc", "barr"]));
        assert_eq!(choice.as_deref(), Some("proc"));
    }

    #[test]
    fn refinery_swapped_for_power_when_grid_is_drained() {
        let mut harness = established_base();
        harness.world.spawn(building(4, BOT, "barr", 26, 20));
        harness.world.economy.power_provided = 60;
        harness.world.economy.power_drained = 50;
        let builder = builder_for(&mut harness);

        let choice =
            builder.choose_building_to_build(&mut harness.ctx(), &queue(&["proc", "powr", "barr"]));
        assert_eq!(choice.as_deref(), Some("powr"));
    }

    #[test]
    fn surplus_cash_goes_into_production() {
        let mut harness = established_base();
        harness.world.economy.cash = 6000;
        harness.config.common_names.production = vec!["weap".to_owned()];
        let builder = builder_for(&mut harness);

        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["weap", "silo"]));
        assert_eq!(choice.as_deref(), Some("weap"));
    }

    #[test]
    fn full_storage_asks_for_a_silo() {
        let mut harness = established_base();
        harness.world.economy.resources = 900;
        harness.world.economy.resource_capacity = 1000;
        harness.config.new_production_cash_threshold = 0;
        let builder = builder_for(&mut harness);

        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["silo", "barr"]));
        assert_eq!(choice.as_deref(), Some("silo"));
    }

    #[test]
    fn fractions_respect_limits_and_delays() {
        let mut harness = established_base();
        harness.config.new_production_cash_threshold = 0;
        harness.config.building_fractions = [("barr".to_owned(), 50), ("weap".to_owned(), 50)]
            .into_iter()
            .collect();
        harness.config.building_limits = [("barr".to_owned(), 0)].into_iter().collect();
        harness.config.building_delays = [("weap".to_owned(), 100)].into_iter().collect();
        let builder = builder_for(&mut harness);

        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["barr", "weap"]));
        assert_eq!(choice, None);

        harness.tick = 100;
        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["barr", "weap"]));
        assert_eq!(choice.as_deref(), Some("weap"));
    }

    #[test]
    fn outage_holds_power_hungry_structures() {
        let mut harness = established_base();
        harness.config.new_production_cash_threshold = 0;
        harness.config.building_fractions = [("weap".to_owned(), 50)].into_iter().collect();
        harness.world.economy.power_provided = 10;
        harness.world.economy.power_drained = 50;
        harness.world.economy.power_outage_ticks = 200;
        let builder = builder_for(&mut harness);

        let choice = builder.choose_building_to_build(&mut harness.ctx(), &queue(&["weap", "powr"]));
        assert_eq!(choice, None);
    }

    #[test]
    fn strongest_power_plant_wins_ties_by_order() {
        let mut harness = established_base();
        harness.world.add_item(ItemInfo::new("apwr").with_power(100));
        let builder = builder_for(&mut harness);
        let names = vec!["powr".to_owned(), "apwr".to_owned()];

        let best = builder
            .producible(&mut harness.ctx(), &queue(&["apwr", "powr"]), &names, Pick::MostPower)
            .unwrap();
        assert_eq!(best.name, "apwr");
    }
}
