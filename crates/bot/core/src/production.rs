//! Unit production.
//!
//! Runs every `feedback_time` ticks. While few units idle at the base the bot
//! builds whatever its queues offer; once enough are around it builds toward the
//! army composition in `units_to_build`.

use crate::bot_debug;
use crate::context::BotContext;
use crate::order::{Command, Order};
use crate::world::{ActorCaps, ProductionQueues, QueueSnapshot};

/// How a unit is picked from a free queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Choice {
    Random,
    ByFraction,
}

/// One production pass over every unit queue.
///
/// `hanging_around_base` is the number of units currently idling at the base.
pub fn run(ctx: &mut BotContext<'_>, queues: &dyn ProductionQueues, hanging_around_base: usize) {
    let config = ctx.config;
    let names = &config.common_names;

    // Stop building until the economy is restored.
    if !has_adequate_refinery(ctx) {
        return;
    }

    let lost_yard = ctx.count_owned(&names.construction_yard) == 0
        && ctx.count_owned(&names.vehicles_factory) > 0;
    if lost_yard && !ctx.own_actors().iter().any(|a| a.is_undeployed_base_builder()) {
        if let Some(mcv) = ctx.rng.pick(&names.mcv).cloned() {
            if let Some(queue) = free_queue(ctx, queues, &config.vehicle_queue) {
                bot_debug!(ctx.debug, item = %mcv, "no construction yard left, requesting a new one");
                ctx.queue(Order::new(Command::StartProduction, queue.actor).with_item(mcv));
            }
        }
    }

    let choice = if hanging_around_base < config.idle_base_units_maximum as usize {
        Choice::Random
    } else {
        Choice::ByFraction
    };
    for category in &config.unit_queues {
        build_unit(ctx, queues, category, choice);
    }
}

/// At least one refinery, unless there is no power to run one.
fn has_adequate_refinery(ctx: &BotContext<'_>) -> bool {
    let names = &ctx.config.common_names;
    ctx.count_owned(&names.refinery) > 0 || ctx.count_owned(&names.power) == 0
}

fn free_queue(
    ctx: &BotContext<'_>,
    queues: &dyn ProductionQueues,
    category: &str,
) -> Option<QueueSnapshot> {
    queues
        .queues(ctx.player, category)
        .into_iter()
        .find(|q| q.enabled && q.current.is_none())
}

fn build_unit(
    ctx: &mut BotContext<'_>,
    queues: &dyn ProductionQueues,
    category: &str,
    choice: Choice,
) {
    let Some(queue) = free_queue(ctx, queues, category) else {
        return;
    };

    let unit = match choice {
        Choice::Random => ctx.rng.pick(&queue.buildable).cloned(),
        Choice::ByFraction => choose_by_fraction(ctx, &queue),
    };
    let Some(unit) = unit else {
        return;
    };

    let config = ctx.config;
    if !config.units_to_build.contains_key(&unit) {
        return;
    }
    if let Some(&limit) = config.unit_limits.get(&unit) {
        if ctx.count_owned(std::slice::from_ref(&unit)) >= limit as usize {
            return;
        }
    }

    bot_debug!(ctx.debug, %category, item = %unit, "starting unit production");
    ctx.queue(Order::new(Command::StartProduction, queue.actor).with_item(unit));
}

/// First shuffled entry of `units_to_build` still below its share of the army.
fn choose_by_fraction(ctx: &mut BotContext<'_>, queue: &QueueSnapshot) -> Option<String> {
    let army: Vec<String> = ctx
        .own_actors()
        .into_iter()
        .filter(|a| a.has(ActorCaps::MOBILE))
        .map(|a| a.kind)
        .collect();

    let mut wanted: Vec<(&String, u32)> = ctx
        .config
        .units_to_build
        .iter()
        .map(|(name, fraction)| (name, *fraction))
        .collect();
    ctx.rng.shuffle(&mut wanted);

    wanted
        .into_iter()
        .filter(|(name, _)| queue.can_build(name))
        .find(|(name, fraction)| {
            let count = army.iter().filter(|kind| kind == name).count();
            count * 100 < *fraction as usize * army.len()
        })
        .map(|(name, _)| name.clone())
}
