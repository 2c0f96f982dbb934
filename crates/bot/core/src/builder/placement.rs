//! Where a finished structure goes.

use super::BuildingType;
use crate::context::{BotContext, closest_to};
use crate::error::DecisionError;
use crate::geometry::{CPos, cells_in_annulus};
use crate::world::ActorCaps;

/// First legal cell for `item` in the annulus `[min_range, max_range]` around `center`.
///
/// Cells are tried nearest-to-`target` first. When `target` is the center itself
/// the order is shuffled instead, so structures do not pile up on one side.
/// With `distance_important` the cell must also be close enough to the base.
pub fn find_pos(
    ctx: &mut BotContext<'_>,
    item: &str,
    center: CPos,
    target: CPos,
    min_range: i32,
    max_range: i32,
    distance_important: bool,
) -> Option<CPos> {
    let mut cells = cells_in_annulus(ctx.world.map_size(), center, min_range, max_range);
    if center != target {
        cells.sort_by_key(|cell| cell.distance_sq(target));
    } else {
        ctx.rng.shuffle(&mut cells);
    }

    cells.into_iter().find(|&cell| {
        ctx.world.can_place_building(ctx.player, item, cell)
            && (!distance_important || ctx.world.is_close_enough_to_base(ctx.player, item, cell))
    })
}

/// Picks a placement cell for `item` according to its [`BuildingType`].
///
/// Never returns a cell the host rejects as illegal for `item`.
pub fn choose_build_location(
    ctx: &mut BotContext<'_>,
    item: &str,
    distance_important: bool,
    kind: BuildingType,
) -> Result<CPos, DecisionError> {
    let config = ctx.config;
    let base_center = ctx.random_base_center();

    let found = match kind {
        BuildingType::Defense => {
            let defense_center = ctx.base.defense;
            let enemy_buildings = ctx
                .world
                .actors()
                .into_iter()
                .filter(|a| a.has(ActorCaps::BUILDING) && ctx.is_enemy(a));
            let target = closest_to(enemy_buildings, defense_center)
                .map_or(base_center, |enemy| enemy.cell);

            find_pos(
                ctx,
                item,
                defense_center,
                target,
                config.minimum_defense_radius,
                config.maximum_defense_radius,
                distance_important,
            )
        }
        BuildingType::Refinery => {
            let mut resources: Vec<CPos> = cells_in_annulus(
                ctx.world.map_size(),
                base_center,
                config.min_base_radius,
                config.max_base_radius,
            )
            .into_iter()
            .filter(|&cell| ctx.world.has_resources(cell))
            .collect();
            ctx.rng.shuffle(&mut resources);
            resources.truncate(config.max_resource_cells_to_check);

            resources
                .into_iter()
                .find_map(|resource| {
                    find_pos(
                        ctx,
                        item,
                        base_center,
                        resource,
                        config.min_base_radius,
                        config.max_base_radius,
                        distance_important,
                    )
                })
                .or_else(|| {
                    find_pos(
                        ctx,
                        item,
                        base_center,
                        base_center,
                        config.min_base_radius,
                        config.max_base_radius,
                        distance_important,
                    )
                })
        }
        BuildingType::Building => {
            let max_range = if distance_important {
                config.max_base_radius
            } else {
                ctx.world.map_size().max_search_range()
            };
            find_pos(
                ctx,
                item,
                base_center,
                base_center,
                config.min_base_radius,
                max_range,
                distance_important,
            )
        }
    };

    found.ok_or_else(|| DecisionError::NoValidLocation {
        item: item.to_owned(),
        center: base_center,
    })
}
