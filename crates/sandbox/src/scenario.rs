//! Starting positions for a sandbox match.
//!
//! A scenario says which map size to use and where to place actors, resources
//! and impassable cells. The ruleset stays separate so the same layout can be
//! played with different actor templates.

use bot_core::{CPos, MapSize, PlayerId};

use crate::error::Result;
use crate::rules::Ruleset;
use crate::world::SandboxWorld;

/// One actor placed at match start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub owner: PlayerId,
    pub kind: String,
    pub cell: CPos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub map: MapSize,
    pub players: Vec<PlayerId>,
    pub starting_cash: i32,
    pub placements: Vec<Placement>,
    pub resources: Vec<CPos>,
    pub blocked: Vec<CPos>,
}

impl Scenario {
    pub fn new(map: MapSize) -> Self {
        Self {
            map,
            players: Vec::new(),
            starting_cash: 5000,
            placements: Vec::new(),
            resources: Vec::new(),
            blocked: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.players.push(player);
        self
    }

    #[must_use]
    pub fn place(mut self, owner: PlayerId, kind: &str, cell: CPos) -> Self {
        self.placements.push(Placement {
            owner,
            kind: kind.to_owned(),
            cell,
        });
        self
    }

    /// Adds a `size` x `size` resource field with `corner` as its top-left cell.
    #[must_use]
    pub fn resource_field(mut self, corner: CPos, size: i32) -> Self {
        for dy in 0..size {
            for dx in 0..size {
                self.resources.push(CPos::new(corner.x + dx, corner.y + dy));
            }
        }
        self
    }

    /// Two players in opposite corners of a 96x96 map, each with a construction
    /// vehicle and a resource field, split by a rock ridge with two gaps.
    pub fn two_player() -> Self {
        let (p1, p2) = (PlayerId(1), PlayerId(2));
        let mut scenario = Self::new(MapSize::new(96, 96))
            .with_player(p1)
            .with_player(p2)
            .place(p1, "mcv", CPos::new(16, 16))
            .place(p2, "mcv", CPos::new(79, 79))
            .resource_field(CPos::new(26, 10), 5)
            .resource_field(CPos::new(65, 81), 5);

        for i in 0..96 {
            let gap = (28..34).contains(&i) || (62..68).contains(&i);
            if !gap {
                scenario.blocked.push(CPos::new(i, 95 - i));
            }
        }
        scenario
    }

    /// Builds the world this scenario describes.
    pub fn create_world(&self, rules: Ruleset) -> Result<SandboxWorld> {
        let mut world = SandboxWorld::new(self.map, rules);
        for &player in &self.players {
            world.add_player(player, self.starting_cash);
        }
        for &cell in &self.resources {
            world.add_resource(cell);
        }
        for &cell in &self.blocked {
            world.block(cell);
        }

        tracing::info!(
            target: "sandbox",
            players = self.players.len(),
            placements = self.placements.len(),
            "creating world from scenario"
        );
        for placement in &self.placements {
            world.spawn(placement.owner, &placement.kind, placement.cell)?;
        }
        Ok(world)
    }
}
