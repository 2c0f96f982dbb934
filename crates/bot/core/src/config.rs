use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::support_power::SupportPowerDecision;

/// Actor type names grouped by the role the bot gives them.
///
/// The bot never hardcodes a type name; it asks "how many refineries do I own" by
/// counting actors whose type is listed in [`CommonNames::refinery`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CommonNames {
    /// Mobile construction vehicles.
    pub mcv: Vec<String>,
    pub construction_yard: Vec<String>,
    pub refinery: Vec<String>,
    pub power: Vec<String>,
    pub barracks: Vec<String>,
    pub vehicles_factory: Vec<String>,
    /// Structures that produce units; built to spend surplus cash.
    pub production: Vec<String>,
    pub silo: Vec<String>,
}

impl CommonNames {
    pub fn contains(&self, name: &str) -> bool {
        [
            &self.mcv,
            &self.construction_yard,
            &self.refinery,
            &self.power,
            &self.barracks,
            &self.vehicles_factory,
            &self.production,
            &self.silo,
        ]
        .iter()
        .any(|group| group.iter().any(|n| n == name))
    }
}

impl Default for CommonNames {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|n| (*n).to_owned()).collect()
        }

        Self {
            mcv: names(&["mcv"]),
            construction_yard: names(&["fact"]),
            refinery: names(&["proc"]),
            power: names(&["powr", "apwr"]),
            barracks: names(&["barr", "tent"]),
            vehicles_factory: names(&["weap"]),
            production: names(&["barr", "tent", "weap"]),
            silo: names(&["silo"]),
        }
    }
}

/// Tunables of one bot difficulty.
///
/// Supplied once at activation and never mutated. Radii are in cells, intervals and
/// delays in ticks, fractions in percent of the relevant total.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BotConfig {
    /// Display name of the difficulty.
    pub name: String,
    /// Enables the `bot` tracing target for this instance.
    pub debug: bool,

    // ===== squads =====
    pub squad_size: u32,
    pub squad_size_random_bonus: u32,
    pub assign_roles_interval: u32,
    pub rush_interval: u32,
    pub attack_force_interval: u32,
    pub minimum_attack_force_delay: u32,
    pub idle_base_units_maximum: u32,
    pub rush_attack_scan_radius: i32,
    pub protect_unit_scan_radius: i32,
    pub idle_scan_radius: i32,
    pub attack_scan_radius: i32,
    pub danger_scan_radius: i32,
    pub protection_scan_radius: i32,

    // ===== scheduling =====
    /// Ticks between unit production passes.
    pub feedback_time: u32,
    pub min_order_quotient_per_tick: u32,
    /// Lockstep order latency of the session, in ticks.
    pub order_latency: u32,

    // ===== base building =====
    pub building_queues: Vec<String>,
    pub defense_queues: Vec<String>,
    pub unit_queues: Vec<String>,
    /// Queue asked for a replacement construction vehicle.
    pub vehicle_queue: String,
    pub minimum_excess_power: i32,
    /// Cap for the scaled minimum excess power; `0` turns scaling off.
    pub maximum_excess_power: i32,
    pub excess_power_increment: i32,
    pub excess_power_increase_threshold: i32,
    pub new_production_cash_threshold: i32,
    pub initial_minimum_refinery_count: u32,
    pub additional_minimum_refinery_count: u32,
    pub structure_production_inactive_delay: u32,
    pub structure_production_active_delay: u32,
    pub structure_production_random_bonus_delay: u32,
    pub structure_production_resume_delay: u32,
    pub maximum_failed_placement_attempts: u32,
    pub min_base_radius: i32,
    pub max_base_radius: i32,
    pub minimum_defense_radius: i32,
    pub maximum_defense_radius: i32,
    pub max_resource_cells_to_check: usize,
    pub rally_point_scan_radius: i32,
    pub should_repair_buildings: bool,

    // ===== tables =====
    pub common_names: CommonNames,
    pub building_fractions: BTreeMap<String, u32>,
    pub building_limits: BTreeMap<String, u32>,
    /// Earliest tick at which a structure may be chosen.
    pub building_delays: BTreeMap<String, u64>,
    pub units_to_build: BTreeMap<String, u32>,
    pub unit_limits: BTreeMap<String, u32>,
    pub support_powers: Vec<SupportPowerDecision>,
}

impl BotConfig {
    pub const DEFAULT_SQUAD_SIZE: u32 = 8;
    pub const DEFAULT_FEEDBACK_TIME: u32 = 30;
    pub const DEFAULT_RUSH_INTERVAL: u32 = 600;
    pub const DEFAULT_ASSIGN_ROLES_INTERVAL: u32 = 20;
    pub const DEFAULT_ATTACK_FORCE_INTERVAL: u32 = 30;
    pub const DEFAULT_MIN_ORDER_QUOTIENT_PER_TICK: u32 = 5;

    pub fn new() -> Self {
        fn table(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
            entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
        }
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|n| (*n).to_owned()).collect()
        }

        Self {
            name: "Normal AI".to_owned(),
            debug: false,

            squad_size: Self::DEFAULT_SQUAD_SIZE,
            squad_size_random_bonus: 30,
            assign_roles_interval: Self::DEFAULT_ASSIGN_ROLES_INTERVAL,
            rush_interval: Self::DEFAULT_RUSH_INTERVAL,
            attack_force_interval: Self::DEFAULT_ATTACK_FORCE_INTERVAL,
            minimum_attack_force_delay: 0,
            idle_base_units_maximum: 12,
            rush_attack_scan_radius: 15,
            protect_unit_scan_radius: 15,
            idle_scan_radius: 10,
            attack_scan_radius: 12,
            danger_scan_radius: 10,
            protection_scan_radius: 8,

            feedback_time: Self::DEFAULT_FEEDBACK_TIME,
            min_order_quotient_per_tick: Self::DEFAULT_MIN_ORDER_QUOTIENT_PER_TICK,
            order_latency: 1,

            building_queues: names(&["Building"]),
            defense_queues: names(&["Defense"]),
            unit_queues: names(&["Vehicle", "Infantry", "Plane", "Ship", "Aircraft"]),
            vehicle_queue: "Vehicle".to_owned(),
            minimum_excess_power: 0,
            maximum_excess_power: 0,
            excess_power_increment: 0,
            excess_power_increase_threshold: 1,
            new_production_cash_threshold: 5000,
            initial_minimum_refinery_count: 1,
            additional_minimum_refinery_count: 1,
            structure_production_inactive_delay: 125,
            structure_production_active_delay: 10,
            structure_production_random_bonus_delay: 10,
            structure_production_resume_delay: 1500,
            maximum_failed_placement_attempts: 3,
            min_base_radius: 2,
            max_base_radius: 20,
            minimum_defense_radius: 5,
            maximum_defense_radius: 20,
            max_resource_cells_to_check: 3,
            rally_point_scan_radius: 8,
            should_repair_buildings: true,

            common_names: CommonNames::default(),
            building_fractions: table(&[
                ("proc", 20),
                ("powr", 25),
                ("barr", 10),
                ("tent", 10),
                ("weap", 15),
                ("dome", 5),
                ("pbox", 5),
                ("gun", 5),
                ("ftur", 5),
                ("agun", 5),
            ]),
            building_limits: table(&[("barr", 7), ("tent", 7), ("dome", 1), ("weap", 4)]),
            building_delays: BTreeMap::new(),
            units_to_build: table(&[
                ("e1", 30),
                ("e3", 15),
                ("harv", 10),
                ("1tnk", 15),
                ("2tnk", 20),
                ("arty", 5),
                ("jeep", 5),
            ]),
            unit_limits: table(&[("harv", 8)]),
            support_powers: Vec::new(),
        }
    }

    /// Checks everything the bot relies on at runtime.
    ///
    /// This is the only place where bad tunables are rejected; once activated, the bot
    /// never fails a tick because of its configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = &self.common_names;
        for (group, list) in [
            ("mcv", &names.mcv),
            ("construction_yard", &names.construction_yard),
            ("refinery", &names.refinery),
            ("power", &names.power),
        ] {
            if list.is_empty() {
                return Err(ConfigError::MissingCommonName(group));
            }
        }

        if self.building_queues.is_empty() {
            return Err(ConfigError::EmptyQueueList("building_queues"));
        }

        for (field, value) in [
            ("squad_size", self.squad_size),
            ("assign_roles_interval", self.assign_roles_interval),
            ("rush_interval", self.rush_interval),
            ("attack_force_interval", self.attack_force_interval),
            ("feedback_time", self.feedback_time),
            ("min_order_quotient_per_tick", self.min_order_quotient_per_tick),
            (
                "maximum_failed_placement_attempts",
                self.maximum_failed_placement_attempts,
            ),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(field));
            }
        }

        for (field, min, max) in [
            (
                "base_radius",
                self.min_base_radius as i64,
                self.max_base_radius as i64,
            ),
            (
                "defense_radius",
                self.minimum_defense_radius as i64,
                self.maximum_defense_radius as i64,
            ),
        ] {
            if min > max {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }

        if self.maximum_excess_power != 0 && self.minimum_excess_power > self.maximum_excess_power
        {
            return Err(ConfigError::InvertedRange {
                field: "excess_power",
                min: self.minimum_excess_power as i64,
                max: self.maximum_excess_power as i64,
            });
        }

        for name in self.building_limits.keys() {
            if !self.building_fractions.contains_key(name) && !names.contains(name) {
                return Err(ConfigError::UnknownName {
                    table: "building_limits",
                    name: name.clone(),
                });
            }
        }

        for name in self.unit_limits.keys() {
            if !self.units_to_build.contains_key(name) {
                return Err(ConfigError::UnknownName {
                    table: "unit_limits",
                    name: name.clone(),
                });
            }
        }

        for decision in &self.support_powers {
            decision.validate()?;
        }

        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self::new()
    }
}
