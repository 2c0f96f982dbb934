use bitflags::bitflags;

use crate::geometry::CPos;

/// Host handle of an actor. Only meaningful while the actor exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

/// Diplomatic relation of one player toward another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Stance {
    Ally,
    Neutral,
    Enemy,
}

bitflags! {
    /// Capabilities of an actor as far as the bot cares.
    ///
    /// A deployed construction yard carries `BUILDING | BASE_BUILDING | BASE_PROVIDER`;
    /// the mobile vehicle that deploys into it carries `MOBILE | BASE_BUILDING`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActorCaps: u16 {
        const BUILDING      = 1 << 0;
        const BASE_BUILDING = 1 << 1;
        const BASE_PROVIDER = 1 << 2;
        const MOBILE        = 1 << 3;
        const ARMED         = 1 << 4;
        const AIRCRAFT      = 1 << 5;
        const HARVESTER     = 1 << 6;
        const ANTI_AIR      = 1 << 7;
        const RALLY_POINT   = 1 << 8;
        const REPAIRABLE    = 1 << 9;
        const TARGETABLE    = 1 << 10;
    }
}

/// What an actor is doing right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
pub enum ActivityKind {
    #[default]
    Idle,
    /// Idle in all but name; harvesters park in this state between fields.
    Waiting,
    Moving,
    Attacking,
    Harvesting,
    Rearming,
    Other,
}

/// Health bracket derived from hit points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DamageState {
    Undamaged,
    Light,
    Medium,
    Heavy,
    Critical,
    Dead,
}

impl DamageState {
    pub fn from_health(hp: i32, max_hp: i32) -> Self {
        let hp = hp as i64;
        let max = max_hp as i64;
        if hp <= 0 {
            Self::Dead
        } else if hp * 100 < max * 25 {
            Self::Critical
        } else if hp * 100 < max * 50 {
            Self::Heavy
        } else if hp * 100 < max * 75 {
            Self::Medium
        } else if hp >= max {
            Self::Undamaged
        } else {
            Self::Light
        }
    }
}

/// Limited ammunition carried by aircraft.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmmoPool {
    pub current: u32,
    pub max: u32,
    /// Refills without returning to a rearm building.
    pub self_reloads: bool,
}

/// Read-only view of one actor at the current tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub owner: PlayerId,
    /// Rules name of the actor type, e.g. `powr`.
    pub kind: String,
    pub cell: CPos,
    pub caps: ActorCaps,
    pub hp: i32,
    /// Zero for actors without health.
    pub max_hp: i32,
    /// Damage rating used when comparing forces.
    pub damage: i32,
    pub speed: i32,
    pub cost: i32,
    pub activity: ActivityKind,
    pub target_types: Vec<String>,
    pub ammo: Option<AmmoPool>,
    pub harvester_empty: bool,
    pub rally_point: Option<CPos>,
    pub repairing: bool,
    /// Actor type this one deploys into, if any.
    pub transforms_into: Option<String>,
}

impl ActorSnapshot {
    /// Creates an idle, targetable actor with no other capabilities.
    pub fn new(id: ActorId, owner: PlayerId, kind: impl Into<String>, cell: CPos) -> Self {
        Self {
            id,
            owner,
            kind: kind.into(),
            cell,
            caps: ActorCaps::TARGETABLE,
            hp: 0,
            max_hp: 0,
            damage: 0,
            speed: 0,
            cost: 0,
            activity: ActivityKind::Idle,
            target_types: Vec::new(),
            ammo: None,
            harvester_empty: false,
            rally_point: None,
            repairing: false,
            transforms_into: None,
        }
    }

    #[must_use]
    pub fn with_caps(mut self, caps: ActorCaps) -> Self {
        self.caps |= caps;
        self
    }

    #[must_use]
    pub fn with_health(mut self, hp: i32, max_hp: i32) -> Self {
        self.hp = hp;
        self.max_hp = max_hp;
        self
    }

    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: i32) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_activity(mut self, activity: ActivityKind) -> Self {
        self.activity = activity;
        self
    }

    #[must_use]
    pub fn with_target_types(mut self, types: &[&str]) -> Self {
        self.target_types = types.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_ammo(mut self, ammo: AmmoPool) -> Self {
        self.ammo = Some(ammo);
        self
    }

    #[must_use]
    pub fn transforms_into(mut self, kind: impl Into<String>) -> Self {
        self.transforms_into = Some(kind.into());
        self
    }

    pub fn has(&self, caps: ActorCaps) -> bool {
        self.caps.contains(caps)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.activity, ActivityKind::Idle | ActivityKind::Waiting)
    }

    pub fn is_attacking(&self) -> bool {
        self.activity == ActivityKind::Attacking
    }

    /// A construction vehicle that has not deployed yet.
    pub fn is_undeployed_base_builder(&self) -> bool {
        self.has(ActorCaps::BASE_BUILDING | ActorCaps::MOBILE)
    }

    /// A deployed construction yard.
    pub fn is_base_center(&self) -> bool {
        self.has(ActorCaps::BASE_BUILDING) && !self.has(ActorCaps::MOBILE)
    }

    pub fn damage_state(&self) -> DamageState {
        DamageState::from_health(self.hp, self.max_hp)
    }

    /// Ammunition is unlimited or refills by itself.
    pub fn reloads_automatically(&self) -> bool {
        self.ammo.is_none_or(|ammo| ammo.self_reloads)
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo.is_none_or(|ammo| ammo.current > 0)
    }

    pub fn full_ammo(&self) -> bool {
        self.ammo.is_none_or(|ammo| ammo.current >= ammo.max)
    }
}

/// Notification that one of the bot's actors took damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageEvent {
    pub victim: ActorId,
    pub attacker: Option<ActorId>,
    pub damage: i32,
    /// Victim hit points before this hit.
    pub previous_hp: i32,
}

/// Player economy at the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Economy {
    pub cash: i32,
    /// Harvested resources held in storage.
    pub resources: i32,
    pub resource_capacity: i32,
    pub power_provided: i32,
    pub power_drained: i32,
    pub power_outage_ticks: u32,
}

impl Economy {
    pub fn excess_power(&self) -> i32 {
        self.power_provided - self.power_drained
    }

    pub fn outage_active(&self) -> bool {
        self.power_outage_ticks > 0
    }

    pub fn treasury(&self) -> i32 {
        self.cash + self.resources
    }

    /// Storage is more than 80% full.
    pub fn storage_alert(&self) -> bool {
        self.resources as i64 * 10 > self.resource_capacity as i64 * 8
    }
}

/// Rules information about a producible actor type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemInfo {
    pub name: String,
    /// Power generated (positive) or consumed (negative) once built.
    pub power: i32,
    pub armed: bool,
    pub aircraft: bool,
    pub cost: i32,
}

impl ItemInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn armed(mut self) -> Self {
        self.armed = true;
        self
    }

    #[must_use]
    pub fn aircraft(mut self) -> Self {
        self.aircraft = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedItem {
    pub item: String,
    pub done: bool,
}

/// One production queue of the bot's player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Actor hosting the queue; production orders are addressed to it.
    pub actor: ActorId,
    pub category: String,
    pub enabled: bool,
    pub buildable: Vec<String>,
    /// First item in the queue.
    pub current: Option<QueuedItem>,
}

impl QueueSnapshot {
    pub fn can_build(&self, item: &str) -> bool {
        self.buildable.iter().any(|b| b == item)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportPowerSnapshot {
    /// Unique key of this power instance.
    pub key: String,
    pub order_name: String,
    pub ready: bool,
    pub disabled: bool,
}
