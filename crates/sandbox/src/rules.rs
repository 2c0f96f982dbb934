//! Actor templates and production queue rules of the sandbox.

use std::collections::BTreeMap;

use bot_core::{ActorCaps, ActorId, ActorSnapshot, CPos, ItemInfo, PlayerId};

/// Everything the sandbox knows about one actor type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorTemplate {
    pub name: String,
    pub caps: ActorCaps,
    pub hp: i32,
    pub damage: i32,
    pub speed: i32,
    pub cost: i32,
    /// Power generated (positive) or consumed (negative).
    pub power: i32,
    /// Queue category producing this type, if any.
    pub queue: Option<String>,
    /// The player must own at least one of these to produce it.
    pub prerequisites: Vec<String>,
    pub target_types: Vec<String>,
    pub transforms_into: Option<String>,
    /// Unit delivered for free when this structure is placed.
    pub free_unit: Option<String>,
    /// Extra resource storage.
    pub storage: i32,
}

impl ActorTemplate {
    pub fn new(name: impl Into<String>, caps: ActorCaps) -> Self {
        Self {
            name: name.into(),
            caps,
            hp: 100,
            damage: 0,
            speed: 0,
            cost: 0,
            power: 0,
            queue: None,
            prerequisites: Vec::new(),
            target_types: Vec::new(),
            transforms_into: None,
            free_unit: None,
            storage: 0,
        }
    }

    /// A structure produced from `queue`.
    pub fn structure(name: &str, queue: &str, cost: i32, power: i32) -> Self {
        let mut template = Self::new(name, ActorCaps::BUILDING | ActorCaps::REPAIRABLE);
        template.queue = Some(queue.to_owned());
        template.cost = cost;
        template.power = power;
        template.hp = 800;
        template.target_types = vec!["Ground".to_owned(), "Structure".to_owned()];
        template
    }

    /// A mobile unit produced from `queue`.
    pub fn unit(name: &str, queue: &str, cost: i32, hp: i32, damage: i32, speed: i32) -> Self {
        let mut caps = ActorCaps::MOBILE;
        if damage > 0 {
            caps |= ActorCaps::ARMED;
        }
        let mut template = Self::new(name, caps);
        template.queue = Some(queue.to_owned());
        template.cost = cost;
        template.hp = hp;
        template.damage = damage;
        template.speed = speed;
        template.target_types = vec!["Ground".to_owned()];
        template
    }

    #[must_use]
    pub fn with_caps(mut self, caps: ActorCaps) -> Self {
        self.caps |= caps;
        self
    }

    #[must_use]
    pub fn requires(mut self, any_of: &[&str]) -> Self {
        self.prerequisites = any_of.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    pub fn is_structure(&self) -> bool {
        self.caps.contains(ActorCaps::BUILDING)
    }

    /// Ticks from the start of production to completion.
    pub fn build_time(&self) -> u32 {
        (self.cost / 25).max(5) as u32
    }

    pub fn item_info(&self) -> ItemInfo {
        ItemInfo {
            name: self.name.clone(),
            power: self.power,
            armed: self.caps.contains(ActorCaps::ARMED),
            aircraft: self.caps.contains(ActorCaps::AIRCRAFT),
            cost: self.cost,
        }
    }

    /// A full-health instance of this type.
    pub fn spawn(&self, id: ActorId, owner: PlayerId, cell: CPos) -> ActorSnapshot {
        let mut actor = ActorSnapshot::new(id, owner, self.name.as_str(), cell)
            .with_caps(self.caps)
            .with_health(self.hp, self.hp)
            .with_damage(self.damage)
            .with_speed(self.speed)
            .with_cost(self.cost);
        actor.target_types = self.target_types.clone();
        actor.transforms_into = self.transforms_into.clone();
        actor.harvester_empty = self.caps.contains(ActorCaps::HARVESTER);
        actor
    }
}

/// Which actors host the queues of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueRule {
    pub category: String,
    /// Every owned actor of one of these types hosts a queue.
    pub hosts: Vec<String>,
}

/// Catalog of actor templates and queue rules.
#[derive(Clone, Debug, Default)]
pub struct Ruleset {
    templates: BTreeMap<String, ActorTemplate>,
    queues: Vec<QueueRule>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, template: ActorTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn add_queue(&mut self, category: &str, hosts: &[&str]) {
        self.queues.push(QueueRule {
            category: category.to_owned(),
            hosts: hosts.iter().map(|h| (*h).to_owned()).collect(),
        });
    }

    pub fn template(&self, name: &str) -> Option<&ActorTemplate> {
        self.templates.get(name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &ActorTemplate> {
        self.templates.values()
    }

    pub fn queue_rule(&self, category: &str) -> Option<&QueueRule> {
        self.queues.iter().find(|q| q.category == category)
    }

    /// A small two-faction ruleset matching the default bot names.
    pub fn standard() -> Self {
        let mut rules = Self::new();

        let mut mcv = ActorTemplate::unit("mcv", "Vehicle", 2000, 600, 0, 60)
            .with_caps(ActorCaps::BASE_BUILDING)
            .requires(&["weap"]);
        mcv.transforms_into = Some("fact".to_owned());
        rules.add(mcv);

        let mut fact = ActorTemplate::structure("fact", "Building", 2500, 0)
            .with_caps(ActorCaps::BASE_BUILDING | ActorCaps::BASE_PROVIDER);
        fact.queue = None;
        fact.hp = 1500;
        rules.add(fact);

        rules.add(ActorTemplate::structure("powr", "Building", 300, 100));
        rules.add(ActorTemplate::structure("apwr", "Building", 500, 200).requires(&["dome"]));

        let mut proc = ActorTemplate::structure("proc", "Building", 1400, -30).requires(&["powr", "apwr"]);
        proc.free_unit = Some("harv".to_owned());
        proc.storage = 2000;
        rules.add(proc);

        let mut silo = ActorTemplate::structure("silo", "Building", 150, -10).requires(&["proc"]);
        silo.storage = 1500;
        rules.add(silo);

        for barracks in ["barr", "tent"] {
            rules.add(
                ActorTemplate::structure(barracks, "Building", 400, -20)
                    .with_caps(ActorCaps::RALLY_POINT)
                    .requires(&["powr", "apwr"]),
            );
        }
        rules.add(
            ActorTemplate::structure("weap", "Building", 2000, -30)
                .with_caps(ActorCaps::RALLY_POINT)
                .requires(&["proc"]),
        );
        rules.add(ActorTemplate::structure("dome", "Building", 1000, -40).requires(&["proc"]));

        let mut pbox = ActorTemplate::structure("pbox", "Defense", 400, -15)
            .with_caps(ActorCaps::ARMED)
            .requires(&["barr", "tent"]);
        pbox.damage = 30;
        rules.add(pbox);
        let mut gun = ActorTemplate::structure("gun", "Defense", 600, -40)
            .with_caps(ActorCaps::ARMED)
            .requires(&["weap"]);
        gun.damage = 50;
        rules.add(gun);

        rules.add(ActorTemplate::unit("e1", "Infantry", 100, 50, 15, 56).requires(&["barr", "tent"]));
        rules.add(ActorTemplate::unit("e3", "Infantry", 300, 45, 30, 43).requires(&["barr", "tent"]));
        rules.add(
            ActorTemplate::unit("harv", "Vehicle", 1100, 600, 0, 60)
                .with_caps(ActorCaps::HARVESTER)
                .requires(&["proc"]),
        );
        rules.add(ActorTemplate::unit("jeep", "Vehicle", 600, 150, 15, 170).requires(&["weap"]));
        rules.add(ActorTemplate::unit("1tnk", "Vehicle", 700, 220, 25, 113).requires(&["weap"]));
        rules.add(ActorTemplate::unit("2tnk", "Vehicle", 850, 400, 40, 85).requires(&["weap"]));
        rules.add(ActorTemplate::unit("arty", "Vehicle", 800, 75, 60, 72).requires(&["weap", "dome"]));

        rules.add_queue("Building", &["fact"]);
        rules.add_queue("Defense", &["fact"]);
        rules.add_queue("Infantry", &["barr", "tent"]);
        rules.add_queue("Vehicle", &["weap"]);
        rules
    }
}
