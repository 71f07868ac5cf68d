//! The entity registry: the one owner of everything alive in the world
//!
//! The `World` keeps every entity in a single name-keyed `BTreeMap`, which
//! gives both the O(log n) lookups and the deterministic ascending-name
//! iteration the tick loop and the nearest-neighbor tie-break rely on. Only
//! registry methods ever create or destroy entries; entities reach each
//! other exclusively through the service methods here (strike, withdraw,
//! deposit, nearest queries, notifications), never through each other's
//! containers.
//!
//! The tick checks the updating entity out of the map, hands it `&mut World`
//! so its effects land immediately (an entity updated later in the same tick
//! sees them), and reinserts it afterwards, unless it died meanwhile, which
//! is exactly how removal-on-death happens.
//!
//! There is no global instance. The driver constructs one `World` and passes
//! it into everything that needs registry services.

use crate::core::config::WorldConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Point, Tick};
use crate::entity::{Agent, Entity, Structure};
use crate::observer::{ObserverHandle, ObserverHub};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;

/// Owning collection of all live entities plus the observer fan-out
pub struct World {
    config: WorldConfig,
    time: Tick,
    entities: BTreeMap<String, Entity>,
    observers: ObserverHub,
}

impl World {
    /// An empty world under the given configuration
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            time: 0,
            entities: BTreeMap::new(),
            observers: ObserverHub::new(),
        })
    }

    /// A world seeded with the classic starting settlement: two farms, two
    /// town halls, two peasants and two soldiers
    pub fn with_default_settlement(config: WorldConfig) -> Result<Self> {
        let mut world = Self::new(config)?;
        world.create_structure("Rivendale", "Farm", Point::new(10.0, 10.0))?;
        world.create_structure("Sunnybrook", "Farm", Point::new(0.0, 30.0))?;
        world.create_structure("Shire", "Town_Hall", Point::new(20.0, 20.0))?;
        world.create_structure("Paduca", "Town_Hall", Point::new(30.0, 30.0))?;
        world.create_agent("Pippin", "Peasant", Point::new(5.0, 10.0))?;
        world.create_agent("Merry", "Peasant", Point::new(0.0, 25.0))?;
        world.create_agent("Zug", "Soldier", Point::new(20.0, 30.0))?;
        world.create_agent("Bug", "Soldier", Point::new(15.0, 20.0))?;
        Ok(world)
    }

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// True if any agent or structure holds this name
    pub fn is_name_in_use(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    // === CREATION ===

    /// Construct and register a new agent, announcing its initial state
    pub fn create_agent(&mut self, name: &str, type_name: &str, location: Point) -> Result<()> {
        let agent = match type_name {
            "Peasant" => Agent::new_peasant(name.to_string(), location, &self.config),
            "Soldier" => Agent::new_soldier(name.to_string(), location, &self.config),
            "Archer" => Agent::new_archer(name.to_string(), location, &self.config),
            _ => {
                return Err(SimError::UnknownType {
                    kind: "agent",
                    type_name: type_name.to_string(),
                })
            }
        };
        if self.is_name_in_use(name) {
            return Err(SimError::NameInUse(name.to_string()));
        }
        tracing::debug!("registered {} {}", type_name, name);
        self.observers.location_changed(name, location);
        self.observers.health_changed(name, agent.health());
        self.entities.insert(name.to_string(), Entity::Agent(agent));
        Ok(())
    }

    /// Construct and register a new structure, announcing its initial state
    pub fn create_structure(&mut self, name: &str, type_name: &str, location: Point) -> Result<()> {
        let structure = match type_name {
            "Farm" => Structure::new_farm(name.to_string(), location, &self.config),
            "Town_Hall" => Structure::new_town_hall(name.to_string(), location, &self.config),
            _ => {
                return Err(SimError::UnknownType {
                    kind: "structure",
                    type_name: type_name.to_string(),
                })
            }
        };
        if self.is_name_in_use(name) {
            return Err(SimError::NameInUse(name.to_string()));
        }
        tracing::debug!("registered {} {}", type_name, name);
        self.observers.location_changed(name, location);
        self.observers.amount_changed(name, structure.stored());
        self.entities.insert(name.to_string(), Entity::Structure(structure));
        Ok(())
    }

    // === LOOKUP ===

    pub fn lookup_agent(&self, name: &str) -> Result<&Agent> {
        match self.entities.get(name) {
            Some(Entity::Agent(a)) => Ok(a),
            _ => Err(SimError::AgentNotFound(name.to_string())),
        }
    }

    pub fn lookup_structure(&self, name: &str) -> Result<&Structure> {
        match self.entities.get(name) {
            Some(Entity::Structure(s)) => Ok(s),
            _ => Err(SimError::StructureNotFound(name.to_string())),
        }
    }

    /// Resolve an agent name handle to a position, if it still names a live
    /// agent
    pub(crate) fn agent_location(&self, name: &str) -> Option<Point> {
        match self.entities.get(name) {
            Some(Entity::Agent(a)) => Some(a.location()),
            _ => None,
        }
    }

    /// Resolve a structure name handle to a position
    pub(crate) fn structure_location(&self, name: &str) -> Option<Point> {
        match self.entities.get(name) {
            Some(Entity::Structure(s)) => Some(s.location()),
            _ => None,
        }
    }

    /// All live agents in ascending name order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.entities.values().filter_map(|e| match e {
            Entity::Agent(a) => Some(a),
            _ => None,
        })
    }

    /// All structures in ascending name order
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.entities.values().filter_map(|e| match e {
            Entity::Structure(s) => Some(s),
            _ => None,
        })
    }

    // === NEAREST-NEIGHBOR QUERIES ===

    /// Closest agent to `from`, excluding the named reference agent
    ///
    /// Linear scan in name order; among equidistant candidates the first
    /// encountered, the lexicographically smallest name, wins. That
    /// tie-break is an observable policy, not an accident of iteration.
    pub fn nearest_agent(&self, from: Point, excluding: &str) -> Option<&Agent> {
        self.agents()
            .filter(|a| a.name() != excluding)
            .min_by_key(|a| OrderedFloat(from.distance(&a.location())))
    }

    /// Closest structure to `from`, same tie-break as `nearest_agent`
    pub fn nearest_structure(&self, from: Point) -> Option<&Structure> {
        self.structures()
            .min_by_key(|s| OrderedFloat(from.distance(&s.location())))
    }

    // === TIME ===

    /// Advance the world one step: every live entity updates once, in
    /// ascending name order, with effects visible immediately to entities
    /// updated later in the same pass
    pub fn tick(&mut self) {
        self.time += 1;
        tracing::debug!("tick {}", self.time);
        let names: Vec<String> = self.entities.keys().cloned().collect();
        for name in names {
            // Killed earlier in this same tick; nothing left to update.
            let Some(mut entity) = self.entities.remove(&name) else {
                continue;
            };
            entity.update(self);
            let keep = match &entity {
                Entity::Agent(a) => a.is_alive(),
                Entity::Structure(_) => true,
            };
            if keep {
                self.entities.insert(name, entity);
            }
        }
    }

    // === ORDER DISPATCH ===

    /// Order an agent to move to a destination
    pub fn order_move(&mut self, agent: &str, destination: Point) -> Result<()> {
        self.with_agent(agent, |a, _| {
            a.move_to(destination);
            Ok(())
        })
    }

    /// Order an agent to halt
    pub fn order_stop(&mut self, agent: &str) -> Result<()> {
        self.with_agent(agent, |a, _| {
            a.stop();
            Ok(())
        })
    }

    /// Order an agent to haul between two structures
    pub fn order_work(&mut self, agent: &str, source: &str, destination: &str) -> Result<()> {
        self.with_agent(agent, |a, world| a.start_working(source, destination, world))
    }

    /// Order an agent to attack a target
    pub fn order_attack(&mut self, agent: &str, target: &str) -> Result<()> {
        self.with_agent(agent, |a, world| a.start_attacking(target, world))
    }

    /// Check an agent out of the collection, run an order against it, and
    /// put it back
    ///
    /// Orders never kill, so the agent is always reinserted; a failed order
    /// has made no state change by the validate-then-mutate rule.
    fn with_agent<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Agent, &World) -> Result<R>,
    ) -> Result<R> {
        let entity = self
            .entities
            .remove(name)
            .ok_or_else(|| SimError::AgentNotFound(name.to_string()))?;
        match entity {
            Entity::Agent(mut agent) => {
                let result = if agent.is_alive() {
                    f(&mut agent, self)
                } else {
                    Err(SimError::AgentNotAlive(name.to_string()))
                };
                self.entities.insert(name.to_string(), Entity::Agent(agent));
                result
            }
            structure => {
                self.entities.insert(name.to_string(), structure);
                Err(SimError::AgentNotFound(name.to_string()))
            }
        }
    }

    // === ENTITY-FACING SERVICES ===

    /// Deal damage to the named agent on behalf of `attacker`; returns
    /// whether the target is still alive afterwards
    ///
    /// A missing target counts as already dead. A target that dies here is
    /// not reinserted: that is the registry removing it, exactly once, in
    /// the same event that killed it.
    pub(crate) fn strike(&mut self, target: &str, strength: i32, attacker: &str) -> bool {
        let Some(entity) = self.entities.remove(target) else {
            return false;
        };
        match entity {
            Entity::Agent(mut agent) => {
                agent.take_hit(strength, attacker, self);
                let alive = agent.is_alive();
                if alive {
                    self.entities.insert(target.to_string(), Entity::Agent(agent));
                } else {
                    tracing::debug!("{} removed from the world", target);
                }
                alive
            }
            structure => {
                self.entities.insert(target.to_string(), structure);
                false
            }
        }
    }

    /// Withdraw from a structure's stock, notifying observers; a vanished
    /// structure grants nothing
    pub(crate) fn withdraw_from(&mut self, name: &str, requested: f64) -> f64 {
        let Some(Entity::Structure(s)) = self.entities.get_mut(name) else {
            return 0.0;
        };
        let granted = s.withdraw(requested);
        let stored = s.stored();
        self.observers.amount_changed(name, stored);
        granted
    }

    /// Deposit into a structure, notifying observers
    pub(crate) fn deposit_to(&mut self, name: &str, amount: f64) {
        let Some(Entity::Structure(s)) = self.entities.get_mut(name) else {
            return;
        };
        if s.deposit(amount) {
            let stored = s.stored();
            self.observers.amount_changed(name, stored);
        }
    }

    // === NOTIFICATIONS (called by entities, never by external callers) ===

    pub(crate) fn notify_location(&mut self, name: &str, location: Point) {
        self.observers.location_changed(name, location);
    }

    pub(crate) fn notify_amount(&mut self, name: &str, amount: f64) {
        self.observers.amount_changed(name, amount);
    }

    pub(crate) fn notify_health(&mut self, name: &str, health: i32) {
        self.observers.health_changed(name, health);
    }

    pub(crate) fn notify_removed(&mut self, name: &str) {
        self.observers.removed(name);
    }

    // === OBSERVERS ===

    /// Attach an observer and replay the current state of every live entity
    /// to it, so it starts fully synchronized
    pub fn attach_observer(&mut self, observer: ObserverHandle) {
        self.observers.attach(observer.clone());
        let mut new_observer = observer.borrow_mut();
        for entity in self.entities.values() {
            match entity {
                Entity::Agent(a) => {
                    new_observer.location_changed(a.name(), a.location());
                    new_observer.health_changed(a.name(), a.health());
                }
                Entity::Structure(s) => {
                    new_observer.location_changed(s.name(), s.location());
                    new_observer.amount_changed(s.name(), s.stored());
                }
            }
        }
    }

    /// Stop delivery to an observer; no replay, no further events
    pub fn detach_observer(&mut self, observer: &ObserverHandle) {
        self.observers.detach(observer);
    }

    // === REPORTING ===

    /// Status dump of every entity, in name order
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for entity in self.entities.values() {
            out.push_str(&entity.describe(self));
        }
        out
    }

    /// Serializable summary of the whole world
    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .entities
            .values()
            .map(|entity| match entity {
                Entity::Agent(a) => EntitySnapshot {
                    name: a.name().to_string(),
                    kind: a.kind().label(),
                    location: a.location(),
                    health: Some(a.health()),
                    amount: None,
                    carried: Some(a.carried()),
                },
                Entity::Structure(s) => EntitySnapshot {
                    name: s.name().to_string(),
                    kind: s.kind().label(),
                    location: s.location(),
                    health: None,
                    amount: Some(s.stored()),
                    carried: None,
                },
            })
            .collect();
        Snapshot { time: self.time, entities }
    }

    /// Pretty-printed JSON form of `snapshot`
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

/// Point-in-time summary of the world for the snapshot command
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub time: Tick,
    pub entities: Vec<EntitySnapshot>,
}

/// One entity's slice of a snapshot
#[derive(Debug, Serialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub kind: &'static str,
    pub location: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carried: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SimError;

    fn empty_world() -> World {
        World::new(WorldConfig::default()).unwrap()
    }

    #[test]
    fn test_duplicate_name_rejected_across_kinds() {
        let mut world = empty_world();
        world.create_structure("Shire", "Town_Hall", Point::default()).unwrap();
        let err = world.create_agent("Shire", "Soldier", Point::default()).unwrap_err();
        assert!(matches!(err, SimError::NameInUse(_)));
        // the registry is unchanged: the name still resolves to the structure
        assert!(world.lookup_structure("Shire").is_ok());
        assert!(world.lookup_agent("Shire").is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut world = empty_world();
        let err = world.create_agent("Gandalf", "Wizard", Point::default()).unwrap_err();
        assert!(matches!(err, SimError::UnknownType { .. }));
        assert!(!world.is_name_in_use("Gandalf"));
        let err = world.create_structure("Keep", "Castle", Point::default()).unwrap_err();
        assert!(matches!(err, SimError::UnknownType { .. }));
    }

    #[test]
    fn test_lookup_never_partially_matches() {
        let mut world = empty_world();
        world.create_agent("Pippin", "Peasant", Point::default()).unwrap();
        assert!(world.lookup_agent("Pip").is_err());
        assert!(world.lookup_agent("Pippin").is_ok());
    }

    #[test]
    fn test_tick_advances_time_and_production() {
        let mut world = empty_world();
        world.create_structure("Rivendale", "Farm", Point::default()).unwrap();
        let start = world.lookup_structure("Rivendale").unwrap().stored();
        for _ in 0..4 {
            world.tick();
        }
        assert_eq!(world.time(), 4);
        let rate = world.config().farm_production_rate;
        assert_eq!(
            world.lookup_structure("Rivendale").unwrap().stored(),
            start + 4.0 * rate,
            "stock grows by rate per tick with no withdrawals"
        );
    }

    #[test]
    fn test_nearest_agent_excludes_self_and_breaks_ties_by_name() {
        let mut world = empty_world();
        // Two candidates equidistant from the origin, plus the reference.
        world.create_agent("Curly", "Soldier", Point::new(0.0, 3.0)).unwrap();
        world.create_agent("Abel", "Soldier", Point::new(3.0, 0.0)).unwrap();
        world.create_agent("Ref", "Soldier", Point::new(0.0, 0.0)).unwrap();

        let nearest = world.nearest_agent(Point::new(0.0, 0.0), "Ref").unwrap();
        assert_eq!(nearest.name(), "Abel", "lexicographically smaller name wins the tie");
    }

    #[test]
    fn test_nearest_agent_prefers_strictly_closer() {
        let mut world = empty_world();
        world.create_agent("Aaa", "Soldier", Point::new(10.0, 0.0)).unwrap();
        world.create_agent("Zzz", "Soldier", Point::new(2.0, 0.0)).unwrap();
        world.create_agent("Ref", "Soldier", Point::new(0.0, 0.0)).unwrap();
        let nearest = world.nearest_agent(Point::new(0.0, 0.0), "Ref").unwrap();
        assert_eq!(nearest.name(), "Zzz", "distance beats name order");
    }

    #[test]
    fn test_nearest_structure_tie_break() {
        let mut world = empty_world();
        world.create_structure("Beta", "Farm", Point::new(0.0, 5.0)).unwrap();
        world.create_structure("Alpha", "Farm", Point::new(5.0, 0.0)).unwrap();
        let nearest = world.nearest_structure(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(nearest.name(), "Alpha");
    }

    #[test]
    fn test_order_to_unknown_agent_fails() {
        let mut world = empty_world();
        let err = world.order_move("Nobody", Point::default()).unwrap_err();
        assert!(matches!(err, SimError::AgentNotFound(_)));
    }

    #[test]
    fn test_order_to_structure_name_fails_as_agent_not_found() {
        let mut world = empty_world();
        world.create_structure("Shire", "Town_Hall", Point::default()).unwrap();
        let err = world.order_stop("Shire").unwrap_err();
        assert!(matches!(err, SimError::AgentNotFound(_)));
        // the structure survived the failed checkout
        assert!(world.lookup_structure("Shire").is_ok());
    }

    #[test]
    fn test_failed_work_order_leaves_state_unchanged() {
        let mut world = empty_world();
        world.create_structure("Rivendale", "Farm", Point::new(10.0, 10.0)).unwrap();
        world.create_agent("Pippin", "Peasant", Point::new(0.0, 0.0)).unwrap();

        let err = world.order_work("Pippin", "Rivendale", "Rivendale").unwrap_err();
        assert!(matches!(err, SimError::SameSourceAndDestination(_)));
        let pippin = world.lookup_agent("Pippin").unwrap();
        assert!(!pippin.is_moving(), "failed order must not start movement");
    }

    #[test]
    fn test_strike_removes_agent_on_death() {
        let mut world = empty_world();
        world.create_agent("Bug", "Soldier", Point::default()).unwrap();
        let health = world.config().agent_health;
        assert!(!world.strike("Bug", health, "Zug"), "lethal strike reports death");
        assert!(world.lookup_agent("Bug").is_err(), "dead agent is gone from the registry");
        assert!(!world.is_name_in_use("Bug"));
    }

    #[test]
    fn test_strike_missing_target_counts_as_dead() {
        let mut world = empty_world();
        assert!(!world.strike("Ghost", 1, "Zug"));
    }

    #[test]
    fn test_snapshot_shape() {
        let mut world = empty_world();
        world.create_structure("Rivendale", "Farm", Point::new(10.0, 10.0)).unwrap();
        world.create_agent("Zug", "Soldier", Point::new(1.0, 2.0)).unwrap();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.entities.len(), 2);
        // BTreeMap order: Rivendale before Zug
        assert_eq!(snapshot.entities[0].name, "Rivendale");
        assert!(snapshot.entities[0].amount.is_some());
        assert!(snapshot.entities[0].health.is_none());
        assert_eq!(snapshot.entities[1].name, "Zug");
        assert_eq!(snapshot.entities[1].health, Some(world.config().agent_health));
    }

    #[test]
    fn test_default_settlement_roster() {
        let world = World::with_default_settlement(WorldConfig::default()).unwrap();
        for name in ["Rivendale", "Sunnybrook", "Shire", "Paduca"] {
            assert!(world.lookup_structure(name).is_ok(), "missing structure {}", name);
        }
        for name in ["Pippin", "Merry", "Zug", "Bug"] {
            assert!(world.lookup_agent(name).is_ok(), "missing agent {}", name);
        }
    }
}
