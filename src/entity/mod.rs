//! Simulated entities: mobile agents and stationary structures
//!
//! The variant set is closed and exhaustively handled: three agent kinds
//! (peasant, soldier, archer) and two structure kinds (farm, town hall).
//! Everything shares the same capability surface: a unique name, a
//! location, a per-tick update, and a describe dump.

pub mod agent;
pub mod peasant;
pub mod structure;
pub mod warrior;

pub use agent::{Agent, AgentKind};
pub use peasant::HaulPhase;
pub use structure::{Structure, StructureKind};
pub use warrior::WarriorKind;

use crate::core::types::Point;
use crate::world::World;
use serde::{Deserialize, Serialize};

/// Any simulated thing the registry can own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Agent(Agent),
    Structure(Structure),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Agent(a) => a.name(),
            Entity::Structure(s) => s.name(),
        }
    }

    pub fn location(&self) -> Point {
        match self {
            Entity::Agent(a) => a.location(),
            Entity::Structure(s) => s.location(),
        }
    }

    /// Advance one tick; called by the registry with this entity checked
    /// out of its collection, so the entity may freely use registry services
    pub(crate) fn update(&mut self, world: &mut World) {
        match self {
            Entity::Agent(a) => a.update(world),
            Entity::Structure(s) => {
                if s.produce() {
                    let amount = s.stored();
                    world.notify_amount(s.name(), amount);
                }
            }
        }
    }

    pub fn describe(&self, world: &World) -> String {
        match self {
            Entity::Agent(a) => a.describe(world),
            Entity::Structure(s) => s.describe(),
        }
    }
}
