//! Resource-transport work cycle for the peasant variant
//!
//! A working peasant loops between a source and a destination structure:
//! walk to the source, collect up to capacity, walk to the destination,
//! deposit everything, repeat. An empty source is not an error; the peasant
//! waits there and retries every tick until the source has stock again.
//!
//! The haul holds the two structures as name handles resolved through the
//! registry each tick. A manual move or stop order cancels the whole cycle.

use crate::core::error::{Result, SimError};
use crate::entity::agent::AgentCore;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Leg of the haul cycle a working peasant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaulPhase {
    InboundToSource,
    Collecting,
    OutboundToDestination,
    Depositing,
}

/// An active haul assignment between two structures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Haul {
    source: String,
    destination: String,
    phase: HaulPhase,
}

/// Hauling state carried by peasant agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peasant {
    carried: f64,
    haul: Option<Haul>,
}

impl Peasant {
    pub fn new() -> Self {
        Self { carried: 0.0, haul: None }
    }

    pub fn carried(&self) -> f64 {
        self.carried
    }

    pub fn is_working(&self) -> bool {
        self.haul.is_some()
    }

    pub fn phase(&self) -> Option<HaulPhase> {
        self.haul.as_ref().map(|h| h.phase)
    }

    /// Abandon the current haul, announcing it; carried goods stay carried
    pub(crate) fn cancel_work(&mut self, core: &AgentCore) {
        if self.haul.take().is_some() {
            tracing::info!("{}: I'm stopping work", core.name());
        }
    }

    /// Validate and begin a haul cycle between two structures
    ///
    /// Validation runs fully before any state change; only then is the old
    /// haul cancelled and the opening phase chosen from the current load and
    /// position.
    pub(crate) fn start_working(
        &mut self,
        core: &mut AgentCore,
        source: &str,
        destination: &str,
        world: &World,
    ) -> Result<()> {
        let source_location = world.lookup_structure(source)?.location();
        let destination_location = world.lookup_structure(destination)?.location();
        if source == destination {
            return Err(SimError::SameSourceAndDestination(core.name().to_string()));
        }

        core.stop();
        self.haul = None;

        let phase = if self.carried == 0.0 {
            if core.location() == source_location {
                HaulPhase::Collecting
            } else {
                core.move_to(source_location);
                HaulPhase::InboundToSource
            }
        } else if core.location() == destination_location {
            HaulPhase::Depositing
        } else {
            core.move_to(destination_location);
            HaulPhase::OutboundToDestination
        };

        self.haul = Some(Haul {
            source: source.to_string(),
            destination: destination.to_string(),
            phase,
        });
        Ok(())
    }

    /// One work tick; runs after the movement step
    pub(crate) fn update(&mut self, core: &mut AgentCore, world: &mut World) {
        let Some(haul) = self.haul.as_ref() else {
            return;
        };
        let phase = haul.phase;
        let source = haul.source.clone();
        let destination = haul.destination.clone();

        match phase {
            HaulPhase::InboundToSource => {
                if core.is_moving() {
                    return;
                }
                let Some(source_location) = world.structure_location(&source) else {
                    self.haul = None;
                    return;
                };
                if core.location() == source_location {
                    self.set_phase(HaulPhase::Collecting);
                }
            }
            HaulPhase::Collecting => {
                let capacity = world.config().peasant_capacity;
                let received = world.withdraw_from(&source, capacity - self.carried);
                if received > 0.0 {
                    self.carried += received;
                    tracing::info!("{}: Collected {:.2}", core.name(), received);
                    self.set_phase(HaulPhase::OutboundToDestination);
                    if let Some(destination_location) = world.structure_location(&destination) {
                        core.move_to(destination_location);
                    }
                } else {
                    tracing::info!("{}: Waiting", core.name());
                }
            }
            HaulPhase::OutboundToDestination => {
                if core.is_moving() {
                    return;
                }
                let Some(destination_location) = world.structure_location(&destination) else {
                    self.haul = None;
                    return;
                };
                if core.location() == destination_location {
                    self.set_phase(HaulPhase::Depositing);
                }
            }
            HaulPhase::Depositing => {
                world.deposit_to(&destination, self.carried);
                tracing::info!("{}: Deposited {:.2}", core.name(), self.carried);
                self.carried = 0.0;
                self.set_phase(HaulPhase::InboundToSource);
                if let Some(source_location) = world.structure_location(&source) {
                    core.move_to(source_location);
                }
            }
        }
    }

    fn set_phase(&mut self, phase: HaulPhase) {
        if let Some(haul) = self.haul.as_mut() {
            haul.phase = phase;
        }
    }

    /// Carrying and haul lines of the describe dump
    pub(crate) fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "   Carrying {:.2}", self.carried);
        if let Some(haul) = &self.haul {
            match haul.phase {
                HaulPhase::InboundToSource => {
                    let _ = writeln!(out, "   Inbound to source {}", haul.source);
                }
                HaulPhase::Collecting => {
                    let _ = writeln!(out, "   Collecting at source {}", haul.source);
                }
                HaulPhase::OutboundToDestination => {
                    let _ = writeln!(out, "   Outbound to destination {}", haul.destination);
                }
                HaulPhase::Depositing => {
                    let _ = writeln!(out, "   Depositing at destination {}", haul.destination);
                }
            }
        }
        out
    }
}

impl Default for Peasant {
    fn default() -> Self {
        Self::new()
    }
}
