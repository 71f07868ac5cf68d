//! Combat state machine shared by the soldier and archer variants
//!
//! A warrior is either idle or attacking one target. The target is held as
//! a name handle, never an owning reference: it is resolved through the
//! registry on every use, and a target that has died or wandered out of
//! range between ticks is an ordinary disengage, not an error.
//!
//! The variants differ in reach and reflexes. A soldier answers a hit by
//! turning on its attacker. An archer outranges everyone, picks off the
//! nearest agent on its own initiative while idle, and runs for the nearest
//! structure when hurt.

use crate::core::config::WorldConfig;
use crate::core::error::{Result, SimError};
use crate::entity::agent::AgentCore;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Combat variant of a warrior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarriorKind {
    Soldier,
    Archer,
}

impl WarriorKind {
    pub fn label(&self) -> &'static str {
        match self {
            WarriorKind::Soldier => "Soldier",
            WarriorKind::Archer => "Archer",
        }
    }

    /// Shout made on each strike
    fn battle_cry(&self) -> &'static str {
        match self {
            WarriorKind::Soldier => "Clang!",
            WarriorKind::Archer => "Twang!",
        }
    }
}

/// Fighting state carried by soldier and archer agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warrior {
    kind: WarriorKind,
    strength: i32,
    range: f64,
    /// Name handle of the current target; `Some` means attacking
    target: Option<String>,
}

impl Warrior {
    pub fn new(kind: WarriorKind, config: &WorldConfig) -> Self {
        let (strength, range) = match kind {
            WarriorKind::Soldier => (config.soldier_strength, config.soldier_range),
            WarriorKind::Archer => (config.archer_strength, config.archer_range),
        };
        Self { kind, strength, range, target: None }
    }

    pub fn kind(&self) -> WarriorKind {
        self.kind
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn is_attacking(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Validate and engage a target; all checks run before any state change
    pub(crate) fn start_attacking(
        &mut self,
        core: &mut AgentCore,
        target: &str,
        world: &World,
    ) -> Result<()> {
        if target == core.name() {
            return Err(SimError::InvalidTarget(core.name().to_string()));
        }
        let target_agent = world.lookup_agent(target)?;
        if !target_agent.is_alive() {
            return Err(SimError::TargetNotAlive(core.name().to_string()));
        }
        if core.location().distance(&target_agent.location()) > self.range {
            return Err(SimError::OutOfRange(core.name().to_string()));
        }
        self.engage(core.name(), target);
        Ok(())
    }

    /// Enter the attacking state; the target has already been validated (or
    /// is the attacker we are answering)
    fn engage(&mut self, own_name: &str, target: &str) {
        tracing::info!("{}: I'm attacking!", own_name);
        self.target = Some(target.to_string());
    }

    fn disengage(&mut self) {
        self.target = None;
    }

    /// Take damage, then react per variant: a soldier retaliates, an archer
    /// breaks off toward the nearest structure
    pub(crate) fn take_hit(
        &mut self,
        core: &mut AgentCore,
        strength: i32,
        attacker: &str,
        world: &mut World,
    ) {
        core.lose_health(strength, world);
        if !core.is_alive() {
            return;
        }
        match self.kind {
            WarriorKind::Soldier => {
                if !self.is_attacking() {
                    self.engage(core.name(), attacker);
                }
            }
            WarriorKind::Archer => {
                let refuge = world
                    .nearest_structure(core.location())
                    .map(|s| (s.name().to_string(), s.location()));
                if let Some((name, location)) = refuge {
                    tracing::info!("{}: I'm going to run away to {}", core.name(), name);
                    core.move_to(location);
                }
            }
        }
    }

    /// One combat tick: resolve the target, disengage if it is gone or out
    /// of reach, otherwise strike; an idle archer scans for fresh prey
    pub(crate) fn update(&mut self, core: &mut AgentCore, world: &mut World) {
        if let Some(target) = self.target.clone() {
            match world.agent_location(&target) {
                None => {
                    tracing::info!("{}: Target is dead", core.name());
                    self.disengage();
                }
                Some(target_location) => {
                    if core.location().distance(&target_location) > self.range {
                        tracing::info!("{}: Target is now out of range", core.name());
                        self.disengage();
                    } else {
                        tracing::info!("{}: {}", core.name(), self.kind.battle_cry());
                        let still_alive = world.strike(&target, self.strength, core.name());
                        if !still_alive {
                            tracing::info!("{}: I triumph!", core.name());
                            self.disengage();
                        }
                    }
                }
            }
        }

        // Unsolicited acquisition is continuous background behavior for the
        // archer, including the very tick it disengaged.
        if self.kind == WarriorKind::Archer && !self.is_attacking() {
            let candidate = world
                .nearest_agent(core.location(), core.name())
                .map(|a| (a.name().to_string(), a.location()));
            if let Some((name, location)) = candidate {
                if core.location().distance(&location) <= self.range {
                    self.engage(core.name(), &name);
                }
            }
        }
    }

    /// Attacking lines of the describe dump
    pub(crate) fn describe(&self, world: &World) -> String {
        let mut out = String::new();
        match &self.target {
            Some(target) => {
                if world.agent_location(target).is_some() {
                    let _ = writeln!(out, "   Attacking {}", target);
                } else {
                    let _ = writeln!(out, "   Attacking dead target");
                }
            }
            None => {
                let _ = writeln!(out, "   Not attacking");
            }
        }
        out
    }
}
