//! Agent motion and mortality framework
//!
//! Everything mobile and mortal shares this chassis: a `Motion` state
//! machine stepping toward a destination at fixed speed, and a health pool
//! that only ever shrinks. The behavior variants (haul cycle, combat) hang
//! off `AgentKind` and get the chassis passed in separately so they can
//! drive movement while holding their own state.
//!
//! Dying is a one-way door: health reaching zero flips `alive`, halts
//! motion, notifies observers of the removal, and the registry drops the
//! entry in the same event. A dead agent's tick is a no-op.

use crate::core::config::WorldConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Point;
use crate::entity::peasant::Peasant;
use crate::entity::warrior::{Warrior, WarriorKind};
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Where an agent is headed, if anywhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionState {
    Idle,
    MovingTo(Point),
}

/// Result of advancing motion by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Idle,
    Stepped,
    Arrived,
}

/// Straight-line movement toward a destination at fixed speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motion {
    location: Point,
    speed: f64,
    state: MotionState,
}

impl Motion {
    fn new(location: Point, speed: f64) -> Self {
        Self { location, speed, state: MotionState::Idle }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, MotionState::MovingTo(_))
    }

    pub fn destination(&self) -> Option<Point> {
        match self.state {
            MotionState::Idle => None,
            MotionState::MovingTo(dest) => Some(dest),
        }
    }

    fn start(&mut self, destination: Point) {
        self.state = MotionState::MovingTo(destination);
    }

    fn stop(&mut self) {
        self.state = MotionState::Idle;
    }

    /// Advance one tick; the final step jumps exactly onto the destination
    fn step(&mut self) -> StepOutcome {
        match self.state {
            MotionState::Idle => StepOutcome::Idle,
            MotionState::MovingTo(dest) => {
                let remaining = self.location.distance(&dest);
                if remaining <= self.speed {
                    self.location = dest;
                    self.state = MotionState::Idle;
                    StepOutcome::Arrived
                } else {
                    let direction = (dest - self.location) * (1.0 / remaining);
                    self.location = self.location + direction * self.speed;
                    StepOutcome::Stepped
                }
            }
        }
    }
}

/// Identity, health and motion shared by every agent variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCore {
    name: String,
    health: i32,
    alive: bool,
    motion: Motion,
}

impl AgentCore {
    fn new(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            name,
            health: config.agent_health,
            alive: true,
            motion: Motion::new(location, config.agent_speed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Point {
        self.motion.location()
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    /// Head toward a destination; already being there is a no-op
    pub(crate) fn move_to(&mut self, destination: Point) {
        if destination == self.motion.location() {
            tracing::info!("{}: I'm already there", self.name);
            return;
        }
        tracing::info!("{}: I'm on the way", self.name);
        self.motion.start(destination);
    }

    /// Halt in place; a no-op when already idle
    pub(crate) fn stop(&mut self) {
        if self.motion.is_moving() {
            tracing::info!("{}: I'm stopped", self.name);
            self.motion.stop();
        }
    }

    /// Step the motion machine and push the current location to observers,
    /// moving or not
    fn update_movement(&mut self, world: &mut World) {
        match self.motion.step() {
            StepOutcome::Arrived => tracing::info!("{}: I'm there!", self.name),
            StepOutcome::Stepped => tracing::info!("{}: step...", self.name),
            StepOutcome::Idle => {}
        }
        world.notify_location(&self.name, self.motion.location());
    }

    /// Apply damage; flips to dead at zero health, exactly once
    ///
    /// On death the motion halts, observers learn of the removal, and the
    /// registry drops the entry by not reinserting this agent. On survival
    /// observers get the new health value.
    pub(crate) fn lose_health(&mut self, amount: i32, world: &mut World) {
        self.health -= amount;
        if self.health <= 0 {
            self.alive = false;
            self.motion.stop();
            tracing::info!("{}: Arrggh!", self.name);
            world.notify_removed(&self.name);
            return;
        }
        tracing::info!("{}: Ouch!", self.name);
        world.notify_health(&self.name, self.health);
    }
}

/// Behavior specialization of an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentKind {
    Peasant(Peasant),
    Warrior(Warrior),
}

impl AgentKind {
    /// Display label used in describe output and snapshots
    pub fn label(&self) -> &'static str {
        match self {
            AgentKind::Peasant(_) => "Peasant",
            AgentKind::Warrior(w) => w.kind().label(),
        }
    }
}

/// A mobile, mortal, commandable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    core: AgentCore,
    kind: AgentKind,
}

impl Agent {
    pub fn new_peasant(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            core: AgentCore::new(name, location, config),
            kind: AgentKind::Peasant(Peasant::new()),
        }
    }

    pub fn new_soldier(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            core: AgentCore::new(name, location, config),
            kind: AgentKind::Warrior(Warrior::new(WarriorKind::Soldier, config)),
        }
    }

    pub fn new_archer(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            core: AgentCore::new(name, location, config),
            kind: AgentKind::Warrior(Warrior::new(WarriorKind::Archer, config)),
        }
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn location(&self) -> Point {
        self.core.location()
    }

    pub fn health(&self) -> i32 {
        self.core.health()
    }

    pub fn is_alive(&self) -> bool {
        self.core.is_alive()
    }

    pub fn is_moving(&self) -> bool {
        self.core.is_moving()
    }

    pub fn destination(&self) -> Option<Point> {
        self.core.motion.destination()
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    /// Carried amount, for snapshots; zero for non-haulers
    pub fn carried(&self) -> f64 {
        match &self.kind {
            AgentKind::Peasant(p) => p.carried(),
            AgentKind::Warrior(_) => 0.0,
        }
    }

    /// Manual move order; cancels a peasant's work cycle before honoring it
    pub(crate) fn move_to(&mut self, destination: Point) {
        if let AgentKind::Peasant(p) = &mut self.kind {
            p.cancel_work(&self.core);
        }
        self.core.move_to(destination);
    }

    /// Halt all activity: motion stops, a peasant also abandons its haul
    ///
    /// Combat engagement is not a motion state and survives a stop order.
    pub(crate) fn stop(&mut self) {
        if let AgentKind::Peasant(p) = &mut self.kind {
            p.cancel_work(&self.core);
        }
        self.core.stop();
    }

    /// Begin the haul cycle between two structures
    pub(crate) fn start_working(
        &mut self,
        source: &str,
        destination: &str,
        world: &World,
    ) -> Result<()> {
        match &mut self.kind {
            AgentKind::Peasant(p) => p.start_working(&mut self.core, source, destination, world),
            AgentKind::Warrior(_) => Err(SimError::CannotWork(self.core.name().to_string())),
        }
    }

    /// Engage a target by name
    pub(crate) fn start_attacking(&mut self, target: &str, world: &World) -> Result<()> {
        match &mut self.kind {
            AgentKind::Warrior(w) => w.start_attacking(&mut self.core, target, world),
            AgentKind::Peasant(_) => Err(SimError::CannotAttack(self.core.name().to_string())),
        }
    }

    /// Accept a hit; the attacker name lets combat variants answer back
    pub(crate) fn take_hit(&mut self, strength: i32, attacker: &str, world: &mut World) {
        match &mut self.kind {
            AgentKind::Peasant(_) => self.core.lose_health(strength, world),
            AgentKind::Warrior(w) => w.take_hit(&mut self.core, strength, attacker, world),
        }
    }

    /// Advance one tick: movement first, then the variant's own machine
    pub(crate) fn update(&mut self, world: &mut World) {
        if !self.core.is_alive() {
            return;
        }
        self.core.update_movement(world);
        match &mut self.kind {
            AgentKind::Peasant(p) => p.update(&mut self.core, world),
            AgentKind::Warrior(w) => w.update(&mut self.core, world),
        }
    }

    /// Human-readable status dump
    pub fn describe(&self, world: &World) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} at {}", self.kind.label(), self.name(), self.location());
        if !self.is_alive() {
            let _ = writeln!(out, "   Is dead");
            return out;
        }
        let _ = writeln!(out, "   Health is {}", self.health());
        match self.core.motion.destination() {
            Some(dest) => {
                let _ = writeln!(
                    out,
                    "   Moving at speed {:.2} to {}",
                    self.core.motion.speed(),
                    dest
                );
            }
            None => {
                let _ = writeln!(out, "   Stopped");
            }
        }
        match &self.kind {
            AgentKind::Peasant(p) => out.push_str(&p.describe()),
            AgentKind::Warrior(w) => out.push_str(&w.describe(world)),
        }
        out
    }
}
