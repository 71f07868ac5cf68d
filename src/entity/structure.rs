//! Stationary resource structures
//!
//! Structures sit at a fixed location for the life of the simulation and
//! hold a stored amount that agents draw from or deliver to. The two
//! variants differ only in their resource policy: a farm produces stock on
//! its own and cannot accept deposits, a town hall produces nothing but
//! banks whatever is deposited and taxes withdrawals.

use crate::core::config::WorldConfig;
use crate::core::types::Point;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Resource policy variant of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Farm,
    TownHall,
}

impl StructureKind {
    /// Display label used in describe output and snapshots
    pub fn label(&self) -> &'static str {
        match self {
            StructureKind::Farm => "Farm",
            StructureKind::TownHall => "Town_Hall",
        }
    }
}

/// A stationary resource container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    name: String,
    location: Point,
    kind: StructureKind,
    stored: f64,
    production_rate: f64,
    tax_rate: f64,
    min_withdrawal: f64,
}

impl Structure {
    pub fn new_farm(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            name,
            location,
            kind: StructureKind::Farm,
            stored: config.farm_starting_stock,
            production_rate: config.farm_production_rate,
            tax_rate: 0.0,
            min_withdrawal: 0.0,
        }
    }

    pub fn new_town_hall(name: String, location: Point, config: &WorldConfig) -> Self {
        Self {
            name,
            location,
            kind: StructureKind::TownHall,
            stored: 0.0,
            production_rate: 0.0,
            tax_rate: config.town_hall_tax_rate,
            min_withdrawal: config.town_hall_min_withdrawal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn stored(&self) -> f64 {
        self.stored
    }

    /// Per-tick production; returns true if the stored amount changed
    pub fn produce(&mut self) -> bool {
        match self.kind {
            StructureKind::Farm => {
                self.stored += self.production_rate;
                tracing::info!("Farm {} now has {:.2}", self.name, self.stored);
                true
            }
            StructureKind::TownHall => false,
        }
    }

    /// Take up to `requested` out of the stored amount, returning what was
    /// actually granted
    ///
    /// A farm grants `min(requested, stored)`. A town hall holds back its
    /// tax: withdrawals come out of `stored * (1 - tax_rate)`, and below the
    /// minimum threshold nothing is granted at all. Only the granted amount
    /// is ever deducted; the taxed remainder stays banked.
    pub fn withdraw(&mut self, requested: f64) -> f64 {
        let available = match self.kind {
            StructureKind::Farm => self.stored,
            StructureKind::TownHall => {
                let post_tax = self.stored * (1.0 - self.tax_rate);
                if post_tax < self.min_withdrawal {
                    0.0
                } else {
                    post_tax
                }
            }
        };
        let granted = requested.min(available);
        self.stored -= granted;
        granted
    }

    /// Add to the stored amount; returns false for variants that cannot
    /// accept deposits (the caller drops the goods on the floor at its own
    /// peril)
    pub fn deposit(&mut self, amount: f64) -> bool {
        match self.kind {
            StructureKind::Farm => false,
            StructureKind::TownHall => {
                self.stored += amount;
                true
            }
        }
    }

    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} at {}", self.kind.label(), self.name, self.location);
        match self.kind {
            StructureKind::Farm => {
                let _ = writeln!(out, "   Food available: {:.2}", self.stored);
            }
            StructureKind::TownHall => {
                let _ = writeln!(out, "   Contains: {:.2}", self.stored);
            }
        }
        out
    }
}
