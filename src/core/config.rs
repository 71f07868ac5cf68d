//! Simulation configuration with documented constants
//!
//! All tuning values are collected here with explanations of their purpose.
//! The config is owned by the `World` and handed to entity constructors
//! explicitly; nothing in the crate reads configuration through globals.

use crate::core::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable constants for the simulation
///
/// The defaults reproduce the classic settlement balance: a soldier kills an
/// unarmored peasant in three exchanges, an archer outranges a soldier three
/// to one, and a farm refills faster than a single peasant can haul.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // === AGENTS ===
    /// Health every agent starts with
    pub agent_health: i32,

    /// Distance an agent covers per tick while moving
    pub agent_speed: f64,

    // === WARRIORS ===
    /// Damage a soldier deals per strike
    pub soldier_strength: i32,

    /// Maximum distance at which a soldier can engage
    pub soldier_range: f64,

    /// Damage an archer deals per strike
    ///
    /// Weaker than the soldier's; the archer's edge is range, not power.
    pub archer_strength: i32,

    /// Maximum distance at which an archer can engage
    ///
    /// Also the radius of its automatic target acquisition when idle.
    pub archer_range: f64,

    // === PEASANTS ===
    /// Maximum amount a peasant can carry at once
    pub peasant_capacity: f64,

    // === STRUCTURES ===
    /// Amount a farm holds at creation
    pub farm_starting_stock: f64,

    /// Amount a farm adds to its stock each tick
    pub farm_production_rate: f64,

    /// Fraction of a town hall's stock withheld from withdrawals
    pub town_hall_tax_rate: f64,

    /// Post-tax stock below which a town hall refuses withdrawals entirely
    pub town_hall_min_withdrawal: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            agent_health: 5,
            agent_speed: 5.0,

            soldier_strength: 2,
            soldier_range: 2.0,
            archer_strength: 1,
            archer_range: 6.0,

            peasant_capacity: 35.0,

            farm_starting_stock: 50.0,
            farm_production_rate: 2.0,
            town_hall_tax_rate: 0.1,
            town_hall_min_withdrawal: 1.0,
        }
    }
}

impl WorldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; absent keys fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.agent_health <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "agent_health ({}) must be positive",
                self.agent_health
            )));
        }
        if self.agent_speed <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "agent_speed ({}) must be positive",
                self.agent_speed
            )));
        }
        if self.soldier_range <= 0.0 || self.archer_range <= 0.0 {
            return Err(SimError::InvalidConfig(
                "warrior ranges must be positive".into(),
            ));
        }
        if self.peasant_capacity <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "peasant_capacity ({}) must be positive",
                self.peasant_capacity
            )));
        }
        if self.farm_starting_stock < 0.0 || self.farm_production_rate < 0.0 {
            return Err(SimError::InvalidConfig(
                "farm stock and production must be non-negative".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.town_hall_tax_rate) {
            return Err(SimError::InvalidConfig(format!(
                "town_hall_tax_rate ({}) must be in [0, 1)",
                self.town_hall_tax_rate
            )));
        }
        Ok(())
    }
}
