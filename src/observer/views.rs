//! Textual views over the observer event stream
//!
//! Views remember only what they render: the map keeps name→location, the
//! info tables keep name→value. A first mention of a name is an implicit
//! introduction, and `removed` for a name a view never saw does nothing.
//! Drawing produces a `String`; putting it on a terminal is the driver's
//! business.

use crate::core::error::{Result, SimError};
use crate::core::types::Point;
use crate::observer::Observer;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const DEFAULT_MAP_SIZE: i32 = 25;
const DEFAULT_MAP_SCALE: f64 = 2.0;
const DEFAULT_MAP_ORIGIN: Point = Point { x: -10.0, y: -10.0 };
const MIN_MAP_SIZE: i32 = 7;
const MAX_MAP_SIZE: i32 = 30;
const EMPTY_CELL: &str = ". ";
const CROWDED_CELL: &str = "* ";
const AXIS_LABEL_EVERY: i32 = 3;

/// Scrollable, zoomable character-grid map of the world
pub struct MapView {
    size: i32,
    scale: f64,
    origin: Point,
    objects: BTreeMap<String, Point>,
}

impl MapView {
    pub fn new() -> Self {
        Self {
            size: DEFAULT_MAP_SIZE,
            scale: DEFAULT_MAP_SCALE,
            origin: DEFAULT_MAP_ORIGIN,
            objects: BTreeMap::new(),
        }
    }

    /// Change the grid edge length, within the displayable bounds
    pub fn set_size(&mut self, size: i32) -> Result<()> {
        if size > MAX_MAP_SIZE {
            return Err(SimError::MapSizeTooBig);
        }
        if size < MIN_MAP_SIZE {
            return Err(SimError::MapSizeTooSmall);
        }
        self.size = size;
        Ok(())
    }

    /// Change world units per cell
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        if scale <= 0.0 {
            return Err(SimError::MapScaleNotPositive);
        }
        self.scale = scale;
        Ok(())
    }

    /// Move the lower-left corner; any origin is legal
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_defaults(&mut self) {
        self.size = DEFAULT_MAP_SIZE;
        self.scale = DEFAULT_MAP_SCALE;
        self.origin = DEFAULT_MAP_ORIGIN;
    }

    /// Cell subscripts for a location, or None when it falls off the grid
    fn subscripts(&self, location: Point) -> Option<(usize, usize)> {
        let col = ((location.x - self.origin.x) / self.scale).floor() as i64;
        let row = ((location.y - self.origin.y) / self.scale).floor() as i64;
        if col < 0 || col >= self.size as i64 || row < 0 || row >= self.size as i64 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Render the map: parameters, off-grid objects, then the grid with
    /// axis labels every third row and column
    pub fn draw(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Display size: {}, scale: {:.2}, origin: {}",
            self.size, self.scale, self.origin
        );

        let n = self.size as usize;
        let mut grid = vec![vec![EMPTY_CELL.to_string(); n]; n];
        let mut outside: Vec<&str> = Vec::new();
        for (name, location) in &self.objects {
            match self.subscripts(*location) {
                Some((col, row)) => {
                    let cell = &mut grid[row][col];
                    if cell == EMPTY_CELL {
                        let label: String = name.chars().take(2).collect();
                        *cell = format!("{:<2}", label);
                    } else {
                        *cell = CROWDED_CELL.to_string();
                    }
                }
                None => outside.push(name),
            }
        }
        if !outside.is_empty() {
            let _ = writeln!(out, "{} outside the map", outside.join(", "));
        }

        for row in (0..self.size).rev() {
            if row % AXIS_LABEL_EVERY == 0 {
                let label = f64::from(row) * self.scale + self.origin.y;
                let _ = write!(out, "{:>4.0} ", label);
            } else {
                out.push_str("     ");
            }
            for cell in &grid[row as usize] {
                out.push_str(cell);
            }
            out.push('\n');
        }
        for col in 0..self.size {
            if col % AXIS_LABEL_EVERY == 0 {
                let label = f64::from(col) * self.scale + self.origin.x;
                let _ = write!(out, "  {:>4.0}", label);
            }
        }
        out.push('\n');
        out
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MapView {
    fn location_changed(&mut self, name: &str, location: Point) {
        self.objects.insert(name.to_string(), location);
    }

    fn removed(&mut self, name: &str) {
        self.objects.remove(name);
    }
}

/// Table of the latest health value per agent
pub struct HealthView {
    rows: BTreeMap<String, i32>,
}

impl HealthView {
    pub fn new() -> Self {
        Self { rows: BTreeMap::new() }
    }

    pub fn draw(&self) -> String {
        let mut out = String::from("Current health:\n--------------\n");
        for (name, health) in &self.rows {
            let _ = writeln!(out, "{}: {}", name, health);
        }
        out.push_str("--------------\n");
        out
    }
}

impl Default for HealthView {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for HealthView {
    fn health_changed(&mut self, name: &str, health: i32) {
        self.rows.insert(name.to_string(), health);
    }

    fn removed(&mut self, name: &str) {
        self.rows.remove(name);
    }
}

/// Table of the latest stored amount per structure
pub struct AmountView {
    rows: BTreeMap<String, f64>,
}

impl AmountView {
    pub fn new() -> Self {
        Self { rows: BTreeMap::new() }
    }

    pub fn draw(&self) -> String {
        let mut out = String::from("Current amounts:\n--------------\n");
        for (name, amount) in &self.rows {
            let _ = writeln!(out, "{}: {:.2}", name, amount);
        }
        out.push_str("--------------\n");
        out
    }
}

impl Default for AmountView {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for AmountView {
    fn amount_changed(&mut self, name: &str, amount: f64) {
        self.rows.insert(name.to_string(), amount);
    }

    fn removed(&mut self, name: &str) {
        self.rows.remove(name);
    }
}
