//! Game configuration
//!
//! Grid shape, boundary policy, world generation strategy and difficulty.
//! Validated once at construction; the simulation never re-checks it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::{FruitTable, Grid};

/// What happens at the grid edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Leaving the grid is a collision
    #[default]
    Clamp,
    /// Coordinates wrap to the opposite edge
    Wrap,
}

/// World population strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldMode {
    /// Obstacles seeded once at reset, plus a slow background spawner
    Bounded,
    /// Obstacles culled behind and spawned ahead of the head every tick
    #[default]
    Endless,
}

/// How the tick scheduler turns elapsed time into steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulerMode {
    /// At most one step per poll, next step due `speed` after the last
    Interval,
    /// Time debt carried over; several steps per poll if needed
    #[default]
    Accumulator,
}

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Obstacles scattered at reset
    pub fn obstacle_count(&self) -> usize {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Normal => 30,
            Difficulty::Hard => 45,
        }
    }

    /// Per-tick chance of spawning an obstacle ahead (endless mode)
    pub fn spawn_chance(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.1,
            Difficulty::Normal => 0.2,
            Difficulty::Hard => 0.3,
        }
    }

    /// Background spawner interval (bounded mode)
    pub fn background_interval(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_secs(8),
            Difficulty::Normal => Duration::from_secs(5),
            Difficulty::Hard => Duration::from_secs(3),
        }
    }

    /// Background spawner stops adding obstacles at this count
    pub fn background_cap(&self) -> usize {
        match self {
            Difficulty::Easy => 40,
            Difficulty::Normal => 60,
            Difficulty::Hard => 90,
        }
    }

    /// Starting tick interval in milliseconds
    pub fn initial_speed(&self) -> u32 {
        match self {
            Difficulty::Easy => 350,
            Difficulty::Normal => 300,
            Difficulty::Hard => 220,
        }
    }

    /// Tick interval bounds in milliseconds (fastest, slowest)
    pub fn speed_bounds(&self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (80, 500),
            Difficulty::Normal => (50, 500),
            Difficulty::Hard => (40, 400),
        }
    }
}

/// Full configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub cols: i32,
    pub rows: i32,
    pub boundary: BoundaryPolicy,
    pub world: WorldMode,
    pub difficulty: Difficulty,
    /// Concurrent food items kept on the map
    pub food_target: usize,
    pub initial_length: usize,
    /// Shrinking never goes below this
    pub min_length: usize,
    pub magnet_radius: i32,
    /// Whether running into the snake's own body is a collision
    pub self_collision: bool,
    /// Start each run with a short invincibility window
    pub spawn_protection: bool,
    pub scheduler: SchedulerMode,
    /// Overrides the difficulty's initial obstacle count
    pub obstacle_count: Option<usize>,
    /// Overrides the difficulty's endless spawn chance
    pub spawn_chance: Option<f64>,
    pub fruit_table: FruitTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: MAP_SIZE,
            rows: MAP_SIZE,
            boundary: BoundaryPolicy::Clamp,
            world: WorldMode::Endless,
            difficulty: Difficulty::Normal,
            food_target: 1,
            initial_length: INITIAL_LENGTH,
            min_length: MIN_LENGTH,
            magnet_radius: MAGNET_RADIUS,
            self_collision: false,
            spawn_protection: true,
            scheduler: SchedulerMode::Accumulator,
            obstacle_count: None,
            spawn_chance: None,
            fruit_table: FruitTable::default(),
        }
    }
}

impl GameConfig {
    /// Classic arena: hard walls, pre-seeded obstacles, a single fruit
    pub fn classic(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            boundary: BoundaryPolicy::Clamp,
            world: WorldMode::Bounded,
            food_target: 1,
            ..Default::default()
        }
    }

    /// Endless scrolling world on a wrapping grid with several fruits around
    pub fn endless(cols: i32, rows: i32, food_target: usize) -> Self {
        Self {
            cols,
            rows,
            boundary: BoundaryPolicy::Wrap,
            world: WorldMode::Endless,
            food_target,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.cols, self.rows, self.boundary)
    }

    pub fn initial_speed(&self) -> u32 {
        self.difficulty.initial_speed()
    }

    pub fn speed_bounds(&self) -> (u32, u32) {
        self.difficulty.speed_bounds()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacle_count
            .unwrap_or_else(|| self.difficulty.obstacle_count())
    }

    pub fn spawn_chance(&self) -> f64 {
        self.spawn_chance
            .unwrap_or_else(|| self.difficulty.spawn_chance())
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols <= 0 || self.rows <= 0 {
            return Err(ConfigError::GridSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        // The body is laid out leftwards from the centre column
        if self.initial_length == 0 || self.initial_length as i32 > self.cols / 2 + 1 {
            return Err(ConfigError::SnakeTooLong {
                length: self.initial_length,
                cols: self.cols,
            });
        }
        if self.min_length == 0 || self.min_length > self.initial_length {
            return Err(ConfigError::MinLength {
                min: self.min_length,
                initial: self.initial_length,
            });
        }
        if self.fruit_table.is_empty() {
            return Err(ConfigError::EmptyFruitTable);
        }
        if !self.fruit_table.has_valid_weights() {
            return Err(ConfigError::FruitWeights);
        }
        let initial = self.initial_speed();
        let (min, max) = self.speed_bounds();
        if min == 0 || min > max || !(min..=max).contains(&initial) {
            return Err(ConfigError::SpeedBounds { initial, min, max });
        }
        if self.food_target == 0 {
            return Err(ConfigError::FoodTarget);
        }
        if self.magnet_radius < 0 {
            return Err(ConfigError::MagnetRadius(self.magnet_radius));
        }
        let chance = self.spawn_chance();
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::SpawnProbability(chance));
        }
        Ok(())
    }
}
