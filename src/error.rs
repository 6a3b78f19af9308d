//! Configuration errors
//!
//! Everything else the simulation resolves locally (retry, skip, clamp-and-log);
//! only a bad configuration is surfaced to the caller as an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive (got {cols}x{rows})")]
    GridSize { cols: i32, rows: i32 },
    #[error("initial snake length {length} does not fit a grid {cols} columns wide")]
    SnakeTooLong { length: usize, cols: i32 },
    #[error("minimum length {min} must be between 1 and the initial length {initial}")]
    MinLength { min: usize, initial: usize },
    #[error("fruit table is empty")]
    EmptyFruitTable,
    #[error("fruit weights must be finite, non-negative and sum to a positive value")]
    FruitWeights,
    #[error("speed bounds invalid: initial {initial} not within [{min}, {max}] or min is zero")]
    SpeedBounds { initial: u32, min: u32, max: u32 },
    #[error("food target must be at least 1")]
    FoodTarget,
    #[error("magnet radius must be non-negative (got {0})")]
    MagnetRadius(i32),
    #[error("spawn probability must be within [0, 1] (got {0})")]
    SpawnProbability(f64),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
