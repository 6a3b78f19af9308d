//! Snake Sim - simulation core for an endless-world snake arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, eating, world population)
//! - `config`: Grid, boundary policy, difficulty presets and validation
//! - `game`: Session wrapper exposing the in-process API to a renderer/HUD
//! - `error`: Configuration errors

pub mod config;
pub mod error;
pub mod game;
pub mod sim;

pub use config::{BoundaryPolicy, Difficulty, GameConfig, SchedulerMode, WorldMode};
pub use error::ConfigError;
pub use game::{Game, GameListener, dispatch};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Default grid dimensions (square map)
    pub const MAP_SIZE: i32 = 60;

    /// Snake body length after a reset
    pub const INITIAL_LENGTH: usize = 5;
    /// Shrink effects never take the snake below this
    pub const MIN_LENGTH: usize = 3;

    /// Ability durations (game-clock time)
    pub const INVINCIBLE_DURATION: Duration = Duration::from_secs(5);
    pub const MAGNET_DURATION: Duration = Duration::from_secs(10);

    /// Manhattan eat radius while magnetized (0 otherwise)
    pub const MAGNET_RADIUS: i32 = 3;

    /// Obstacles further than this on both axes are culled (endless mode)
    pub const RENDER_DISTANCE: i32 = 25;
    /// Obstacles spawn this far ahead of the head, plus up to SPAWN_DISTANCE_BAND
    pub const SPAWN_DISTANCE_MIN: i32 = 15;
    pub const SPAWN_DISTANCE_BAND: i32 = 10;
    /// Lateral jitter range for spawned obstacles: [-SPAWN_JITTER, SPAWN_JITTER)
    pub const SPAWN_JITTER: i32 = 5;

    /// Food respawns within [-FOOD_OFFSET, FOOD_OFFSET) of the head on each axis
    pub const FOOD_OFFSET: i32 = 10;
    /// Clamp-grid food stays this far from the edges
    pub const FOOD_EDGE_MARGIN: i32 = 2;
    /// Starter fruit distance ahead of the head
    pub const STARTER_FRUIT_DISTANCE: i32 = 10;

    /// Chebyshev radius around the start kept free of obstacles
    pub const SAFE_RADIUS: i32 = 5;
    /// Placement attempts before a spawn is skipped for this cycle
    pub const PLACEMENT_ATTEMPTS: usize = 50;

    /// Maximum steps a scheduler may fire in one frame; the rest carry over
    pub const MAX_STEPS_PER_FRAME: u32 = 8;
}
