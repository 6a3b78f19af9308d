//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One cell per step, driven by the scheduler
//! - Seeded RNG only (owned by the world generator)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod abilities;
pub mod fruit;
pub mod grid;
pub mod sample;
pub mod scheduler;
pub mod state;
pub mod tick;
pub mod world;

pub use abilities::{Abilities, Ability, AbilityTimer};
pub use fruit::{CANONICAL_FRUITS, FruitKind, FruitProfile, FruitTable};
pub use grid::Grid;
pub use scheduler::TickScheduler;
pub use state::{
    Direction, Food, GameEvent, GamePhase, GameState, OBSTACLE_KINDS, Obstacle, ObstacleKind,
    Rules, Snake, Snapshot,
};
pub use tick::{expire_abilities, step};
pub use world::{BoundedWorld, EndlessWorld, WorldGenerator, make_world};
