//! Game state and core simulation types
//!
//! Pure data plus the invariants that hold between steps. Behaviour lives in
//! `tick` (the step engine) and `world` (population).

use std::collections::VecDeque;
use std::time::Duration;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::abilities::{Abilities, Ability};
use super::fruit::{FruitKind, FruitProfile};
use super::grid::Grid;
use crate::config::GameConfig;

/// Heading of the snake. Screen coordinates: +y points down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector for this direction
    pub fn vector(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Parse a unit vector; anything else is not a direction
    pub fn from_vector(v: IVec2) -> Option<Self> {
        match (v.x, v.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Rotate 90 degrees: (dx, dy) -> (dy, -dx)
    pub fn turn_left(&self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Rotate 90 degrees: (dx, dy) -> (-dy, dx)
    pub fn turn_right(&self) -> Self {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// The snake: head at the front of `body`, tail at the back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub body: VecDeque<IVec2>,
    pub direction: Direction,
    /// Pending ticks on which the tail is kept (growth over time)
    pub growth_bank: u32,
}

impl Snake {
    /// Straight snake with its tail trailing behind `head`
    pub fn new(head: IVec2, direction: Direction, length: usize) -> Self {
        let step = direction.vector();
        let body = (0..length.max(1) as i32).map(|i| head - step * i).collect();
        Self {
            body,
            direction,
            growth_bank: 0,
        }
    }

    #[inline]
    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn tail(&self) -> IVec2 {
        self.body[self.body.len() - 1]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &IVec2> {
        self.body.iter()
    }

    pub fn occupies(&self, p: IVec2) -> bool {
        self.body.contains(&p)
    }

    pub fn push_head(&mut self, p: IVec2) {
        self.body.push_front(p);
    }

    pub fn pop_tail(&mut self) -> Option<IVec2> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    /// Drop tail segments until at most `len` remain (never below one)
    pub fn truncate(&mut self, len: usize) {
        self.body.truncate(len.max(1));
    }

    /// Every pair of consecutive segments is one step apart
    pub fn is_contiguous(&self, grid: &Grid) -> bool {
        self.body
            .iter()
            .zip(self.body.iter().skip(1))
            .all(|(a, b)| grid.manhattan(*a, *b) == 1)
    }
}

/// Obstacle look (collision treats all kinds alike)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Tree,
    Rock,
    Bush,
}

/// Obstacle kinds and selection weights
pub const OBSTACLE_KINDS: [(ObstacleKind, f64); 3] = [
    (ObstacleKind::Tree, 3.0),
    (ObstacleKind::Rock, 1.0),
    (ObstacleKind::Bush, 1.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub position: IVec2,
    pub kind: ObstacleKind,
    /// Render scale
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: u32,
    pub position: IVec2,
    /// Resolved when the item was spawned
    pub profile: FruitProfile,
}

impl Food {
    pub fn kind(&self) -> FruitKind {
        self.profile.kind
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    GameOver,
}

/// Things that happened during a step, for the renderer/HUD/audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Eaten { position: IVec2, kind: FruitKind },
    ScoreChanged { score: u64 },
    SpeedChanged { speed: u32 },
    AbilityChanged { ability: Ability, active: bool },
    ShieldBroken,
    /// Collision ignored while invincible
    GhostPass { position: IVec2 },
    Crashed { position: IVec2 },
    GameOver { final_score: u64 },
}

/// Rules the step engine needs, taken from the config at reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub min_length: usize,
    pub magnet_radius: i32,
    pub self_collision: bool,
    /// Tick interval bounds in milliseconds (fastest, slowest)
    pub speed_bounds: (u32, u32),
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub grid: Grid,
    pub rules: Rules,
    pub phase: GamePhase,
    pub snake: Snake,
    /// Sorted by id for deterministic iteration
    pub obstacles: Vec<Obstacle>,
    /// Sorted by id for deterministic iteration
    pub food: Vec<Food>,
    pub score: u64,
    /// Cells moved since reset
    pub distance: u64,
    /// Tick interval in milliseconds
    pub speed: u32,
    pub abilities: Abilities,
    /// Unpaused game time since reset
    pub clock: Duration,
    /// Steps that advanced the simulation
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Fresh state with the snake centred and heading right.
    ///
    /// Obstacles and food are left empty for the world generator to fill.
    pub fn new(config: &GameConfig) -> Self {
        let start = IVec2::new(config.cols / 2, config.rows / 2);
        let mut state = Self {
            grid: config.grid(),
            rules: Rules {
                min_length: config.min_length,
                magnet_radius: config.magnet_radius,
                self_collision: config.self_collision,
                speed_bounds: config.speed_bounds(),
            },
            phase: GamePhase::Playing,
            snake: Snake::new(start, Direction::Right, config.initial_length),
            obstacles: Vec::new(),
            food: Vec::new(),
            score: 0,
            distance: 0,
            speed: config.initial_speed(),
            abilities: Abilities::default(),
            clock: Duration::ZERO,
            time_ticks: 0,
            next_id: 1,
        };

        if config.spawn_protection {
            state.abilities.activate(Ability::Invincible, state.clock);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn obstacle_at(&self, p: IVec2) -> bool {
        self.obstacles.iter().any(|o| o.position == p)
    }

    pub fn food_at(&self, p: IVec2) -> bool {
        self.food.iter().any(|f| f.position == p)
    }

    /// No obstacle, food or snake segment on the cell
    pub fn is_free(&self, p: IVec2) -> bool {
        !self.obstacle_at(p) && !self.food_at(p) && !self.snake.occupies(p)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Ensure obstacles and food are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
        self.food.sort_by_key(|f| f.id);
    }

    /// Check body invariants. Asserts in debug builds, clamps and logs otherwise.
    pub fn enforce_invariants(&mut self) {
        debug_assert!(!self.snake.is_empty(), "snake has no segments");
        debug_assert!(
            self.snake.segments().all(|p| self.grid.contains(*p)),
            "snake segment outside grid"
        );

        if self.snake.is_empty() {
            log::warn!("Snake lost all segments, restoring head at grid centre");
            self.snake
                .push_head(IVec2::new(self.grid.cols / 2, self.grid.rows / 2));
        }
        let grid = self.grid;
        for segment in self.snake.body.iter_mut() {
            if !grid.contains(*segment) {
                log::warn!("Snake segment {} outside grid, clamping", segment);
                *segment = grid.confine(*segment, 0);
            }
        }
    }

    /// Read-only view handed to the renderer after a step
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.segments().copied().collect(),
            direction: self.snake.direction,
            obstacles: self.obstacles.clone(),
            food: self.food.clone(),
            score: self.score,
            distance: self.distance,
            speed: self.speed,
            paused: self.is_paused(),
            game_over: self.is_over(),
            invincible: self.abilities.is_active(Ability::Invincible),
            shielded: self.abilities.is_active(Ability::Shield),
            magnetized: self.abilities.is_active(Ability::Magnet),
            invincible_remaining: self.abilities.remaining(Ability::Invincible, self.clock),
            magnet_remaining: self.abilities.remaining(Ability::Magnet, self.clock),
        }
    }
}

/// Immutable copy of everything the view layer draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snake: Vec<IVec2>,
    pub direction: Direction,
    pub obstacles: Vec<Obstacle>,
    pub food: Vec<Food>,
    pub score: u64,
    pub distance: u64,
    pub speed: u32,
    pub paused: bool,
    pub game_over: bool,
    pub invincible: bool,
    pub shielded: bool,
    pub magnetized: bool,
    pub invincible_remaining: Option<Duration>,
    pub magnet_remaining: Option<Duration>,
}
