//! World population
//!
//! Two strategies behind one trait:
//! - `BoundedWorld`: obstacles scattered once at reset, topped up slowly by a
//!   background timer; food placed anywhere free.
//! - `EndlessWorld`: the "infinite window". Obstacles far from the head are
//!   culled and new ones spawn ahead of it each tick; food respawns near the
//!   head so the player is never far from the next item.
//!
//! Each generator owns a seeded `Pcg32`, so a given seed reproduces the same
//! world for the same sequence of moves.

use std::time::Duration;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::fruit::{FruitKind, FruitTable};
use super::sample::{find_free_cell, pick_weighted_with};
use super::state::{Food, GameState, OBSTACLE_KINDS, Obstacle};
use crate::config::{GameConfig, WorldMode};
use crate::consts::*;

/// Populates and re-populates obstacles and food
pub trait WorldGenerator {
    fn mode(&self) -> WorldMode;

    /// Fill a freshly reset state
    fn populate(&mut self, state: &mut GameState);

    /// Per-tick update around the candidate head, before collision testing.
    ///
    /// Must never place an obstacle on `candidate`.
    fn advance(&mut self, state: &mut GameState, candidate: IVec2);

    /// Replace food after an item was eaten (the item is already removed)
    fn replace_food(&mut self, state: &mut GameState);

    /// Frame-time hook for background spawners; not called while paused
    fn advance_clock(&mut self, _state: &mut GameState, _dt: Duration) {}
}

/// Build the generator selected by the config
pub fn make_world(config: &GameConfig, seed: u64) -> Box<dyn WorldGenerator> {
    match config.world {
        WorldMode::Bounded => Box::new(BoundedWorld::new(config, seed)),
        WorldMode::Endless => Box::new(EndlessWorld::new(config, seed)),
    }
}

fn random_obstacle<R: Rng>(rng: &mut R, state: &mut GameState, position: IVec2) -> Obstacle {
    let kind = pick_weighted_with(rng, &OBSTACLE_KINDS, |k| k.1)
        .map(|k| k.0)
        .unwrap_or_default();
    Obstacle {
        id: state.next_entity_id(),
        position,
        kind,
        scale: rng.random_range(0.8..1.6),
    }
}

fn random_cell<R: Rng>(rng: &mut R, state: &GameState) -> IVec2 {
    IVec2::new(
        rng.random_range(0..state.grid.cols),
        rng.random_range(0..state.grid.rows),
    )
}

/// Scatter obstacles uniformly, keeping clear of `start`
fn scatter_obstacles<R: Rng>(rng: &mut R, state: &mut GameState, count: usize, start: IVec2) {
    let mut placed = 0;
    for _ in 0..count {
        let cell = find_free_cell(
            rng,
            PLACEMENT_ATTEMPTS,
            |r| Some(random_cell(r, &*state)),
            |c| {
                let d = state.grid.axis_distance(c, start);
                (d.x > SAFE_RADIUS || d.y > SAFE_RADIUS) && state.is_free(c)
            },
        );
        if let Some(cell) = cell {
            let obstacle = random_obstacle(rng, state, cell);
            state.obstacles.push(obstacle);
            placed += 1;
        }
    }
    if placed < count {
        log::debug!("Scattered {}/{} obstacles (no free cell for the rest)", placed, count);
    }
}

fn spawn_food<R: Rng>(rng: &mut R, table: &FruitTable, state: &mut GameState, position: IVec2) {
    let Some(profile) = table.pick_with(rng).copied() else {
        return;
    };
    let id = state.next_entity_id();
    state.food.push(Food {
        id,
        position,
        profile,
    });
}

/// Add food until the target count is reached or placement fails.
///
/// A failed placement is retried on the next call.
fn top_up_food<R: Rng>(
    rng: &mut R,
    table: &FruitTable,
    state: &mut GameState,
    target: usize,
    avoid: IVec2,
    mut propose: impl FnMut(&mut R, &GameState) -> IVec2,
) {
    while state.food.len() < target {
        let cell = find_free_cell(
            rng,
            PLACEMENT_ATTEMPTS,
            |r| Some(propose(r, &*state)),
            |c| c != avoid && state.is_free(c),
        );
        match cell {
            Some(cell) => spawn_food(rng, table, state, cell),
            None => {
                log::debug!("No free cell for food, retrying next tick");
                break;
            }
        }
    }
}

/// Pre-seeded arena with a slow background spawner
#[derive(Debug, Clone)]
pub struct BoundedWorld {
    rng: Pcg32,
    fruit_table: FruitTable,
    obstacle_count: usize,
    food_target: usize,
    background_interval: Duration,
    background_cap: usize,
    background_elapsed: Duration,
}

impl BoundedWorld {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            fruit_table: config.fruit_table.clone(),
            obstacle_count: config.obstacle_count(),
            food_target: config.food_target,
            background_interval: config.difficulty.background_interval(),
            background_cap: config.difficulty.background_cap(),
            background_elapsed: Duration::ZERO,
        }
    }

    fn top_up(&mut self, state: &mut GameState, avoid: IVec2) {
        top_up_food(
            &mut self.rng,
            &self.fruit_table,
            state,
            self.food_target,
            avoid,
            |r, s| random_cell(r, s),
        );
    }
}

impl WorldGenerator for BoundedWorld {
    fn mode(&self) -> WorldMode {
        WorldMode::Bounded
    }

    fn populate(&mut self, state: &mut GameState) {
        state.obstacles.clear();
        state.food.clear();
        self.background_elapsed = Duration::ZERO;

        let head = state.snake.head();
        scatter_obstacles(&mut self.rng, state, self.obstacle_count, head);
        self.top_up(state, head);
        state.normalize_order();
        log::info!(
            "Bounded world: {} obstacles, {} food",
            state.obstacles.len(),
            state.food.len()
        );
    }

    fn advance(&mut self, state: &mut GameState, candidate: IVec2) {
        self.top_up(state, candidate);
    }

    fn replace_food(&mut self, state: &mut GameState) {
        let head = state.snake.head();
        self.top_up(state, head);
    }

    fn advance_clock(&mut self, state: &mut GameState, dt: Duration) {
        self.background_elapsed += dt;
        while self.background_elapsed >= self.background_interval {
            self.background_elapsed -= self.background_interval;
            if state.obstacles.len() >= self.background_cap {
                continue;
            }

            // Nothing within two steps of the head
            let head = state.snake.head();
            let cell = find_free_cell(
                &mut self.rng,
                PLACEMENT_ATTEMPTS,
                |r| Some(random_cell(r, &*state)),
                |c| state.grid.manhattan(c, head) > 2 && state.is_free(c),
            );
            match cell {
                Some(cell) => {
                    let obstacle = random_obstacle(&mut self.rng, state, cell);
                    state.obstacles.push(obstacle);
                }
                None => log::debug!("Background spawner found no free cell"),
            }
        }
    }
}

/// Scrolling window of obstacles and food around the head
#[derive(Debug, Clone)]
pub struct EndlessWorld {
    rng: Pcg32,
    fruit_table: FruitTable,
    obstacle_count: usize,
    spawn_chance: f64,
    food_target: usize,
}

impl EndlessWorld {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            fruit_table: config.fruit_table.clone(),
            obstacle_count: config.obstacle_count(),
            spawn_chance: config.spawn_chance(),
            food_target: config.food_target,
        }
    }

    fn top_up(&mut self, state: &mut GameState, head: IVec2) {
        top_up_food(
            &mut self.rng,
            &self.fruit_table,
            state,
            self.food_target,
            head,
            |r, s| {
                let offset = IVec2::new(
                    r.random_range(-FOOD_OFFSET..FOOD_OFFSET),
                    r.random_range(-FOOD_OFFSET..FOOD_OFFSET),
                );
                s.grid.confine(head + offset, FOOD_EDGE_MARGIN)
            },
        );
    }

    /// Drop obstacles outside the square window around the head
    fn cull(&self, state: &mut GameState, head: IVec2) {
        let grid = state.grid;
        let before = state.obstacles.len();
        state.obstacles.retain(|o| {
            let d = grid.axis_distance(o.position, head);
            // Culled only once both axes are beyond the render distance
            d.x <= RENDER_DISTANCE || d.y <= RENDER_DISTANCE
        });
        let culled = before - state.obstacles.len();
        if culled > 0 {
            log::debug!("Culled {} obstacles", culled);
        }
    }

    /// Maybe spawn one obstacle ahead of the direction of travel
    fn spawn_ahead(&mut self, state: &mut GameState, head: IVec2) {
        if !self.rng.random_bool(self.spawn_chance) {
            return;
        }
        let distance = SPAWN_DISTANCE_MIN + self.rng.random_range(0..SPAWN_DISTANCE_BAND);
        let jitter = IVec2::new(
            self.rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
            self.rng.random_range(-SPAWN_JITTER..SPAWN_JITTER),
        );
        let raw = head + state.snake.direction.vector() * distance + jitter;

        let Some(cell) = state.grid.resolve(raw) else {
            return;
        };
        if cell == head || !state.is_free(cell) {
            return;
        }
        let obstacle = random_obstacle(&mut self.rng, state, cell);
        state.obstacles.push(obstacle);
    }
}

impl WorldGenerator for EndlessWorld {
    fn mode(&self) -> WorldMode {
        WorldMode::Endless
    }

    fn populate(&mut self, state: &mut GameState) {
        state.obstacles.clear();
        state.food.clear();

        let head = state.snake.head();
        scatter_obstacles(&mut self.rng, state, self.obstacle_count, head);

        // Starter apple straight ahead
        let ahead = head + state.snake.direction.vector() * STARTER_FRUIT_DISTANCE;
        if let Some(cell) = state.grid.resolve(ahead) {
            if state.is_free(cell) {
                if let Some(profile) = self.fruit_table.profile(FruitKind::Apple).copied() {
                    let id = state.next_entity_id();
                    state.food.push(Food {
                        id,
                        position: cell,
                        profile,
                    });
                }
            }
        }

        self.top_up(state, head);
        state.normalize_order();
        log::info!(
            "Endless world: {} obstacles, {} food",
            state.obstacles.len(),
            state.food.len()
        );
    }

    fn advance(&mut self, state: &mut GameState, candidate: IVec2) {
        self.cull(state, candidate);
        self.spawn_ahead(state, candidate);
        self.top_up(state, candidate);
    }

    fn replace_food(&mut self, state: &mut GameState) {
        let head = state.snake.head();
        self.top_up(state, head);
    }
}
