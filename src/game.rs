//! Game session
//!
//! Owns one run's state, its world generator and the tick scheduler, and
//! exposes the in-process API the view layer talks to: input mutators,
//! per-frame `update`, read-only snapshots and an event stream.
//!
//! Input only ever touches the pending direction. It is read at the start of
//! the next step, never mid-step.

use std::time::Duration;

use glam::IVec2;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::sim::{
    Ability, Direction, FruitKind, GameEvent, GamePhase, GameState, Snapshot, TickScheduler,
    WorldGenerator, expire_abilities, make_world, step,
};

/// Callback-style consumer of game events (HUD, audio, particles)
pub trait GameListener {
    fn on_eaten(&mut self, _position: IVec2, _kind: FruitKind) {}
    fn on_shield_broken(&mut self) {}
    fn on_game_over(&mut self, _final_score: u64) {}
    fn on_ability_changed(&mut self, _ability: Ability, _active: bool) {}
    fn on_score_changed(&mut self, _score: u64) {}
    fn on_speed_changed(&mut self, _speed: u32) {}
}

/// Forward events to a listener in order
pub fn dispatch(events: &[GameEvent], listener: &mut dyn GameListener) {
    for event in events {
        match *event {
            GameEvent::Eaten { position, kind } => listener.on_eaten(position, kind),
            GameEvent::ShieldBroken => listener.on_shield_broken(),
            GameEvent::GameOver { final_score } => listener.on_game_over(final_score),
            GameEvent::AbilityChanged { ability, active } => {
                listener.on_ability_changed(ability, active)
            }
            GameEvent::ScoreChanged { score } => listener.on_score_changed(score),
            GameEvent::SpeedChanged { speed } => listener.on_speed_changed(speed),
            GameEvent::GhostPass { .. } | GameEvent::Crashed { .. } => {}
        }
    }
}

/// One running game
pub struct Game {
    config: GameConfig,
    seed: u64,
    state: GameState,
    world: Box<dyn WorldGenerator>,
    scheduler: TickScheduler,
    pending_direction: Direction,
    /// Unpaused host time fed to `update`
    elapsed: Duration,
    /// Events raised outside a step (start of run), handed out by the next call
    queued: Vec<GameEvent>,
}

impl Game {
    /// Validate the config and start a run
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state, world) = Self::build(&config, seed);
        Ok(Self {
            scheduler: TickScheduler::new(config.scheduler),
            pending_direction: state.snake.direction,
            elapsed: Duration::ZERO,
            queued: Self::opening_events(&state),
            config,
            seed,
            state,
            world,
        })
    }

    /// Abilities already running when a run starts (spawn protection)
    fn opening_events(state: &GameState) -> Vec<GameEvent> {
        Ability::ALL
            .into_iter()
            .filter(|ability| state.abilities.is_active(*ability))
            .map(|ability| GameEvent::AbilityChanged {
                ability,
                active: true,
            })
            .collect()
    }

    fn build(config: &GameConfig, seed: u64) -> (GameState, Box<dyn WorldGenerator>) {
        let mut state = GameState::new(config);
        let mut world = make_world(config, seed);
        world.populate(&mut state);
        log::info!(
            "Game initialized with seed {} ({} {:?}/{:?}, {}x{})",
            seed,
            config.difficulty.as_str(),
            config.world,
            config.boundary,
            config.cols,
            config.rows
        );
        (state, world)
    }

    /// Replace the whole run with a fresh one. Stale timers go with the old state.
    pub fn reset(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let (state, world) = Self::build(&config, self.seed);
        self.scheduler = TickScheduler::new(config.scheduler);
        self.pending_direction = state.snake.direction;
        self.elapsed = Duration::ZERO;
        self.queued = Self::opening_events(&state);
        self.state = state;
        self.world = world;
        self.config = config;
        Ok(())
    }

    /// Restart with the current config and a new seed
    pub fn restart(&mut self, seed: u64) {
        self.seed = seed;
        let (state, world) = Self::build(&self.config, seed);
        self.scheduler.reset();
        self.pending_direction = state.snake.direction;
        self.elapsed = Duration::ZERO;
        self.queued = Self::opening_events(&state);
        self.state = state;
        self.world = world;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Direction the next step will use
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    fn accepts_input(&self) -> bool {
        self.state.phase == GamePhase::Playing
    }

    /// Steer with a unit vector. Non-unit vectors and reversals are rejected.
    pub fn set_direction(&mut self, vector: IVec2) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(direction) = Direction::from_vector(vector) else {
            log::debug!("Ignoring non-unit direction {}", vector);
            return false;
        };
        if direction == self.state.snake.direction.opposite() && self.state.snake.len() > 1 {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Rotate the current heading. The last turn before a step wins.
    pub fn turn_left(&mut self) {
        if self.accepts_input() {
            self.pending_direction = self.state.snake.direction.turn_left();
        }
    }

    pub fn turn_right(&mut self) {
        if self.accepts_input() {
            self.pending_direction = self.state.snake.direction.turn_right();
        }
    }

    /// Pause or resume. Returns whether the game is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.phase = match self.state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            GamePhase::GameOver => GamePhase::GameOver,
        };
        log::info!("Phase: {:?}", self.state.phase);
        self.state.is_paused()
    }

    /// Advance by `dt` of host time, firing as many steps as are due.
    ///
    /// The game clock reaches each step's due time before that step runs.
    /// Steps beyond the per-frame cap are carried over, and the clock waits
    /// for them. Nothing moves while paused: the game clock, ability
    /// deadlines, background spawner and scheduler debt all stay frozen.
    pub fn update(&mut self, dt: Duration) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.queued);
        if self.state.phase != GamePhase::Playing {
            return events;
        }

        self.elapsed += dt;
        self.scheduler.advance(dt);
        while !self.state.is_over() {
            let interval = self.interval();
            if !self.scheduler.take_step(interval) {
                break;
            }
            let due = self.elapsed.saturating_sub(self.scheduler.pending());
            self.advance_clock_to(due, &mut events);
            events.extend(self.step_now());
        }

        if !self.scheduler.is_behind(self.interval()) {
            self.advance_clock_to(self.elapsed, &mut events);
        }
        events
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.state.speed as u64)
    }

    /// Move the game clock forward to `target`, expiring abilities and
    /// feeding the background spawner on the way
    fn advance_clock_to(&mut self, target: Duration, events: &mut Vec<GameEvent>) {
        if self.state.phase != GamePhase::Playing || target <= self.state.clock {
            return;
        }
        let delta = target - self.state.clock;
        self.state.clock = target;
        expire_abilities(&mut self.state, events);
        self.world.advance_clock(&mut self.state, delta);
    }

    /// Run one step immediately, bypassing the scheduler
    pub fn step_now(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.queued);
        events.extend(step(
            &mut self.state,
            self.world.as_mut(),
            self.pending_direction,
        ));
        self.pending_direction = self.state.snake.direction;
        events
    }
}
