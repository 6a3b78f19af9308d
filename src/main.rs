//! Snake Sim headless runner
//!
//! Plays one game with a simple autopilot at 60 fps of simulated frame time
//! and prints the final snapshot as JSON.
//!
//! Usage: `snake-sim [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::time::Duration;

    use glam::IVec2;
    use snake_sim::sim::{Ability, Direction, FruitKind, GameState};
    use snake_sim::{Game, GameConfig, GameListener, dispatch};

    const FRAME: Duration = Duration::from_millis(16);
    /// Five minutes of frames
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    struct LogListener;

    impl GameListener for LogListener {
        fn on_eaten(&mut self, position: IVec2, kind: FruitKind) {
            log::info!("Ate {} at {}", kind.as_str(), position);
        }

        fn on_shield_broken(&mut self) {
            log::info!("Shield broken");
        }

        fn on_game_over(&mut self, final_score: u64) {
            log::info!("Game over, score {}", final_score);
        }

        fn on_ability_changed(&mut self, ability: Ability, active: bool) {
            log::info!("{} {}", ability.as_str(), if active { "on" } else { "off" });
        }
    }

    /// Steer toward the nearest food, avoiding cells that would crash
    fn autopilot(state: &GameState) -> Direction {
        let head = state.snake.head();
        let current = state.snake.direction;
        let target = state
            .food
            .iter()
            .min_by_key(|f| (state.grid.manhattan(f.position, head), f.id))
            .map(|f| f.position);

        [current, current.turn_left(), current.turn_right()]
            .into_iter()
            .filter_map(|dir| {
                let cell = state.grid.resolve(head + dir.vector())?;
                if state.obstacle_at(cell) {
                    return None;
                }
                let distance = target.map_or(0, |t| state.grid.manhattan(cell, t));
                Some((distance, dir))
            })
            .min_by_key(|(distance, _)| *distance)
            .map_or(current, |(_, dir)| dir)
    }

    fn load_config(path: Option<String>) -> Result<GameConfig, Box<dyn Error>> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                Ok(GameConfig::from_json(&json)?)
            }
            None => Ok(GameConfig::default()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(12345);
        let config = load_config(args.next())?;

        log::info!("Snake Sim (headless) starting...");
        let mut game = Game::new(config, seed)?;
        let mut listener = LogListener;

        for _ in 0..MAX_FRAMES {
            let direction = autopilot(game.state());
            game.set_direction(direction.vector());
            let events = game.update(FRAME);
            dispatch(&events, &mut listener);
            if game.state().is_over() {
                break;
            }
        }

        let snapshot = game.snapshot();
        log::info!(
            "Finished: score {}, distance {}, length {}",
            snapshot.score,
            snapshot.distance,
            snapshot.snake.len()
        );
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
