//! Simulation step
//!
//! Advances the snake by exactly one cell. The order matters:
//! boundary -> world update -> collision -> move -> eat -> tail.
//! Food is only checked after a committed move, so a tick can never both
//! crash and eat.

use glam::IVec2;

use super::abilities::Ability;
use super::state::{Direction, GameEvent, GamePhase, GameState};
use super::world::WorldGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collision {
    /// Off the edge of a clamping grid
    Wall,
    Obstacle,
    Body,
}

/// Advance the game by one tick in `direction`.
///
/// A direction that would reverse the snake onto itself is ignored. Returns the
/// events the view layer should react to; the engine itself performs no I/O.
pub fn step(
    state: &mut GameState,
    world: &mut dyn WorldGenerator,
    direction: Direction,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    state.time_ticks += 1;
    expire_abilities(state, &mut events);

    if direction != state.snake.direction.opposite() || state.snake.len() == 1 {
        state.snake.direction = direction;
    }

    let raw = state.snake.head() + state.snake.direction.vector();
    let resolved = state.grid.resolve(raw);
    let candidate = resolved.unwrap_or(raw);

    // World moves first so spawns can be kept off the candidate cell
    world.advance(state, candidate);

    if let Some(collision) = detect_collision(state, resolved) {
        if state.abilities.is_active(Ability::Invincible) {
            events.push(GameEvent::GhostPass {
                position: candidate,
            });
            // Ghosting through an obstacle is fine, through a wall is not
            if collision == Collision::Wall {
                return events;
            }
        } else if state.abilities.consume_shield() {
            log::info!("Shield absorbed a collision at {}", candidate);
            events.push(GameEvent::ShieldBroken);
            events.push(GameEvent::AbilityChanged {
                ability: Ability::Shield,
                active: false,
            });
            return events;
        } else {
            state.phase = GamePhase::GameOver;
            log::info!(
                "Crashed at {} ({:?}), final score {}",
                candidate,
                collision,
                state.score
            );
            events.push(GameEvent::Crashed {
                position: candidate,
            });
            events.push(GameEvent::GameOver {
                final_score: state.score,
            });
            return events;
        }
    }

    state.snake.push_head(candidate);
    state.distance += 1;

    let ate = eat(state, world, &mut events);
    if !ate {
        if state.snake.growth_bank > 0 {
            state.snake.growth_bank -= 1;
        } else {
            state.snake.pop_tail();
        }
    }

    state.enforce_invariants();
    state.normalize_order();
    events
}

/// Clear abilities whose deadline passed on the game clock
pub fn expire_abilities(state: &mut GameState, events: &mut Vec<GameEvent>) {
    for ability in state.abilities.expire(state.clock) {
        log::debug!("{} expired", ability.as_str());
        events.push(GameEvent::AbilityChanged {
            ability,
            active: false,
        });
    }
}

fn detect_collision(state: &GameState, resolved: Option<IVec2>) -> Option<Collision> {
    let Some(cell) = resolved else {
        return Some(Collision::Wall);
    };
    if state.obstacle_at(cell) {
        return Some(Collision::Obstacle);
    }
    if state.rules.self_collision {
        // The tail vacates its cell this tick unless the snake grows or eats
        let snake = &state.snake;
        let keeps_tail = snake.growth_bank > 0 || find_eaten(state, cell).is_some();
        let checked = if keeps_tail {
            snake.len()
        } else {
            snake.len() - 1
        };
        if snake.segments().take(checked).any(|p| *p == cell) {
            return Some(Collision::Body);
        }
    }
    None
}

/// Index of the food item eaten with the head at `head`, if any.
///
/// Nearest by Manhattan distance, ties to the lowest id.
fn find_eaten(state: &GameState, head: IVec2) -> Option<usize> {
    let radius = if state.abilities.is_active(Ability::Magnet) {
        state.rules.magnet_radius
    } else {
        0
    };
    state
        .food
        .iter()
        .enumerate()
        .map(|(i, f)| (state.grid.manhattan(f.position, head), f.id, i))
        .filter(|(distance, _, _)| *distance <= radius)
        .min_by_key(|(distance, id, _)| (*distance, *id))
        .map(|(_, _, i)| i)
}

/// Apply at most one food item. Returns whether the tail was already handled.
fn eat(state: &mut GameState, world: &mut dyn WorldGenerator, events: &mut Vec<GameEvent>) -> bool {
    let Some(index) = find_eaten(state, state.snake.head()) else {
        return false;
    };
    let food = state.food.remove(index);
    let profile = food.profile;
    log::debug!("Ate {} at {}", profile.kind.as_str(), food.position);
    events.push(GameEvent::Eaten {
        position: food.position,
        kind: profile.kind,
    });

    if profile.score_delta != 0 {
        state.score = state.score.saturating_add_signed(profile.score_delta as i64);
        events.push(GameEvent::ScoreChanged { score: state.score });
    }

    if profile.speed_delta != 0 {
        let (fastest, slowest) = state.rules.speed_bounds;
        let speed = (state.speed as i64 + profile.speed_delta as i64)
            .clamp(fastest as i64, slowest as i64) as u32;
        if speed != state.speed {
            state.speed = speed;
            events.push(GameEvent::SpeedChanged { speed });
        }
    }

    // Not popping the tail this tick already grows the snake by one
    if profile.growth_delta > 0 {
        state.snake.growth_bank += profile.growth_delta as u32 - 1;
    } else if profile.growth_delta < 0 {
        let previous = state.snake.len() - 1;
        let shrink = profile.growth_delta.unsigned_abs() as usize;
        let target = previous.saturating_sub(shrink).max(state.rules.min_length);
        state.snake.truncate(target);
    }

    if let Some(ability) = profile.effect {
        state.abilities.activate(ability, state.clock);
        events.push(GameEvent::AbilityChanged {
            ability,
            active: true,
        });
    }

    world.replace_food(state);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::{BoundaryPolicy, GameConfig, WorldMode};
    use crate::sim::fruit::{FruitKind, FruitTable};
    use crate::sim::state::{Food, Obstacle, ObstacleKind};
    use crate::sim::world::EndlessWorld;
    use proptest::prelude::*;

    /// Generator that never spawns or replaces anything
    struct StillWorld;

    impl WorldGenerator for StillWorld {
        fn mode(&self) -> WorldMode {
            WorldMode::Bounded
        }
        fn populate(&mut self, _state: &mut GameState) {}
        fn advance(&mut self, _state: &mut GameState, _candidate: IVec2) {}
        fn replace_food(&mut self, _state: &mut GameState) {}
    }

    fn config() -> GameConfig {
        GameConfig {
            spawn_protection: false,
            ..GameConfig::classic(20, 20)
        }
    }

    fn fresh() -> GameState {
        GameState::new(&config())
    }

    fn put_food(state: &mut GameState, position: IVec2, kind: FruitKind) -> u32 {
        let profile = *FruitTable::default().profile(kind).unwrap();
        let id = state.next_entity_id();
        state.food.push(Food {
            id,
            position,
            profile,
        });
        id
    }

    fn put_obstacle(state: &mut GameState, position: IVec2) {
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            position,
            kind: ObstacleKind::Rock,
            scale: 1.0,
        });
    }

    #[test]
    fn test_plain_move_translates() {
        let mut state = fresh();
        let before: Vec<IVec2> = state.snake.segments().copied().collect();
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(events.is_empty());
        assert_eq!(state.snake.len(), 5);
        assert_eq!(state.snake.head(), IVec2::new(11, 10));
        assert!(!state.snake.occupies(before[4]));
        assert_eq!(state.snake.tail(), before[3]);
        assert_eq!(state.distance, 1);
    }

    #[test]
    fn test_reverse_direction_is_ignored() {
        let mut state = fresh();
        step(&mut state, &mut StillWorld, Direction::Left);
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.snake.head(), IVec2::new(11, 10));
    }

    #[test]
    fn test_wall_crash_is_fatal() {
        let mut state = fresh();
        for _ in 0..9 {
            step(&mut state, &mut StillWorld, Direction::Right);
        }
        assert_eq!(state.snake.head(), IVec2::new(19, 10));
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(state.is_over());
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 0 }));
        assert_eq!(state.snake.head(), IVec2::new(19, 10));

        // Game over is sticky
        assert!(step(&mut state, &mut StillWorld, Direction::Up).is_empty());
    }

    #[test]
    fn test_wrap_moves_to_opposite_edge() {
        let mut config = config();
        config.boundary = BoundaryPolicy::Wrap;
        let mut state = GameState::new(&config);
        for _ in 0..10 {
            step(&mut state, &mut StillWorld, Direction::Right);
        }
        assert!(!state.is_over());
        assert_eq!(state.snake.head(), IVec2::new(0, 10));
        assert!(state.snake.is_contiguous(&state.grid));
    }

    #[test]
    fn test_shield_absorbs_one_collision() {
        let mut state = fresh();
        put_obstacle(&mut state, IVec2::new(11, 10));
        state.abilities.activate(Ability::Shield, state.clock);
        let before = state.snake.clone();

        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(events.contains(&GameEvent::ShieldBroken));
        assert_eq!(state.snake, before);
        assert!(!state.abilities.is_active(Ability::Shield));
        assert!(!state.is_over());

        step(&mut state, &mut StillWorld, Direction::Right);
        assert!(state.is_over());
    }

    #[test]
    fn test_invincible_passes_through_obstacles() {
        let mut state = fresh();
        put_obstacle(&mut state, IVec2::new(11, 10));
        state.abilities.activate(Ability::Invincible, state.clock);
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(
            events,
            vec![GameEvent::GhostPass {
                position: IVec2::new(11, 10)
            }]
        );
        assert_eq!(state.snake.head(), IVec2::new(11, 10));
        assert_eq!(state.snake.len(), 5);
        assert!(!state.is_over());
    }

    #[test]
    fn test_invincible_holds_at_wall() {
        let mut state = fresh();
        for _ in 0..9 {
            step(&mut state, &mut StillWorld, Direction::Right);
        }
        state.abilities.activate(Ability::Invincible, state.clock);
        let before = state.snake.clone();
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake, before);
        assert!(!state.is_over());
    }

    #[test]
    fn test_invincibility_expires_on_game_clock() {
        let mut state = fresh();
        state.abilities.activate(Ability::Invincible, state.clock);
        state.clock = Duration::from_secs(5);
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(events.contains(&GameEvent::AbilityChanged {
            ability: Ability::Invincible,
            active: false
        }));
    }

    #[test]
    fn test_growth_bank() {
        let mut state = fresh();
        put_food(&mut state, IVec2::new(11, 10), FruitKind::Cherry);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.growth_bank, 2);
        assert_eq!(state.snake.len(), 6);
        assert_eq!(state.score, 5);

        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 7);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 8);
        assert_eq!(state.snake.growth_bank, 0);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 8);
    }

    #[test]
    fn test_shrink_is_floored() {
        let mut state = fresh();
        state.snake.growth_bank = 1;
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 6);

        put_food(&mut state, IVec2::new(12, 10), FruitKind::Mushroom);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), IVec2::new(12, 10));

        put_food(&mut state, IVec2::new(13, 10), FruitKind::Mushroom);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_speed_clamped() {
        let mut state = fresh();
        state.speed = 60;
        put_food(&mut state, IVec2::new(11, 10), FruitKind::Banana);
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.speed, 50);
        assert!(events.contains(&GameEvent::SpeedChanged { speed: 50 }));
    }

    #[test]
    fn test_magnet_radius() {
        let mut state = fresh();
        put_food(&mut state, IVec2::new(12, 11), FruitKind::Apple);
        step(&mut state, &mut StillWorld, Direction::Right);
        assert_eq!(state.food.len(), 1, "distance 2 without magnet is not eaten");

        let mut state = fresh();
        put_food(&mut state, IVec2::new(12, 11), FruitKind::Apple);
        state.abilities.activate(Ability::Magnet, state.clock);
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(state.food.is_empty());
        assert!(events.contains(&GameEvent::Eaten {
            position: IVec2::new(12, 11),
            kind: FruitKind::Apple
        }));
    }

    #[test]
    fn test_magnet_eats_nearest_then_lowest_id() {
        let mut state = fresh();
        state.abilities.activate(Ability::Magnet, state.clock);
        let far = put_food(&mut state, IVec2::new(11, 13), FruitKind::Apple);
        let tie_b = put_food(&mut state, IVec2::new(11, 9), FruitKind::Banana);
        let tie_a = put_food(&mut state, IVec2::new(12, 10), FruitKind::Cherry);
        step(&mut state, &mut StillWorld, Direction::Right);
        let left: Vec<u32> = state.food.iter().map(|f| f.id).collect();
        assert_eq!(left, vec![far, tie_a]);
        assert!(tie_b < tie_a);
    }

    #[test]
    fn test_ability_fruit_activates() {
        let mut state = fresh();
        put_food(&mut state, IVec2::new(11, 10), FruitKind::Star);
        let events = step(&mut state, &mut StillWorld, Direction::Right);
        assert!(state.abilities.is_active(Ability::Invincible));
        assert!(events.contains(&GameEvent::AbilityChanged {
            ability: Ability::Invincible,
            active: true
        }));
        // Effect fruit has no growth of its own but still keeps the tail
        assert_eq!(state.snake.len(), 6);
    }

    #[test]
    fn test_self_collision_flag() {
        let mut config = config();
        config.self_collision = true;
        let mut state = GameState::new(&config);
        state.snake.growth_bank = 10;
        for dir in [Direction::Right, Direction::Down, Direction::Left, Direction::Up] {
            step(&mut state, &mut StillWorld, dir);
        }
        assert!(state.is_over());

        let mut state = fresh();
        state.snake.growth_bank = 10;
        for dir in [Direction::Right, Direction::Down, Direction::Left, Direction::Up] {
            step(&mut state, &mut StillWorld, dir);
        }
        assert!(!state.is_over(), "body is passable by default");
    }

    #[test]
    fn test_self_collision_with_tail_kept_by_eating() {
        let mut config = config();
        config.self_collision = true;
        let mut state = GameState::new(&config);
        // Square loop: the next cell to the right is the tail
        state.snake.body = [(5, 5), (5, 6), (6, 6), (6, 5)]
            .into_iter()
            .map(|(x, y)| IVec2::new(x, y))
            .collect();
        state.snake.direction = Direction::Up;
        let mut looped = state.clone();

        step(&mut state, &mut StillWorld, Direction::Right);
        assert!(!state.is_over(), "tail moves out of the way");
        assert_eq!(state.snake.head(), IVec2::new(6, 5));

        put_food(&mut looped, IVec2::new(6, 7), FruitKind::Apple);
        looped.abilities.activate(Ability::Magnet, looped.clock);
        step(&mut looped, &mut StillWorld, Direction::Right);
        assert!(looped.is_over(), "eating keeps the tail in place");
        assert_eq!(looped.food.len(), 1);
    }

    #[test]
    fn test_replacement_food_near_head() {
        let config = GameConfig {
            obstacle_count: Some(0),
            spawn_chance: Some(0.0),
            spawn_protection: false,
            ..GameConfig::default()
        };
        let mut state = GameState::new(&config);
        let mut world = EndlessWorld::new(&config, 77);
        state.food.clear();
        state.abilities.activate(Ability::Magnet, state.clock);
        put_food(&mut state, IVec2::new(32, 31), FruitKind::Apple);

        step(&mut state, &mut world, Direction::Right);
        assert_eq!(state.score, 1);
        assert_eq!(state.food.len(), 1);
        let head = state.snake.head();
        let d = state.grid.axis_distance(state.food[0].position, head);
        assert!(d.x <= 10 && d.y <= 10);
        assert!(state.grid.contains(state.food[0].position));
    }

    #[test]
    fn test_paused_is_noop() {
        let mut state = fresh();
        state.phase = GamePhase::Paused;
        let before = state.snake.clone();
        assert!(step(&mut state, &mut StillWorld, Direction::Right).is_empty());
        assert_eq!(state.snake, before);
        assert_eq!(state.time_ticks, 0);
    }

    fn turn_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_free_moves_keep_length_and_shape(dirs in proptest::collection::vec(turn_strategy(), 1..60)) {
            let mut config = config();
            config.boundary = BoundaryPolicy::Wrap;
            let mut state = GameState::new(&config);
            for dir in dirs {
                let head = state.snake.head();
                step(&mut state, &mut StillWorld, dir);
                let moved = state.snake.direction.vector();
                prop_assert_eq!(state.snake.len(), 5);
                prop_assert_eq!(state.snake.head(), state.grid.wrap(head + moved));
                prop_assert!(state.snake.is_contiguous(&state.grid));
            }
        }
    }
}
