//! Timed ability flags
//!
//! Deadlines are measured on the game clock (`GameState::clock`), which only
//! advances while the game is running. Pausing therefore freezes remaining
//! durations, and a reset starts a fresh clock so stale deadlines simply
//! disappear with the old state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{INVINCIBLE_DURATION, MAGNET_DURATION};

/// Abilities a fruit can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Collisions are detected but not fatal ("ghost mode")
    Invincible,
    /// Absorbs exactly one collision, no timer
    Shield,
    /// Widens the eat radius
    Magnet,
}

impl Ability {
    pub const ALL: [Ability; 3] = [Ability::Invincible, Ability::Shield, Ability::Magnet];

    /// How long the ability lasts once activated (`None` = until consumed)
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Ability::Invincible => Some(INVINCIBLE_DURATION),
            Ability::Magnet => Some(MAGNET_DURATION),
            Ability::Shield => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Invincible => "invincible",
            Ability::Shield => "shield",
            Ability::Magnet => "magnet",
        }
    }
}

/// One ability's flag and optional deadline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityTimer {
    pub active: bool,
    pub expires_at: Option<Duration>,
}

/// All ability state for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abilities {
    pub invincible: AbilityTimer,
    pub shield: AbilityTimer,
    pub magnet: AbilityTimer,
}

impl Abilities {
    fn timer(&self, ability: Ability) -> &AbilityTimer {
        match ability {
            Ability::Invincible => &self.invincible,
            Ability::Shield => &self.shield,
            Ability::Magnet => &self.magnet,
        }
    }

    fn timer_mut(&mut self, ability: Ability) -> &mut AbilityTimer {
        match ability {
            Ability::Invincible => &mut self.invincible,
            Ability::Shield => &mut self.shield,
            Ability::Magnet => &mut self.magnet,
        }
    }

    pub fn is_active(&self, ability: Ability) -> bool {
        self.timer(ability).active
    }

    /// Activate (or re-trigger) an ability. Re-triggering restarts the window.
    pub fn activate(&mut self, ability: Ability, now: Duration) {
        let timer = self.timer_mut(ability);
        timer.active = true;
        timer.expires_at = ability.duration().map(|d| now + d);
    }

    /// Clear an ability regardless of its deadline. Returns whether it was active.
    pub fn clear(&mut self, ability: Ability) -> bool {
        let timer = self.timer_mut(ability);
        let was_active = timer.active;
        *timer = AbilityTimer::default();
        was_active
    }

    /// Use up the shield. Returns false if there was none.
    pub fn consume_shield(&mut self) -> bool {
        self.clear(Ability::Shield)
    }

    /// Clear every ability whose deadline has passed, returning the ones cleared
    pub fn expire(&mut self, now: Duration) -> Vec<Ability> {
        let mut expired = Vec::new();
        for ability in Ability::ALL {
            let timer = self.timer_mut(ability);
            if timer.active && timer.expires_at.is_some_and(|at| now >= at) {
                *timer = AbilityTimer::default();
                expired.push(ability);
            }
        }
        expired
    }

    /// Time left on a timed ability (for HUD countdowns)
    pub fn remaining(&self, ability: Ability, now: Duration) -> Option<Duration> {
        let timer = self.timer(ability);
        if !timer.active {
            return None;
        }
        timer.expires_at.map(|at| at.saturating_sub(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invincible_expires_after_exact_duration() {
        let mut abilities = Abilities::default();
        abilities.activate(Ability::Invincible, Duration::ZERO);
        assert!(abilities.expire(Duration::from_millis(4999)).is_empty());
        assert!(abilities.is_active(Ability::Invincible));
        assert_eq!(abilities.expire(Duration::from_secs(5)), vec![Ability::Invincible]);
        assert!(!abilities.is_active(Ability::Invincible));
    }

    #[test]
    fn test_retrigger_restarts_window() {
        let mut abilities = Abilities::default();
        abilities.activate(Ability::Magnet, Duration::ZERO);
        abilities.activate(Ability::Magnet, Duration::from_secs(8));
        assert!(abilities.expire(Duration::from_secs(12)).is_empty());
        assert_eq!(
            abilities.remaining(Ability::Magnet, Duration::from_secs(12)),
            Some(Duration::from_secs(6))
        );
        assert_eq!(abilities.expire(Duration::from_secs(18)), vec![Ability::Magnet]);
    }

    #[test]
    fn test_shield_has_no_deadline() {
        let mut abilities = Abilities::default();
        abilities.activate(Ability::Shield, Duration::ZERO);
        assert!(abilities.expire(Duration::from_secs(3600)).is_empty());
        assert!(abilities.consume_shield());
        assert!(!abilities.consume_shield());
    }
}
