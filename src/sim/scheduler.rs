//! Tick scheduling
//!
//! Turns frame time into simulation steps at the current `speed`. The caller
//! asks for the next step with the speed as it is *now*, so a speed change
//! made by one step is honoured by the very next one.

use std::time::Duration;

use crate::config::SchedulerMode;
use crate::consts::MAX_STEPS_PER_FRAME;

#[derive(Debug, Clone)]
pub struct TickScheduler {
    mode: SchedulerMode,
    accumulator: Duration,
    steps_this_frame: u32,
}

impl TickScheduler {
    pub fn new(mode: SchedulerMode) -> Self {
        Self {
            mode,
            accumulator: Duration::ZERO,
            steps_this_frame: 0,
        }
    }

    pub fn mode(&self) -> SchedulerMode {
        self.mode
    }

    /// Time accumulated toward the next step
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Start a new frame with `dt` of unpaused time elapsed
    pub fn advance(&mut self, dt: Duration) {
        self.accumulator += dt;
        self.steps_this_frame = 0;
    }

    /// Whether a step should fire now, given the current tick interval.
    ///
    /// Call repeatedly until it returns false.
    pub fn take_step(&mut self, interval: Duration) -> bool {
        if self.accumulator < interval || interval.is_zero() {
            return false;
        }
        match self.mode {
            SchedulerMode::Interval => {
                if self.steps_this_frame > 0 {
                    return false;
                }
                // Next step is due a full interval from now
                self.accumulator = Duration::ZERO;
            }
            SchedulerMode::Accumulator => {
                if self.steps_this_frame >= MAX_STEPS_PER_FRAME {
                    // Remaining debt is paid off over the following frames
                    log::debug!(
                        "Carrying {:?} of step debt after {} steps",
                        self.accumulator,
                        self.steps_this_frame
                    );
                    return false;
                }
                self.accumulator -= interval;
            }
        }
        self.steps_this_frame += 1;
        true
    }

    /// Whether whole steps are still owed at `interval`
    pub fn is_behind(&self, interval: Duration) -> bool {
        !interval.is_zero() && self.accumulator >= interval
    }

    /// Forget any accumulated time (restart/quit)
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.steps_this_frame = 0;
    }
}
