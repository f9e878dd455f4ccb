// ============================================
// src/timer.rs
// Countdowns and one-shot delays driven by the event loop's tick
// ============================================

use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

/// Whole-second countdown. Sub-second remainders are carried between ticks.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    carry: Duration,
    paused: bool,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            remaining: secs,
            carry: Duration::ZERO,
            paused: false,
        }
    }

    pub fn reset(&mut self, secs: u32) {
        *self = Self::new(secs);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Advances the clock. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.paused || self.remaining == 0 {
            return false;
        }
        self.carry += dt;
        while self.carry >= SECOND && self.remaining > 0 {
            self.carry -= SECOND;
            self.remaining -= 1;
        }
        if self.remaining == 0 {
            self.carry = Duration::ZERO;
            return true;
        }
        false
    }
}

/// A pending one-shot action, e.g. "advance after 1.5 s".
#[derive(Debug, Clone)]
pub struct Delay<T = ()> {
    pending: Option<(Duration, T)>,
}

impl<T> Default for Delay<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Delay<T> {
    /// Schedules `action`, replacing anything already pending.
    pub fn schedule(&mut self, after: Duration, action: T) {
        self.pending = Some((after, action));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the action once its delay has fully elapsed.
    pub fn tick(&mut self, dt: Duration) -> Option<T> {
        let fire = match self.pending.as_mut() {
            Some((left, _)) if *left > dt => {
                *left -= dt;
                false
            }
            Some(_) => true,
            None => false,
        };
        if fire {
            self.pending.take().map(|(_, action)| action)
        } else {
            None
        }
    }
}
