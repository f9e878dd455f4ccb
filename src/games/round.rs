// ============================================
// src/games/round.rs
// Item-by-item progression shared by the quiz style games
// ============================================

use std::time::Duration;

use super::Phase;
use crate::timer::{Countdown, Delay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    Idle,
    /// The per-item countdown reached zero while the item was still open.
    TimedOut,
    /// Moved on to the next item.
    Advanced,
    /// The last item is done.
    Finished,
}

/// Walks a fixed list of items, each with its own countdown. An item is
/// "locked" once answered; a locked item ignores further answers and waits
/// for its scheduled advance.
#[derive(Debug, Clone)]
pub struct Rounds {
    phase: Phase,
    index: usize,
    total: usize,
    per_item: u32,
    clock: Countdown,
    locked: bool,
    advance: Delay,
}

impl Rounds {
    pub fn new(total: usize, per_item: u32) -> Self {
        Self {
            phase: Phase::NotStarted,
            index: 0,
            total,
            per_item,
            clock: Countdown::new(per_item),
            locked: false,
            advance: Delay::default(),
        }
    }

    pub fn start(&mut self) {
        *self = Self::new(self.total, self.per_item);
        self.phase = Phase::Playing;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.total, self.per_item);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Playing and still accepting an answer for the current item.
    pub fn is_open(&self) -> bool {
        self.is_playing() && !self.locked
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn seconds_left(&self) -> u32 {
        self.clock.remaining()
    }

    /// Locks the item and stops its clock without scheduling anything.
    pub fn lock(&mut self) {
        self.locked = true;
        self.clock.pause();
    }

    /// Locks the item and moves on after `after`.
    pub fn lock_then_advance(&mut self, after: Duration) {
        self.lock();
        self.advance.schedule(after, ());
    }

    /// Moves to the next item right away.
    pub fn advance(&mut self) -> RoundEvent {
        self.advance.cancel();
        if self.index + 1 < self.total {
            self.index += 1;
            self.locked = false;
            self.clock.reset(self.per_item);
            RoundEvent::Advanced
        } else {
            self.locked = true;
            self.phase = Phase::Finished;
            RoundEvent::Finished
        }
    }

    pub fn tick(&mut self, dt: Duration) -> RoundEvent {
        if !self.is_playing() {
            return RoundEvent::Idle;
        }
        if self.advance.tick(dt).is_some() {
            return self.advance();
        }
        if !self.locked && self.clock.tick(dt) {
            return RoundEvent::TimedOut;
        }
        RoundEvent::Idle
    }
}
