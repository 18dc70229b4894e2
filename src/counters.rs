use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Population tallies and day clock shared by every agent.
///
/// Each field is mutated through its own atomic operation, so every
/// individual tally is linearizable but no consistency across fields is
/// promised to readers. Constructed once and shared behind an `Arc`;
/// a restart resets it in place instead of replacing it.
#[derive(Debug, Default)]
pub struct Counters {
    vulnerable: AtomicUsize,
    sick: AtomicUsize,
    immune: AtomicUsize,
    dead: AtomicUsize,
    day: AtomicUsize,
}

/// Point-in-time copy of the tallies and the day clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub day: usize,
    pub vulnerable: usize,
    pub sick: usize,
    pub immune: usize,
    pub dead: usize,
}

impl Snapshot {
    /// Sum of the four population tallies.
    pub fn total(&self) -> usize {
        self.vulnerable + self.sick + self.immune + self.dead
    }
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the start of a run: the whole population vulnerable, day zero.
    pub fn reset(&self, n_agents: usize) {
        self.vulnerable.store(n_agents, Ordering::Relaxed);
        self.sick.store(0, Ordering::Relaxed);
        self.immune.store(0, Ordering::Relaxed);
        self.dead.store(0, Ordering::Relaxed);
        self.day.store(0, Ordering::Relaxed);
    }

    pub fn dec_vulnerable(&self) {
        self.vulnerable.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_sick(&self) {
        self.sick.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_sick(&self) {
        self.sick.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_immune(&self) {
        self.immune.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dead(&self) {
        self.dead.fetch_add(1, Ordering::Relaxed);
    }

    pub fn vulnerable(&self) -> usize {
        self.vulnerable.load(Ordering::Relaxed)
    }

    pub fn sick(&self) -> usize {
        self.sick.load(Ordering::Relaxed)
    }

    pub fn immune(&self) -> usize {
        self.immune.load(Ordering::Relaxed)
    }

    pub fn dead(&self) -> usize {
        self.dead.load(Ordering::Relaxed)
    }

    /// Current simulated day, advanced by the external clock tick.
    pub fn day(&self) -> usize {
        self.day.load(Ordering::Relaxed)
    }

    pub fn advance_day(&self) {
        self.day.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy out all fields. The fields are read one by one, so a snapshot
    /// taken while agents are transitioning may catch a transition halfway.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            day: self.day(),
            vulnerable: self.vulnerable(),
            sick: self.sick(),
            immune: self.immune(),
            dead: self.dead(),
        }
    }
}
