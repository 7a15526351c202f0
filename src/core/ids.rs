// src/core/ids.rs
//! Entry id source

use chrono::Utc;

use crate::types::{EntryId, ResumeDocument};

/// Hands out entry ids from the wall clock in milliseconds.
///
/// Ids are strictly increasing for the lifetime of a generator: when the clock
/// has not moved (or went backwards) the previous id is bumped by one, so a
/// removed id is never handed out again.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: i64,
    clock: fn() -> i64,
}

fn wall_clock_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_clock(wall_clock_millis)
    }

    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self { last: 0, clock }
    }

    /// Generator that will never collide with ids already present in `document`.
    pub fn resuming(document: &ResumeDocument) -> Self {
        let mut generator = Self::new();
        generator.last = document
            .entry_ids()
            .filter_map(EntryId::as_millis)
            .max()
            .unwrap_or(0);
        generator
    }

    pub fn next_id(&mut self) -> EntryId {
        let now = (self.clock)();
        let next = if now > self.last { now } else { self.last + 1 };
        self.last = next;
        EntryId::new(next.to_string())
    }
}
