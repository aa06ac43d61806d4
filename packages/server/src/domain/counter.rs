//! Process-wide shared counter and the commands that mutate it.

use std::sync::atomic::{AtomicI64, Ordering};

/// A single signed integer shared by every counter session.
///
/// All operations are sequentially consistent, so a mutation is visible to the
/// next read from any task.
#[derive(Debug, Default)]
pub struct SharedCounter {
    value: AtomicI64,
}

impl SharedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one and return the new value.
    pub fn increment(&self) -> i64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Set the value to zero and return the value it replaced.
    pub fn reset(&self) -> i64 {
        self.value.swap(0, Ordering::SeqCst)
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Commands understood by the counter server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterCommand {
    Increment,
    Reset,
}

impl CounterCommand {
    /// Parse an inbound frame. Case-insensitive; surrounding whitespace is ignored.
    ///
    /// Returns `None` for anything outside the vocabulary.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("increment") {
            Some(Self::Increment)
        } else if input.eq_ignore_ascii_case("reset") {
            Some(Self::Reset)
        } else {
            None
        }
    }
}
