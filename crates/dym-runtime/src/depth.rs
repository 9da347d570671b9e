//! Call stack depth tracking
//!
//! Counts nested activations of instrumented roots. Enter and leave must
//! nest strictly; the invocation event node guarantees one leave for every
//! enter, on normal and on exceptional exit.

use std::cell::Cell;

/// Current and maximum activation depth
#[derive(Debug, Default)]
pub struct CallStackDepth {
    current: Cell<usize>,
    max: Cell<usize>,
}

impl CallStackDepth {
    pub fn new() -> Self {
        Self::default()
    }

    /// An activation started
    pub fn enter(&self) {
        let depth = self.current.get() + 1;
        self.current.set(depth);
        if depth > self.max.get() {
            self.max.set(depth);
        }
    }

    /// An activation finished
    pub fn leave(&self) {
        let depth = self.current.get();
        debug_assert!(depth > 0, "leave without a matching enter");
        self.current.set(depth.saturating_sub(1));
    }

    /// Activations currently on the stack
    pub fn current(&self) -> usize {
        self.current.get()
    }

    /// Deepest nesting seen so far
    pub fn max(&self) -> usize {
        self.max.get()
    }
}
