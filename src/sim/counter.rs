//! Shared round counters
//!
//! Used for the double-effect tally and the temporary-paddle guard.

use serde::{Deserialize, Serialize};

/// Monotonic counter with an explicit reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter(u32);

impl Counter {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn increase_by(&mut self, amount: u32) {
        self.0 = self.0.saturating_add(amount);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// True while the counter has not moved since the last reset
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
