//! One-time welcome tracking.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Process-lifetime record of contacts that already got the welcome sequence.
///
/// Nothing is persisted: a restart makes every contact new again. The
/// check-and-mark in [`should_greet`](Self::should_greet) happens under one
/// lock, so concurrent first messages from the same contact yield exactly one
/// `true`.
#[derive(Debug, Default)]
pub struct GreetingTracker {
    greeted: Mutex<HashSet<String>>,
}

impl GreetingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time `wa_id` is seen (and marks it), `false` after.
    pub fn should_greet(&self, wa_id: &str) -> bool {
        let mut greeted = self.greeted.lock().unwrap_or_else(PoisonError::into_inner);
        let first = greeted.insert(wa_id.to_string());
        debug!(wa_id = %wa_id, first_contact = first, "Greeting check");
        first
    }

    /// Whether `wa_id` has already been welcomed.
    pub fn is_greeted(&self, wa_id: &str) -> bool {
        self.greeted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(wa_id)
    }

    /// Number of contacts welcomed so far.
    pub fn len(&self) -> usize {
        self.greeted.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
