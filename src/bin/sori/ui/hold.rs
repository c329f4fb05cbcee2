//! Synthesized key releases for terminals that only report presses.
//!
//! Such terminals send a burst of presses while a key is held (the OS
//! auto-repeat). Each one pushes the key's deadline out; once no press has
//! arrived for `timeout`, the key counts as released.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

#[derive(Debug)]
pub struct KeyHold {
    timeout: Duration,
    deadlines: HashMap<char, Instant>,
}

impl KeyHold {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadlines: HashMap::new(),
        }
    }

    /// Record a press at `now`. Returns true if the key was not already held.
    pub fn press(&mut self, key: char, now: Instant) -> bool {
        self.deadlines.insert(key, now + self.timeout).is_none()
    }

    /// Keys whose deadline has passed, removed from the held set.
    pub fn expired(&mut self, now: Instant) -> Vec<char> {
        let expired: Vec<char> = self
            .deadlines
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&key, _)| key)
            .collect();
        for key in &expired {
            self.deadlines.remove(key);
        }
        expired
    }
}
