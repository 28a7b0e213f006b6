//! Keyed one-shot deadlines
//!
//! Stands in for delayed messages: each pending timer is keyed by its
//! purpose, so arming a key replaces its old deadline and cancelling is
//! scoped to that key. The owner polls `take_due` from the event loop.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `key` to fire `delay` after `now`, replacing any previous deadline
    pub fn arm(&mut self, key: K, now: Instant, delay: Duration) {
        self.deadlines.insert(key, now + delay);
    }

    /// Returns true if the key was pending
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) {
        self.deadlines.retain(|k, _| !pred(k));
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    #[cfg(test)]
    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(k, at)| (*at, k.clone()))
            .collect();
        due.sort_by_key(|(at, _)| *at);
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, k)| k).collect()
    }

    /// Remove and return the earliest key due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<K> {
        let key = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .min_by_key(|(_, at)| **at)
            .map(|(k, _)| k.clone())?;
        self.deadlines.remove(&key);
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_replaces_and_cancel_is_scoped() {
        let t0 = Instant::now();
        let mut q: TimerQueue<&str> = TimerQueue::new();
        q.arm("hide", t0, Duration::from_millis(100));
        q.arm("fade", t0, Duration::from_millis(50));
        q.arm("hide", t0, Duration::from_millis(300));
        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_millis(50)));
        assert!(q.cancel(&"fade"));
        assert!(!q.cancel(&"fade"));
        assert_eq!(q.deadline(&"hide"), Some(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_take_due_in_deadline_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.arm(2, t0, Duration::from_millis(20));
        q.arm(1, t0, Duration::from_millis(10));
        q.arm(3, t0, Duration::from_millis(500));
        assert_eq!(q.take_due(t0 + Duration::from_millis(30)), vec![1, 2]);
        assert!(q.is_armed(&3));
        assert_eq!(q.pop_due(t0 + Duration::from_millis(100)), None);
    }
}
