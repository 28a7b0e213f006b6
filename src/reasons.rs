//! Disable reasons and the hidden-pill reason log
//!
//! A `ReasonSet` is a passive gate: a policy is active only while its set is
//! empty. Callers re-derive whatever depends on it after every mutation.
//!
//! The `HiddenReasonLog` remembers why the pill is hidden, in the order the
//! reasons arrived, so the most recent one can pick the re-show delay.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reasons that suppress the nav bar, the pill, or nav immersive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisableReason {
    Keyguard,
    CarMode,
    NavBlacklist,
    BarBlacklist,
    ImmBlacklist,
    EdgeScreen,
    Keyboard,
    Immersive,
}

impl DisableReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DisableReason::Keyguard => "keyguard",
            DisableReason::CarMode => "car_mode",
            DisableReason::NavBlacklist => "nav_blacklist",
            DisableReason::BarBlacklist => "bar_blacklist",
            DisableReason::ImmBlacklist => "imm_blacklist",
            DisableReason::EdgeScreen => "edge_screen",
            DisableReason::Keyboard => "keyboard",
            DisableReason::Immersive => "immersive",
        }
    }
}

impl fmt::Display for DisableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of active disable reasons for one policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonSet {
    reasons: BTreeSet<DisableReason>,
}

impl ReasonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the reason was not already present
    pub fn add(&mut self, reason: DisableReason) -> bool {
        self.reasons.insert(reason)
    }

    /// Idempotent; returns true if something was removed
    pub fn remove(&mut self, reason: DisableReason) -> bool {
        self.reasons.remove(&reason)
    }

    /// Add or remove depending on `active`
    pub fn set(&mut self, reason: DisableReason, active: bool) -> bool {
        if active {
            self.add(reason)
        } else {
            self.remove(reason)
        }
    }

    pub fn contains(&self, reason: DisableReason) -> bool {
        self.reasons.contains(&reason)
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = DisableReason> + '_ {
        self.reasons.iter().copied()
    }
}

/// Why the pill is currently hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenReason {
    Fullscreen,
    Keyboard,
    Auto,
    Manual,
}

impl HiddenReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HiddenReason::Fullscreen => "fullscreen",
            HiddenReason::Keyboard => "keyboard",
            HiddenReason::Auto => "auto",
            HiddenReason::Manual => "manual",
        }
    }
}

impl fmt::Display for HiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered log of hidden reasons, keyed by a monotonic sequence
#[derive(Debug, Clone, Default)]
pub struct HiddenReasonLog {
    entries: BTreeMap<u64, HiddenReason>,
    next_seq: u64,
}

impl HiddenReasonLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `reason` as the most recent entry, moving it if already present
    pub fn add_reason(&mut self, reason: HiddenReason) {
        self.entries.retain(|_, r| *r != reason);
        self.entries.insert(self.next_seq, reason);
        self.next_seq += 1;
    }

    /// Remove every entry equal to `reason`; returns true if any were removed
    pub fn remove_reason(&mut self, reason: HiddenReason) -> bool {
        let before = self.entries.len();
        self.entries.retain(|_, r| *r != reason);
        self.entries.len() != before
    }

    pub fn most_recent(&self) -> Option<HiddenReason> {
        self.entries.values().next_back().copied()
    }

    pub fn contains(&self, reason: HiddenReason) -> bool {
        self.entries.values().any(|r| *r == reason)
    }

    /// True if `reason` is the only entry in the log
    pub fn only_contains(&self, reason: HiddenReason) -> bool {
        !self.entries.is_empty() && self.entries.values().all(|r| *r == reason)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reasons from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = HiddenReason> + '_ {
        self.entries.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_set_add_is_idempotent() {
        let mut set = ReasonSet::new();
        assert!(set.is_empty());
        assert!(set.add(DisableReason::Keyguard));
        assert!(!set.add(DisableReason::Keyguard));
        assert!(!set.is_empty());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_reason_set_remove_is_idempotent() {
        let mut set = ReasonSet::new();
        set.add(DisableReason::CarMode);
        assert!(set.remove(DisableReason::CarMode));
        assert!(!set.remove(DisableReason::CarMode));
        assert!(set.is_empty());
    }

    #[test]
    fn test_log_readd_moves_to_most_recent() {
        let mut log = HiddenReasonLog::new();
        log.add_reason(HiddenReason::Fullscreen);
        log.add_reason(HiddenReason::Keyboard);
        log.add_reason(HiddenReason::Fullscreen);
        assert_eq!(log.most_recent(), Some(HiddenReason::Fullscreen));
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.iter().collect::<Vec<_>>(),
            vec![HiddenReason::Keyboard, HiddenReason::Fullscreen]
        );
    }

    #[test]
    fn test_log_remove_and_only_contains() {
        let mut log = HiddenReasonLog::new();
        assert!(!log.only_contains(HiddenReason::Keyboard));
        log.add_reason(HiddenReason::Keyboard);
        assert!(log.only_contains(HiddenReason::Keyboard));
        log.add_reason(HiddenReason::Auto);
        assert!(!log.only_contains(HiddenReason::Keyboard));
        assert!(log.remove_reason(HiddenReason::Auto));
        assert!(!log.remove_reason(HiddenReason::Auto));
        assert_eq!(log.most_recent(), Some(HiddenReason::Keyboard));
        log.remove_reason(HiddenReason::Keyboard);
        assert!(log.is_empty());
        assert_eq!(log.most_recent(), None);
    }
}
