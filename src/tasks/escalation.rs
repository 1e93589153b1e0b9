//! # Consumer starvation tracking.
//!
//! [`StarvationTracker`] counts consecutive empty polls and maps the count to
//! an [`EscalationLevel`]:
//!
//! ```text
//! count == advisory  → Advisory   (warn once)
//! count == recovery  → Recovery   (reset the channel once)
//! count >= terminal  → Terminal   (task ends itself)
//! ```
//!
//! Advisory and recovery use equality so each fires once per episode; any hit
//! resets the count and starts a new episode. Terminal uses `>=` so a skipped
//! count can never leave the consumer alive past the threshold.

use std::fmt;

use crate::core::Thresholds;

/// Severity of a starvation episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscalationLevel {
    /// Level 1: log only.
    Advisory,
    /// Level 2: reset the channel.
    Recovery,
    /// Level 3: persistent failure, the consumer terminates.
    Terminal,
}

impl EscalationLevel {
    /// Level reached at `count` consecutive empty polls, if any.
    pub fn for_count(count: u32, t: &Thresholds) -> Option<Self> {
        if count == t.advisory {
            Some(EscalationLevel::Advisory)
        } else if count == t.recovery {
            Some(EscalationLevel::Recovery)
        } else if count >= t.terminal {
            Some(EscalationLevel::Terminal)
        } else {
            None
        }
    }

    /// Numeric level (1..=3).
    pub fn number(&self) -> u8 {
        match self {
            EscalationLevel::Advisory => 1,
            EscalationLevel::Recovery => 2,
            EscalationLevel::Terminal => 3,
        }
    }
}

impl fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LV{}", self.number())
    }
}

/// Consecutive empty-poll counter of one consumer incarnation.
#[derive(Debug, Clone)]
pub struct StarvationTracker {
    empty_polls: u32,
    thresholds: Thresholds,
}

impl StarvationTracker {
    /// Tracker with a zero count.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            empty_polls: 0,
            thresholds,
        }
    }

    /// Current count of consecutive empty polls.
    pub fn empty_polls(&self) -> u32 {
        self.empty_polls
    }

    /// A value was received and processed.
    pub fn on_hit(&mut self) {
        self.empty_polls = 0;
    }

    /// The channel was empty; returns the level reached by the new count.
    pub fn on_miss(&mut self) -> Option<EscalationLevel> {
        self.empty_polls = self.empty_polls.saturating_add(1);
        EscalationLevel::for_count(self.empty_polls, &self.thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StarvationTracker {
        StarvationTracker::new(Thresholds::default())
    }

    #[test]
    fn hit_resets_to_zero() {
        let mut t = tracker();
        for _ in 0..7 {
            t.on_miss();
        }
        assert_eq!(t.empty_polls(), 7);
        t.on_hit();
        assert_eq!(t.empty_polls(), 0);
    }

    #[test]
    fn levels_fire_exactly_at_thresholds() {
        let mut t = tracker();
        let fired: Vec<(u32, EscalationLevel)> = (0..15)
            .filter_map(|_| t.on_miss().map(|lvl| (t.empty_polls(), lvl)))
            .collect();
        assert_eq!(
            fired,
            vec![
                (5, EscalationLevel::Advisory),
                (10, EscalationLevel::Recovery),
                (15, EscalationLevel::Terminal),
            ]
        );
    }

    #[test]
    fn count_increases_by_one_per_miss() {
        let mut t = tracker();
        for expected in 1..=12 {
            t.on_miss();
            assert_eq!(t.empty_polls(), expected);
        }
    }

    #[test]
    fn interrupted_episode_fires_again_after_reset() {
        let mut t = tracker();
        let mut advisories = 0;
        for _ in 0..2 {
            for _ in 0..6 {
                if t.on_miss() == Some(EscalationLevel::Advisory) {
                    advisories += 1;
                }
            }
            t.on_hit();
        }
        assert_eq!(advisories, 2);
    }

    #[test]
    fn terminal_is_a_floor_not_a_point() {
        let t = Thresholds::default();
        assert_eq!(EscalationLevel::for_count(4, &t), None);
        assert_eq!(EscalationLevel::for_count(6, &t), None);
        assert_eq!(EscalationLevel::for_count(11, &t), None);
        assert_eq!(EscalationLevel::for_count(16, &t), Some(EscalationLevel::Terminal));
        assert_eq!(EscalationLevel::for_count(u32::MAX, &t), Some(EscalationLevel::Terminal));
    }
}
