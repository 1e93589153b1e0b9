//! # Global pipeline configuration.
//!
//! Provides [`Config`] centralized settings for the pipeline runtime: channel
//! capacity, escalation thresholds, task periods, keepalive window and event
//! bus sizing.
//!
//! Every constant the tasks rely on lives here so tests can run the whole
//! pipeline with compressed periods instead of wall-clock seconds.
//!
//! ## Sentinel values
//! - `max_tasks = 0` → unlimited (no spawn budget)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::error::RuntimeError;

/// Consecutive empty-poll counts at which the consumer escalates.
///
/// Must satisfy `0 < advisory < recovery < terminal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    /// Level 1: warning only.
    pub advisory: u32,
    /// Level 2: the channel is reset.
    pub recovery: u32,
    /// Level 3: the consumer terminates itself.
    pub terminal: u32,
}

impl Default for Thresholds {
    /// Returns `5 / 10 / 15`.
    fn default() -> Self {
        Self {
            advisory: 5,
            recovery: 10,
            terminal: 15,
        }
    }
}

/// Global configuration for the pipeline runtime.
///
/// ## Field semantics
/// - `channel_capacity`: values the data channel can hold (min 1)
/// - `thresholds`: consumer escalation levels
/// - `producer_period` / `consumer_period`: worker cycle length
/// - `monitor_period`: supervisor cycle length, must be coarser than both workers
/// - `keepalive_timeout`: window within which every running task must feed the watchdog
/// - `bus_capacity`: event bus ring buffer size (clamped to min 1)
/// - `max_tasks`: spawn budget across all tasks (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Call [`Config::validate`] (the
/// pipeline builder does) before running with a hand-built value.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the bounded data channel.
    pub channel_capacity: usize,

    /// Escalation thresholds of the consumer.
    pub thresholds: Thresholds,

    /// Delay between two producer cycles.
    pub producer_period: Duration,

    /// Delay between two consumer cycles.
    pub consumer_period: Duration,

    /// Delay between two monitor cycles.
    ///
    /// Health classification compares activity within one monitor cycle, so this
    /// must be longer than both worker periods.
    pub monitor_period: Duration,

    /// Maximum silence allowed between two keepalives of a running task.
    ///
    /// The consumer only acknowledges on a successful receive, so the window
    /// must outlast a full starvation episode (`thresholds.terminal` cycles).
    pub keepalive_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Maximum number of tasks alive at once (`0` = unlimited).
    pub max_tasks: usize,
}

impl Config {
    /// Returns the spawn budget as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` live tasks
    #[inline]
    pub fn task_limit(&self) -> Option<usize> {
        if self.max_tasks == 0 {
            None
        } else {
            Some(self.max_tasks)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Longest a consumer can stay alive without a single hit.
    #[inline]
    pub fn starvation_window(&self) -> Duration {
        self.consumer_period
            .saturating_mul(self.thresholds.terminal)
    }

    /// Checks the invariants the tasks rely on.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let invalid = |reason: &str| {
            Err(RuntimeError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.channel_capacity == 0 {
            return invalid("channel_capacity must be at least 1");
        }
        let t = self.thresholds;
        if t.advisory == 0 || t.advisory >= t.recovery || t.recovery >= t.terminal {
            return invalid("thresholds must satisfy 0 < advisory < recovery < terminal");
        }
        if self.producer_period.is_zero()
            || self.consumer_period.is_zero()
            || self.monitor_period.is_zero()
        {
            return invalid("task periods must be non-zero");
        }
        if self.monitor_period <= self.producer_period
            || self.monitor_period <= self.consumer_period
        {
            return invalid("monitor_period must be longer than producer and consumer periods");
        }
        if self.keepalive_timeout <= self.monitor_period
            || self.keepalive_timeout <= self.producer_period
            || self.keepalive_timeout <= self.starvation_window()
        {
            return invalid(
                "keepalive_timeout must outlast every task period and the consumer starvation window",
            );
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `channel_capacity = 5`
    /// - `thresholds = 5 / 10 / 15`
    /// - `producer_period = consumer_period = 1s`
    /// - `monitor_period = 2s`
    /// - `keepalive_timeout = 20s` (covers a 15s starvation episode)
    /// - `bus_capacity = 1024`
    /// - `max_tasks = 0` (unlimited)
    fn default() -> Self {
        Self {
            channel_capacity: 5,
            thresholds: Thresholds::default(),
            producer_period: Duration::from_millis(1000),
            consumer_period: Duration::from_millis(1000),
            monitor_period: Duration::from_millis(2000),
            keepalive_timeout: Duration::from_secs(20),
            bus_capacity: 1024,
            max_tasks: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_capacity() {
        let cfg = Config {
            channel_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(RuntimeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let cfg = Config {
            thresholds: Thresholds {
                advisory: 5,
                recovery: 5,
                terminal: 15,
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_monitor_not_coarser_than_workers() {
        let cfg = Config {
            monitor_period: Duration::from_millis(1000),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_keepalive_shorter_than_starvation() {
        // 15 cycles of 1s would trip a 5s watchdog before level 3.
        let cfg = Config {
            keepalive_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sentinels() {
        let mut cfg = Config::default();
        assert_eq!(cfg.task_limit(), None);
        cfg.max_tasks = 3;
        assert_eq!(cfg.task_limit(), Some(3));
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.starvation_window(), Duration::from_secs(15));
    }
}
