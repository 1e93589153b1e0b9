//! # Liveness signal board.
//!
//! [`SignalBoard`] holds one bit per worker task. A task sets its bit after a
//! successful unit of work; the monitor reads and clears the bits once per cycle,
//! so a set bit means "activity since the last observation".
//!
//! ## Rules
//! - `set` and `wait_and_clear` are individually atomic (single atomic word)
//! - bits are only cleared when the wait condition is satisfied
//! - a zero timeout never suspends the caller

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

/// Set of liveness flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Liveness(u8);

impl Liveness {
    /// No flag.
    pub const NONE: Liveness = Liveness(0);
    /// Producer delivered a value.
    pub const PRODUCER: Liveness = Liveness(1 << 0);
    /// Consumer processed a value.
    pub const CONSUMER: Liveness = Liveness(1 << 1);
    /// Both worker flags.
    pub const ALL: Liveness = Liveness(Self::PRODUCER.0 | Self::CONSUMER.0);

    /// Returns true if every bit of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: Liveness) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("producer", &self.contains(Liveness::PRODUCER))
            .field("consumer", &self.contains(Liveness::CONSUMER))
            .finish()
    }
}

/// Board of independently settable liveness flags.
#[derive(Debug, Default)]
pub struct SignalBoard {
    bits: AtomicU8,
    notify: Notify,
}

impl SignalBoard {
    /// Creates a board with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `flags` and wakes any waiter.
    pub fn set(&self, flags: Liveness) {
        self.bits.fetch_or(flags.0, Ordering::AcqRel);
        self.notify.notify_waiters();
    }

    /// Current flags, without clearing.
    pub fn snapshot(&self) -> Liveness {
        Liveness(self.bits.load(Ordering::Acquire))
    }

    /// Waits until the bits in `mask` satisfy the condition, then clears them.
    ///
    /// - `match_any = true`: at least one bit of `mask` must be set
    /// - `match_any = false`: every bit of `mask` must be set
    ///
    /// Returns the flags as they were just before clearing. If the condition is
    /// not met within `timeout`, nothing is cleared and the current flags are
    /// returned. With `Duration::ZERO` this never suspends.
    pub async fn wait_and_clear(
        &self,
        mask: Liveness,
        match_any: bool,
        timeout: Duration,
    ) -> Liveness {
        if let Some(seen) = self.try_take(mask, match_any) {
            return seen;
        }
        if timeout.is_zero() {
            return self.snapshot();
        }

        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(seen) = self.try_take(mask, match_any) {
                return seen;
            }
            if time::timeout_at(deadline, notified).await.is_err() {
                return self
                    .try_take(mask, match_any)
                    .unwrap_or_else(|| self.snapshot());
            }
        }
    }

    /// Clears `mask` in one atomic step if the condition holds.
    fn try_take(&self, mask: Liveness, match_any: bool) -> Option<Liveness> {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let hit = current & mask.0;
            let satisfied = if match_any {
                hit != 0
            } else {
                hit == mask.0
            };
            if !satisfied {
                return None;
            }
            match self.bits.compare_exchange_weak(
                current,
                current & !mask.0,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(Liveness(current)),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn read_clears_any_combination() {
        let board = SignalBoard::new();
        let cases = [
            Liveness::ALL,
            Liveness::PRODUCER,
            Liveness::CONSUMER,
            Liveness::NONE,
        ];
        for flags in cases {
            board.set(flags);
            let seen = board
                .wait_and_clear(Liveness::ALL, true, Duration::ZERO)
                .await;
            assert_eq!(seen, flags);
            assert!(board.snapshot().is_empty(), "{flags:?} left bits behind");
        }
    }

    #[tokio::test]
    async fn match_all_leaves_bits_when_unsatisfied() {
        let board = SignalBoard::new();
        board.set(Liveness::PRODUCER);
        let seen = board
            .wait_and_clear(Liveness::ALL, false, Duration::ZERO)
            .await;
        assert_eq!(seen, Liveness::PRODUCER);
        assert_eq!(board.snapshot(), Liveness::PRODUCER);

        board.set(Liveness::CONSUMER);
        let seen = board
            .wait_and_clear(Liveness::ALL, false, Duration::ZERO)
            .await;
        assert_eq!(seen, Liveness::ALL);
        assert!(board.snapshot().is_empty());
    }

    #[tokio::test]
    async fn only_masked_bits_are_cleared() {
        let board = SignalBoard::new();
        board.set(Liveness::ALL);
        board
            .wait_and_clear(Liveness::PRODUCER, true, Duration::ZERO)
            .await;
        assert_eq!(board.snapshot(), Liveness::CONSUMER);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_a_late_setter() {
        let board = Arc::new(SignalBoard::new());
        let setter = Arc::clone(&board);
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            setter.set(Liveness::CONSUMER);
        });

        let seen = board
            .wait_and_clear(Liveness::ALL, true, Duration::from_secs(1))
            .await;
        assert_eq!(seen, Liveness::CONSUMER);
        assert!(board.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_without_clearing() {
        let board = SignalBoard::new();
        let seen = board
            .wait_and_clear(Liveness::ALL, true, Duration::from_millis(100))
            .await;
        assert!(seen.is_empty());
    }
}
