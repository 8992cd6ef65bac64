use rbp_core::Position;
use std::time::Duration;
use tokio::time::Instant;

/// Guards against a hand that has not progressed past a round boundary
/// within the configured threshold (SPEC_FULL §4.C). Armed on `Game`
/// (hand start), cleared on `EndRoundLast`; if it is still dirty when the
/// threshold elapses, the table is flagged locked but keeps operating,
/// the way `pokertable.py`'s lock-timeout check logs a dirty table
/// instead of silently hanging forever.
#[derive(Debug)]
pub struct LockWatchdog {
    threshold: Duration,
    dirty_since: Option<Instant>,
    alarmed: bool,
}

impl LockWatchdog {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            dirty_since: None,
            alarmed: false,
        }
    }

    /// Mark the table dirty; called when `update` is entered.
    pub fn mark_dirty(&mut self) {
        if self.dirty_since.is_none() {
            self.dirty_since = Some(Instant::now());
            self.alarmed = false;
        }
    }

    /// Mark the table clean; called when `update` returns.
    pub fn mark_clean(&mut self) {
        self.dirty_since = None;
        self.alarmed = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn dirty_for(&self) -> Option<Duration> {
        self.dirty_since.map(|since| since.elapsed())
    }

    /// True the first time the dirty duration crosses the threshold.
    /// Stays false on subsequent polls until `mark_clean`/`mark_dirty`
    /// resets the alarm, so a caller logging on `true` doesn't spam.
    pub fn poll(&mut self) -> bool {
        if self.alarmed {
            return false;
        }
        let Some(elapsed) = self.dirty_for() else {
            return false;
        };
        if elapsed >= self.threshold {
            self.alarmed = true;
            return true;
        }
        false
    }
}

/// Counts consecutive missed rounds per seat. Carries no tournament
/// awareness itself; the tournament skip (SPEC_FULL §9, Open Question #3)
/// is enforced by the caller in `autodeal.rs`'s kick sweep.
#[derive(Debug, Default)]
pub struct SittingOutTracker {
    missed_rounds: std::collections::HashMap<Position, u32>,
}

impl SittingOutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_missed_round(&mut self, seat: Position) -> u32 {
        let count = self.missed_rounds.entry(seat).or_insert(0);
        *count += 1;
        *count
    }

    pub fn reset(&mut self, seat: Position) {
        self.missed_rounds.remove(&seat);
    }

    pub fn missed_rounds(&self, seat: Position) -> u32 {
        self.missed_rounds.get(&seat).copied().unwrap_or(0)
    }

    /// Seats that should be kicked given `max_missed_round`, regardless of
    /// whether the table is a tournament.
    pub fn seats_to_kick(&self, max_missed_round: u32) -> Vec<Position> {
        self.missed_rounds
            .iter()
            .filter(|(_, &count)| count >= max_missed_round)
            .map(|(&seat, _)| seat)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_alarms_once_past_threshold() {
        let mut watchdog = LockWatchdog::new(Duration::from_millis(0));
        watchdog.mark_dirty();
        assert!(watchdog.poll());
        assert!(!watchdog.poll());
    }

    #[test]
    fn watchdog_resets_on_clean() {
        let mut watchdog = LockWatchdog::new(Duration::from_millis(0));
        watchdog.mark_dirty();
        assert!(watchdog.poll());
        watchdog.mark_clean();
        assert!(!watchdog.is_dirty());
    }

    #[test]
    fn sitting_out_tracker_kicks_regardless_of_tournament_flag() {
        let mut tracker = SittingOutTracker::new();
        tracker.record_missed_round(2);
        tracker.record_missed_round(2);
        tracker.record_missed_round(2);
        assert_eq!(tracker.seats_to_kick(3), vec![2]);
    }

    #[test]
    fn reset_clears_missed_count() {
        let mut tracker = SittingOutTracker::new();
        tracker.record_missed_round(1);
        tracker.reset(1);
        assert_eq!(tracker.missed_rounds(1), 0);
    }
}
