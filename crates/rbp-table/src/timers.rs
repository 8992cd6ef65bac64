use rbp_core::Position;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline tracking for a single seat's decision clock, plus the warning
/// fired once before the hard timeout. One `SeatTimer` lives per occupied
/// seat; the orchestrator's `tokio::select!` sleeps until the soonest
/// deadline across every live timer.
#[derive(Debug, Clone, Copy)]
pub struct SeatTimer {
    seat: Position,
    deadline: Option<Instant>,
    warned: bool,
    timeout: Duration,
}

impl SeatTimer {
    pub fn new(seat: Position, timeout: Duration) -> Self {
        Self {
            seat,
            deadline: None,
            warned: false,
            timeout,
        }
    }

    pub fn seat(&self) -> Position {
        self.seat
    }

    pub fn start(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
        self.warned = false;
    }

    pub fn clear(&mut self) {
        self.deadline = None;
        self.warned = false;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn warned(&self) -> bool {
        self.warned
    }

    /// True the first time remaining time drops to or below `threshold`.
    /// The caller arms the timer for the phase-2 (forced-action) deadline
    /// and passes `TIMEOUT_DELAY_COMPENSATION` as `threshold`, so the
    /// warning lands exactly at the phase-1 boundary
    /// (SPEC_FULL §4.D; see `orchestrator::update_timers`).
    pub fn should_warn(&mut self, threshold: Duration) -> bool {
        if self.warned {
            return false;
        }
        let Some(remaining) = self.remaining() else {
            return false;
        };
        if remaining <= threshold {
            self.warned = true;
            return true;
        }
        false
    }
}

/// Pool of seat timers for one table's active hand, plus the generic
/// delayed-action clock used by the autodeal scheduler and the lock
/// watchdog (SPEC_FULL §4.D, §4.E.3, §4.F).
#[derive(Debug, Default)]
pub struct TimerBoard {
    seats: Vec<SeatTimer>,
    delayed: Option<Instant>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, seat: Position, timeout: Duration) {
        self.clear(seat);
        let mut timer = SeatTimer::new(seat, timeout);
        timer.start();
        self.seats.push(timer);
    }

    pub fn clear(&mut self, seat: Position) {
        self.seats.retain(|t| t.seat() != seat);
    }

    pub fn clear_all(&mut self) {
        self.seats.clear();
    }

    pub fn get_mut(&mut self, seat: Position) -> Option<&mut SeatTimer> {
        self.seats.iter_mut().find(|t| t.seat() == seat)
    }

    pub fn get(&self, seat: Position) -> Option<&SeatTimer> {
        self.seats.iter().find(|t| t.seat() == seat)
    }

    pub fn expired_seats(&self) -> Vec<Position> {
        self.seats.iter().filter(|t| t.expired()).map(|t| t.seat()).collect()
    }

    pub fn soonest_deadline(&self) -> Option<Instant> {
        let seats = self.seats.iter().filter_map(|t| t.deadline());
        let delayed = self.delayed.into_iter();
        seats.chain(delayed).min()
    }

    /// Schedule the table's next delayed action (autodeal, lock check) at
    /// `when`. Replaces any previously scheduled delayed action.
    pub fn schedule_delayed(&mut self, when: Instant) {
        self.delayed = Some(when);
    }

    pub fn clear_delayed(&mut self) {
        self.delayed = None;
    }

    pub fn delayed_expired(&self) -> bool {
        self.delayed.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_timer_starts_cleared() {
        let timer = SeatTimer::new(0, Duration::from_secs(10));
        assert!(timer.deadline().is_none());
        assert!(!timer.expired());
    }

    #[test]
    fn seat_timer_sets_and_clears_deadline() {
        let mut timer = SeatTimer::new(0, Duration::from_secs(10));
        timer.start();
        assert!(timer.deadline().is_some());
        timer.clear();
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn warns_once_then_stays_silent() {
        let mut timer = SeatTimer::new(0, Duration::from_millis(0));
        timer.start();
        let window = Duration::from_secs(3600);
        assert!(timer.should_warn(window));
        assert!(!timer.should_warn(window));
    }

    #[test]
    fn timer_board_tracks_multiple_seats() {
        let mut board = TimerBoard::new();
        board.arm(0, Duration::from_secs(10));
        board.arm(1, Duration::from_secs(5));
        assert!(board.soonest_deadline().is_some());
        board.clear(0);
        assert!(board.get_mut(0).is_none());
        assert!(board.get_mut(1).is_some());
    }

    /// SPEC_FULL §8 boundary: `playerTimeout=60` warns at 30s and forces
    /// action at 32s. Callers arm a `SeatTimer` for the phase-2 deadline
    /// directly (`half + compensation`), so the warning window is the
    /// compensation itself (SPEC_FULL §4.D, see `orchestrator::update_timers`).
    #[tokio::test(start_paused = true)]
    async fn sixty_second_timeout_warns_at_thirty_and_expires_at_thirty_two() {
        let half = Duration::from_secs(30);
        let compensation = Duration::from_secs(rbp_core::TIMEOUT_DELAY_COMPENSATION);
        let mut timer = SeatTimer::new(0, half + compensation);
        timer.start();

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!timer.should_warn(compensation));
        assert!(!timer.expired());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(timer.should_warn(compensation), "should warn exactly at playerTimeout/2 elapsed");
        assert!(!timer.expired());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(timer.expired(), "should force action at playerTimeout/2 + compensation elapsed");
    }
}
