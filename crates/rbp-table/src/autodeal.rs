//! Autodeal scheduling and the sit-out-too-long kick sweep (SPEC_FULL
//! §4.H). Decides whether and when the next hand may begin, and runs the
//! end-of-`finish` housekeeping the orchestrator's update cycle calls
//! into (kick sweep, tournament hooks).

use crate::money::AutoPolicy;
use crate::orchestrator::Table;
use rbp_core::Serial;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Coarse autodeal verdict exposed alongside the finer-grained
/// `should_autodeal` predicate, for callers that want a single enum
/// rather than re-deriving it from the boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutodealDecision {
    Deal,
    Blocked,
}

impl Table {
    fn willing_to_play(&self) -> HashSet<Serial> {
        let mut willing: HashSet<Serial> = self.rebuy_stack.iter().map(|&(player, _)| player).collect();
        for (&seat, &player) in &self.seat_occupant {
            if let Some(policies) = self.auto_policy.get(&player) {
                let auto_enabled = policies.refill != AutoPolicy::Off || policies.rebuy != AutoPolicy::Off;
                if auto_enabled && self.engine.get_player_money(seat) <= 0 {
                    willing.insert(player);
                }
            }
        }
        for seat in self.engine.serials_sit() {
            if let Some(&player) = self.seat_occupant.get(&seat) {
                willing.insert(player);
            }
        }
        willing
    }

    /// SPEC_FULL §4.H: server not shutting down, autodeal enabled, no hand
    /// running, engine not in `Muck`, at least two willing players, and
    /// the tournament/temporary-user gate.
    pub fn should_autodeal(&self) -> bool {
        let Ok(factory) = self.factory() else { return false };
        if factory.shutting_down() {
            return false;
        }
        if !self.settings.autodeal {
            return false;
        }
        if self.engine.is_running() {
            return false;
        }
        if self.engine.is_muck_state() {
            return false;
        }
        if self.willing_to_play().len() < 2 {
            return false;
        }
        if self.descriptor.is_tournament() {
            return self.engine.is_tournament_running();
        }
        if self.settings.autodeal_temporary {
            return true;
        }
        !self
            .seat_occupant
            .values()
            .all(|&player| factory.is_temporary_user(player))
    }

    pub fn decide_autodeal(&self) -> AutodealDecision {
        if self.should_autodeal() {
            AutodealDecision::Deal
        } else {
            AutodealDecision::Blocked
        }
    }

    /// Computes the delay before the deal timer should next fire and arms
    /// it (SPEC_FULL §4.H "schedule_autodeal"). `all_ready` reflects
    /// whether every willing player's `PlayerUserData::ready` is set.
    pub fn schedule_autodeal(&mut self, all_ready: bool) {
        let now = Instant::now();
        let delay = if !all_ready && self.delayed_accumulator > Duration::ZERO {
            let elapsed = self.delay_start.map(|start| now.saturating_duration_since(start)).unwrap_or_default();
            self.delayed_accumulator
                .saturating_sub(elapsed)
                .min(self.settings.delays.autodeal_max)
        } else if self.descriptor.tourney.is_some() {
            self.settings.delays.autodeal_tournament_min
        } else {
            Duration::ZERO
        };
        let arm_in = delay.min(self.settings.delays.autodeal_check);
        self.timers.schedule_delayed(now + arm_in);
    }

    /// Drains pending rebuys, then deals the next hand if still eligible
    /// (SPEC_FULL §4.H "autodeal").
    pub async fn autodeal(&mut self) -> Result<bool, crate::error::TableError> {
        self.drain_rebuy_stack().await;
        for player in self.willing_to_play() {
            if let Some(data) = self.user_data.get_mut(&player) {
                if !data.ready {
                    log::info!("table {}: player {player} did not ready up before the deal", self.id);
                }
            }
        }
        if !self.should_autodeal() {
            return Ok(false);
        }
        self.engine.begin_turn().await?;
        self.hands_dealt += 1;
        // SPEC_FULL §4.H "beginTurn ... marks every player's ready=True".
        for data in self.user_data.values_mut() {
            data.ready = true;
        }
        self.differ.reset(self.engine.hand_serial());
        self.timers.clear_delayed();
        Ok(true)
    }

    /// Sweep of seats that have missed `max_missed_round` consecutive
    /// hands, run on `finish`. Unconditionally skipped on tournament
    /// tables (SPEC_FULL §9, Open Question #3) — `SittingOutTracker`
    /// itself carries no tournament awareness; the gate lives here, at
    /// the call site, so the sweep and the counter stay decoupled.
    pub(crate) async fn kick_sitting_out_too_long(&mut self) {
        if self.descriptor.is_tournament() {
            return;
        }
        let to_kick = self.sitting_out.seats_to_kick(self.descriptor.max_missed_round);
        for seat in to_kick {
            let Some(&player) = self.seat_occupant.get(&seat) else { continue };
            if let Err(error) = self.kick(player).await {
                log::warn!("table {}: failed to kick sitting-out player {player}: {error}", self.id);
            }
        }
    }

    pub(crate) async fn tourney_end_turn_hook(&mut self) {
        if !self.descriptor.is_tournament() {
            return;
        }
        if let Ok(factory) = self.factory() {
            if let Err(error) = factory.tourney_end_turn(self.id).await {
                log::warn!("table {}: tourney_end_turn failed: {error}", self.id);
            }
        }
    }

    pub(crate) async fn tourney_update_stats_hook(&mut self) {
        if !self.descriptor.is_tournament() {
            return;
        }
        let Ok(factory) = self.factory() else { return };
        for (&seat, &player) in &self.seat_occupant {
            let chips = self.engine.get_player_money(seat);
            if let Err(error) = factory.tourney_update_stats(self.id, player, chips).await {
                log::warn!("table {}: tourney_update_stats failed for {player}: {error}", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_variants_are_distinguishable() {
        assert_ne!(AutodealDecision::Deal, AutodealDecision::Blocked);
    }
}
