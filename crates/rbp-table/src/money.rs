//! Buy-in, rebuy, auto-refill/auto-rebuy, and the forced money reset
//! (SPEC_FULL §4.G). Every path here eventually goes through
//! [`crate::factory::Factory`] for the durable side of the ledger; the
//! engine's own `Chips` balance is the in-memory source of truth between
//! writes (invariant 2, §3).

use crate::error::TableError;
use crate::orchestrator::Table;
use crate::packet::ServerMessage;
use rbp_core::Chips;
use rbp_core::Position;
use rbp_core::Serial;
use std::collections::HashSet;

/// Per-player automatic money policy, drained at end of hand. Auto-refill
/// tops a seated player back up every hand regardless of balance;
/// auto-rebuy only fires once the seat reaches zero. `Min`/`Max`/`Best`
/// name the refill target: the table minimum, the table maximum, or the
/// player's own last buy-in amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoPolicy {
    #[default]
    Off,
    Min,
    Max,
    Best,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPolicies {
    pub refill: AutoPolicy,
    pub rebuy: AutoPolicy,
}

/// Outcome of an immediate rebuy attempt (SPEC_FULL §9, Open Question #2).
/// `Refused` also carries the "queued for next end-of-hand drain" case —
/// the caller distinguishes it from `Applied` either way, and the queued
/// case is paired with a push onto `rebuy_stack` before returning.
#[derive(Debug, Clone)]
pub enum RebuyOutcome {
    Applied(Chips),
    Refused(TableError),
    ForceLeave,
}

impl Table {
    /// Records a player's auto-refill/auto-rebuy policy (SPEC_FULL §4.G
    /// "Auto-refill / auto-rebuy"). Client-facing: a seated player sets
    /// this once and `drain_auto_policies`/`willing_to_play` act on it at
    /// every subsequent end-of-hand and autodeal check.
    pub fn set_auto_policy(&mut self, player: Serial, policies: AutoPolicies) -> Result<(), TableError> {
        if !self.is_seated_player(player) {
            return Err(TableError::NotSeated);
        }
        self.auto_policy.insert(player, policies);
        Ok(())
    }

    /// Debits a buy-in through the factory. Guards: not mid-hand, not a
    /// transient table, not already paid (SPEC_FULL §4.G "Buy-in").
    /// `seat` is the seat about to be occupied, since the engine's own
    /// minimum buy-in may vary by seat (bomb-pot/ante variants).
    pub(crate) async fn buy_in_internal(&mut self, player: Serial, seat: Position, requested: Chips) -> Result<Chips, TableError> {
        if self.engine.is_running() {
            return Err(TableError::HandRunning);
        }
        if self.descriptor.transient {
            return Err(TableError::NotTransient);
        }
        if self.buy_in_paid.contains(&player) {
            return Err(TableError::BuyInAlreadyPaid);
        }
        let amount = requested.max(self.engine.buy_in(seat));
        let factory = self.factory()?;
        factory
            .buy_in_player(player, amount)
            .await
            .map_err(|e| TableError::Internal(e.to_string()))?;
        self.last_buy_in.insert(player, amount);
        Ok(amount)
    }

    /// `rebuy_player_request`: applies immediately if the engine currently
    /// allows a rebuy, otherwise queues `(player, amount)` for the next
    /// end-of-hand drain (invariant 5: drained exactly once per hand
    /// serial, guarded by `last_rebuy_hand_serial`).
    pub async fn rebuy_player_request(&mut self, player: Serial, amount: Chips) -> Result<RebuyOutcome, TableError> {
        if amount <= 0 {
            return Err(TableError::NegativeRebuy);
        }
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.engine.is_rebuy_possible(seat) {
            self.rebuy_player_request_now(player, seat, amount).await
        } else {
            self.rebuy_stack.push((player, amount));
            Ok(RebuyOutcome::Refused(TableError::HandRunning))
        }
    }

    /// Drains `rebuy_stack`, at most once per hand serial. Called from the
    /// orchestrator's update cycle (step 2).
    pub(crate) async fn drain_rebuy_stack(&mut self) {
        let hand_serial = self.engine.hand_serial();
        if self.last_rebuy_hand_serial == Some(hand_serial) {
            return;
        }
        self.last_rebuy_hand_serial = Some(hand_serial);
        let pending = std::mem::take(&mut self.rebuy_stack);
        for (player, amount) in pending {
            let Some(seat) = self.seat_of(player) else { continue };
            if self.engine.is_rebuy_possible(seat) {
                let _ = self.rebuy_player_request_now(player, seat, amount).await;
            } else {
                self.rebuy_stack.push((player, amount));
            }
        }
    }

    /// Immediate rebuy (SPEC_FULL §4.G "Immediate rebuy"). Must be seated,
    /// buy-in already paid, and not a tournament table.
    async fn rebuy_player_request_now(&mut self, player: Serial, seat: Position, amount: Chips) -> Result<RebuyOutcome, TableError> {
        if self.descriptor.is_tournament() {
            return Ok(RebuyOutcome::Refused(TableError::RebuyRefused));
        }
        if !self.buy_in_paid.contains(&player) {
            return Ok(RebuyOutcome::Refused(TableError::NotSeated));
        }
        let current = self.engine.get_player_money(seat);
        let headroom = self.engine.max_buy_in() - current;
        if headroom <= 0 {
            return Ok(RebuyOutcome::Refused(TableError::MaxBuyInReached));
        }
        let floor = (self.engine.buy_in(seat) - current).max(0);
        let clamped = amount.max(floor).min(headroom);
        let factory = self.factory()?;
        match factory.buy_in_player(player, clamped).await {
            Ok(()) => {
                self.engine.come_back(seat).await?;
                self.engine.sit(seat).await?;
                self.avatars.broadcast(ServerMessage::buy_in(seat, clamped));
                Ok(RebuyOutcome::Applied(clamped))
            }
            Err(_) => Ok(RebuyOutcome::ForceLeave),
        }
    }

    /// Drains auto-refill/auto-rebuy for every seated player at end of
    /// hand (SPEC_FULL §4.G "Auto-refill / auto-rebuy"). Auto-refill takes
    /// priority and runs regardless of balance; auto-rebuy only fires once
    /// the seat is broke.
    pub(crate) async fn drain_auto_policies(&mut self) {
        let seats: Vec<Position> = self.seat_occupant.keys().copied().collect();
        for seat in seats {
            let Some(&player) = self.seat_occupant.get(&seat) else { continue };
            let Some(policies) = self.auto_policy.get(&player).copied() else { continue };
            let broke = self.engine.get_player_money(seat) <= 0;
            let policy = if policies.refill != AutoPolicy::Off {
                policies.refill
            } else if policies.rebuy != AutoPolicy::Off && broke {
                policies.rebuy
            } else {
                continue;
            };
            let current = self.engine.get_player_money(seat);
            let target = match policy {
                AutoPolicy::Min => self.engine.buy_in(seat),
                AutoPolicy::Max => self.engine.max_buy_in(),
                AutoPolicy::Best => self.last_buy_in.get(&player).copied().unwrap_or_else(|| self.engine.buy_in(seat)),
                AutoPolicy::Off => continue,
            };
            if target <= current {
                continue;
            }
            if let Ok(RebuyOutcome::ForceLeave) = self.rebuy_player_request_now(player, seat, target - current).await {
                let _ = self.kick(player).await;
            }
        }
    }

    /// Destructive admin operation: resets listed players' money, folding
    /// through a running hand if necessary (SPEC_FULL §4.G "Forced money
    /// reset"). Per the resolved Open Question (§9), the safety-bound fold
    /// loop's in-memory mutations are **not** rolled back if the bound is
    /// exhausted before the hand ends — only logged.
    pub async fn update_players_money(&mut self, updates: &[(Serial, Chips)], relative: bool) -> bool {
        let listed: HashSet<Serial> = updates.iter().map(|(player, _)| *player).collect();
        if self.engine.is_running() {
            let broke_seats: Vec<(Position, Serial)> = self
                .seat_occupant
                .iter()
                .filter(|&(&seat, _)| self.engine.is_broke(seat))
                .map(|(&seat, &player)| (seat, player))
                .collect();
            for &(_, player) in &broke_seats {
                if !listed.contains(&player) {
                    log::error!("table {}: update_players_money refused, broke player {player} not in the update list", self.id);
                    return false;
                }
            }
            for &(seat, _) in &broke_seats {
                if let Err(error) = self.engine.rebuy(seat, 1).await {
                    log::error!("table {}: temporary keep-alive rebuy for seat {seat} failed: {error}", self.id);
                }
            }
            let bound = self.seat_occupant.len();
            for _ in 0..bound {
                if self.engine.is_end_or_null() {
                    break;
                }
                let Some(seat) = self.engine.serial_in_position() else { break };
                if let Err(error) = self.engine.fold(seat).await {
                    log::error!("table {}: forced fold during update_players_money failed: {error}", self.id);
                    break;
                }
            }
            if !self.engine.is_end_or_null() {
                log::error!(
                    "table {}: update_players_money safety bound ({bound}) exhausted before the hand ended; \
                     the keep-alive rebuys issued above are not rolled back",
                    self.id
                );
            }
        }
        let mut all_ok = true;
        for &(player, chips) in updates {
            let Some(&seat) = self.occupant_seat.get(&player) else {
                all_ok = false;
                continue;
            };
            let current = self.engine.get_player_money(seat);
            let target = if relative { current + chips } else { chips };
            if target < 0 {
                all_ok = false;
                continue;
            }
            let delta = target - current;
            if delta == 0 {
                continue;
            }
            if self.engine.rebuy(seat, delta).await.is_err() {
                all_ok = false;
                continue;
            }
            if let Ok(factory) = self.factory() {
                let _ = factory.update_player_money(player, delta).await;
            }
            self.avatars.broadcast(ServerMessage::money_changed(seat, target));
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_policy_defaults_off() {
        assert_eq!(AutoPolicy::default(), AutoPolicy::Off);
    }

    #[test]
    fn auto_policies_default_both_off() {
        let policies = AutoPolicies::default();
        assert_eq!(policies.refill, AutoPolicy::Off);
        assert_eq!(policies.rebuy, AutoPolicy::Off);
    }
}
