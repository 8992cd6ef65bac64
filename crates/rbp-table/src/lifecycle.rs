//! Player lifecycle: join/observe/seat/sit/sit-out/leave/kick/disconnect/move
//! (SPEC_FULL §4.F), plus the supplemented reconnect-replay behaviors from
//! `original_source/pokernetwork/pokertable.py` (SPEC_FULL §10).
//!
//! A player id is in exactly one of `{absent, observing, seated}` per table
//! (invariant 1, §3): `observing` is "has an [`Avatar`] in
//! [`AvatarIndex`] but no seat"; `seated` is "has an entry in
//! [`Table::seat_occupant`]". The flat anonymous `observers` pool inside
//! [`AvatarIndex`] is a separate concept — true identity-less lurkers —
//! and is untouched by this module.

use crate::avatar::Avatar;
use crate::error::TableError;
use crate::orchestrator::Table;
use crate::packet::ServerMessage;
use rbp_core::Position;
use rbp_core::Serial;
use tokio::sync::mpsc::UnboundedSender;

/// Volatile per-player flags the engine itself doesn't track (SPEC_FULL §3,
/// §9 "per-player user data bag"). `ready` gates autodeal's "everyone is
/// ready" check; `timeout_warned_at` backs the reconnect-resync behavior
/// (§10 "current timeout warning resync").
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerUserData {
    pub ready: bool,
    pub timeout_warned_at: Option<tokio::time::Instant>,
}

impl Table {
    fn is_observing(&self, player: Serial) -> bool {
        !self.avatars.get(player).is_empty() && !self.occupant_seat.contains_key(&player)
    }

    pub fn is_seated_player(&self, player: Serial) -> bool {
        self.occupant_seat.contains_key(&player)
    }

    pub fn seat_of(&self, player: Serial) -> Option<Position> {
        self.occupant_seat.get(&player).copied()
    }

    /// `join`: already-joined players get an idempotent resume, including a
    /// replay of the hand in progress if their seat is still held by the
    /// engine (§10 "hand replay on reconnect").
    pub async fn join(
        &mut self,
        player: Serial,
        sender: UnboundedSender<ServerMessage>,
        already_joined_tables: usize,
    ) -> Result<(), TableError> {
        if !self.avatars.get(player).is_empty() {
            self.avatars.add(player, Avatar::new(sender.clone()));
            for message in self.replay_for(player) {
                let _ = sender.send(message);
            }
            return Ok(());
        }
        let factory = self.factory()?;
        if factory.joined_count_reached_max(player) {
            return Err(TableError::ServerFull);
        }
        if already_joined_tables >= factory.simultaneous_tables_allowed() {
            return Err(TableError::AlreadyAtMaxTables);
        }
        self.avatars.add(player, Avatar::new(sender.clone()));
        factory.joined_count_increase(player);
        if let Some(&seat) = self.occupant_seat.get(&player) {
            // Engine still holds this seat from a prior disconnect.
            self.engine.come_back(seat).await?;
            self.avatars.broadcast(ServerMessage::sit(seat));
        }
        for message in self.replay_for(player) {
            let _ = sender.send(message);
        }
        Ok(())
    }

    /// `seat(seat_index | any)`: only from `observing`.
    pub async fn seat(&mut self, player: Serial, requested: Option<Position>, buy_in: rbp_core::Chips) -> Result<Position, TableError> {
        if !self.is_observing(player) {
            return Err(TableError::SeatTaken);
        }
        let seat = match requested {
            Some(s) => {
                if s >= self.descriptor.seats || self.seat_occupant.contains_key(&s) || !self.engine.can_add_player(s) {
                    return Err(TableError::CannotAddPlayer);
                }
                s
            }
            None => (0..self.descriptor.seats)
                .find(|s| !self.seat_occupant.contains_key(s) && self.engine.can_add_player(*s))
                .ok_or(TableError::CannotAddPlayer)?,
        };
        let paid = self.buy_in_internal(player, seat, buy_in).await?;
        self.engine.add_player(seat, paid).await?;
        self.seat_occupant.insert(seat, player);
        self.occupant_seat.insert(player, seat);
        self.buy_in_paid.insert(player);
        // Seed the per-player bookkeeping the money controller and autodeal
        // scheduler read: an auto-policy entry (defaulting to off, until
        // the player opts in via `set_auto_policy`) and a user-data entry
        // (`ready=false` until the next `autodeal` marks it, SPEC_FULL
        // §4.H "beginTurn ... marks every player's ready=True").
        self.auto_policy.entry(player).or_default();
        self.user_data.entry(player).or_default();
        self.avatars.broadcast(ServerMessage::player_seated(seat, paid));
        Ok(seat)
    }

    /// `sit` / resume playing. A no-op on an already-sit player still
    /// rebroadcasts `Sit` (SPEC_FULL §8 idempotence).
    pub async fn sit(&mut self, player: Serial) -> Result<(), TableError> {
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        self.engine.sit(seat).await?;
        self.avatars.broadcast(ServerMessage::sit(seat));
        Ok(())
    }

    /// `sit_out`: open tables defer with `sit_out_next_turn`; closed tables
    /// force the seat to fold immediately via `auto_player` + `AutoFold`.
    pub async fn sit_out(&mut self, player: Serial) -> Result<(), TableError> {
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if self.engine.is_open() {
            self.engine.sit_out_next_turn(seat).await?;
        } else {
            self.engine.auto_player(seat, true).await?;
            self.avatars.broadcast(ServerMessage::auto_fold(seat));
        }
        self.avatars.broadcast(ServerMessage::sit_out(seat));
        Ok(())
    }

    /// `leave` / `quit`: refused outright on a closed (tournament) table
    /// (invariant 6).
    pub async fn leave(&mut self, player: Serial) -> Result<(), TableError> {
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        if !self.engine.is_open() {
            return Err(TableError::TourneyLeaveRefused);
        }
        self.engine.sit_out_next_turn(seat).await?;
        self.engine.auto_player(seat, true).await?;
        self.stand_up(player, seat);
        let factory = self.factory()?;
        factory.leave_player(player).await.map_err(|e| TableError::Internal(e.to_string()))?;
        factory.joined_count_decrease(player);
        self.avatars.broadcast(ServerMessage::player_left(seat));
        Ok(())
    }

    /// `disconnect`: like `leave` but does not require an open table — the
    /// seat, if any, is retained untouched so a later `join` can resume it.
    /// Mirrors `join`'s `joined_count_increase` once the player's last
    /// avatar session drops, since a later `join` will increase again (its
    /// `already-joined` check is keyed on having a live avatar, not a seat).
    pub fn disconnect(&mut self, player: Serial, sender: &UnboundedSender<ServerMessage>) {
        self.avatars.remove(player, sender);
        if self.avatars.get(player).is_empty() {
            if let Ok(factory) = self.factory() {
                factory.joined_count_decrease(player);
            }
        }
    }

    /// `kick(serial)`: the sit-out-too-long sweep's forced removal. Never
    /// runs against a tournament table (SPEC_FULL §9 open-question
    /// resolution); that gate is enforced by the caller in `autodeal.rs`.
    pub async fn kick(&mut self, player: Serial) -> Result<(), TableError> {
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        self.engine.remove_player(seat).await?;
        self.stand_up(player, seat);
        if let Ok(factory) = self.factory() {
            let _ = factory.leave_player(player).await;
        }
        self.avatars.broadcast(ServerMessage::player_left(seat));
        Ok(())
    }

    /// `move(serial, dest_table)`: remove from this table's engine, ask the
    /// factory to record the transfer, and re-seat on `destination` with
    /// the in-memory stack carried across (SPEC_FULL §4.F, scenario 6).
    pub async fn move_player(&mut self, player: Serial, destination: &mut Table) -> Result<(), TableError> {
        let seat = self.seat_of(player).ok_or(TableError::NotSeated)?;
        let in_memory_money = self.engine.get_player_money(seat);
        let dest_seat = (0..destination.descriptor.seats)
            .find(|s| !destination.seat_occupant.contains_key(s) && destination.engine.can_add_player(*s))
            .ok_or(TableError::CannotAddPlayer)?;
        self.avatars.broadcast(ServerMessage::table_moved(seat, destination.id));
        self.engine.remove_player(seat).await?;
        self.stand_up(player, seat);
        let factory = self.factory()?;
        factory
            .move_player(player, seat, dest_seat)
            .await
            .map_err(|e| TableError::Internal(e.to_string()))?;
        destination.engine.add_player(dest_seat, in_memory_money).await?;
        destination.seat_occupant.insert(dest_seat, player);
        destination.occupant_seat.insert(player, dest_seat);
        destination.buy_in_paid.insert(player);
        destination.engine.come_back(dest_seat).await?;
        destination.engine.sit(dest_seat).await?;
        destination.avatars.broadcast(ServerMessage::player_seated(dest_seat, in_memory_money));
        Ok(())
    }

    /// Demotes a seated player back to `observing`: removes the seat
    /// bookkeeping but leaves any connected [`Avatar`] attached so the
    /// player keeps seeing the table (SPEC_FULL §4.E.3 "demote any live
    /// avatar from seated to observer").
    pub(crate) fn stand_up(&mut self, player: Serial, seat: Position) {
        self.seat_occupant.remove(&seat);
        self.occupant_seat.remove(&player);
        self.buy_in_paid.remove(&player);
        self.user_data.remove(&player);
        self.sitting_out.reset(seat);
    }

    pub(crate) fn factory(&self) -> Result<std::sync::Arc<dyn crate::factory::Factory>, TableError> {
        self.factory.as_ref().and_then(|w| w.upgrade()).ok_or(TableError::Destroyed)
    }

    /// §10 "hand replay on reconnect": board, own hole cards, and the
    /// action log since `game`, for a rejoining avatar whose seat the
    /// engine still holds.
    pub fn replay_for(&self, player: Serial) -> Vec<ServerMessage> {
        let Some(&seat) = self.occupant_seat.get(&player) else {
            return vec![ServerMessage::connected(&self.descriptor.name, None)];
        };
        let mut messages = vec![ServerMessage::connected(&self.descriptor.name, Some(seat))];
        for event in self.engine.history() {
            match event.tag {
                Some(crate::engine::EventTag::Round) => {
                    if let Some((s, hole)) = event.hole {
                        if s == seat {
                            messages.push(ServerMessage::hole_cards(self.engine.hand_serial(), seat, hole));
                        }
                    }
                }
                Some(crate::engine::EventTag::Showdown) => {
                    if let Some(board) = event.board {
                        messages.push(ServerMessage::board_revealed(self.engine.hand_serial(), board));
                    }
                }
                _ => {}
            }
        }
        messages
    }

    /// §10 "current timeout warning resync": whatever warning is already
    /// outstanding for the in-position seat, so a reconnecting client
    /// doesn't wait for the next phase boundary.
    pub fn current_timeout_warning(&self) -> Option<ServerMessage> {
        let seat = self.engine.serial_in_position()?;
        let timer = self.timers.get(seat)?;
        if !timer.warned() {
            return None;
        }
        Some(ServerMessage::timeout_warning(seat, timer.remaining().unwrap_or_default().as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_user_data_starts_not_ready() {
        let data = PlayerUserData::default();
        assert!(!data.ready);
        assert!(data.timeout_warned_at.is_none());
    }
}
