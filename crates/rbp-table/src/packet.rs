use rbp_cards::Board;
use rbp_cards::Hole;
use rbp_core::Chips;
use rbp_core::Position;
use serde::Serialize;

/// Messages the table session manager fans out to connected clients.
///
/// These cover session-manager concerns only — seating, money, timers,
/// chat, and the history differ's packetized output. Hand-rules packets
/// (legal actions, board reveals by street) belong to the engine's own
/// wire format and are out of scope here; the differ instead translates
/// each event tag directly into one of the variants below.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Initial connection confirmation with seat assignment.
    Connected { table: String, seat: Option<Position> },
    /// A player took a seat.
    PlayerSeated { seat: Position, buy_in: Chips },
    /// A player's stack changed outside of hand play (rebuy, buy-out).
    MoneyChanged { seat: Position, stack: Chips },
    /// A player left the table.
    PlayerLeft { seat: Position },
    /// A player was moved to a different table entirely (tournament move).
    TableMoved { seat: Position, destination_table: i64 },
    /// Warning that a player's decision clock is about to expire.
    TimeoutWarning { seat: Position, seconds_left: u64 },
    /// The forced-action deadline elapsed and the engine auto-played this seat.
    TimeoutNotice { seat: Position },
    /// A closed-table forced fold, distinct from the open-table sit-out-next-turn path.
    AutoFold { seat: Position },
    /// A player was auto-kicked for sitting out too long.
    KickedForSittingOut { seat: Position },
    /// A player entered or left sit-out.
    Sit { seat: Position },
    SitOut { seat: Position },
    /// A rebuy or buy-in was accepted, with the amount actually credited.
    BuyIn { seat: Position, amount: Chips },
    /// Current min/max/step/cap for this hand's betting.
    BetLimits { min: Chips, max: Chips, step: Chips, cap: u32 },
    /// Prompt to show or muck at showdown.
    MuckRequest { seat: Position },
    /// The table is torn down; no further packets will follow.
    TableDestroyed,
    /// Hole cards dealt privately to one seat.
    HoleCards { hand: i64, seat: Position, hole: Hole },
    /// Community cards revealed.
    BoardRevealed { hand: i64, board: Board },
    /// Chat relayed from another client, already filtered.
    Chat { seat: Position, message: String },
}

impl ServerMessage {
    pub fn connected(table: &str, seat: Option<Position>) -> Self {
        Self::Connected {
            table: table.to_string(),
            seat,
        }
    }
    pub fn player_seated(seat: Position, buy_in: Chips) -> Self {
        Self::PlayerSeated { seat, buy_in }
    }
    pub fn money_changed(seat: Position, stack: Chips) -> Self {
        Self::MoneyChanged { seat, stack }
    }
    pub fn player_left(seat: Position) -> Self {
        Self::PlayerLeft { seat }
    }
    pub fn table_moved(seat: Position, destination_table: i64) -> Self {
        Self::TableMoved { seat, destination_table }
    }
    pub fn timeout_warning(seat: Position, seconds_left: u64) -> Self {
        Self::TimeoutWarning { seat, seconds_left }
    }
    pub fn timeout_notice(seat: Position) -> Self {
        Self::TimeoutNotice { seat }
    }
    pub fn auto_fold(seat: Position) -> Self {
        Self::AutoFold { seat }
    }
    pub fn kicked_for_sitting_out(seat: Position) -> Self {
        Self::KickedForSittingOut { seat }
    }
    pub fn sit(seat: Position) -> Self {
        Self::Sit { seat }
    }
    pub fn sit_out(seat: Position) -> Self {
        Self::SitOut { seat }
    }
    pub fn buy_in(seat: Position, amount: Chips) -> Self {
        Self::BuyIn { seat, amount }
    }
    pub fn bet_limits(limits: crate::config::BetLimits) -> Self {
        Self::BetLimits {
            min: limits.min,
            max: limits.max,
            step: limits.step,
            cap: limits.cap,
        }
    }
    pub fn muck_request(seat: Position) -> Self {
        Self::MuckRequest { seat }
    }
    pub fn table_destroyed() -> Self {
        Self::TableDestroyed
    }
    pub fn hole_cards(hand: i64, seat: Position, hole: Hole) -> Self {
        Self::HoleCards { hand, seat, hole }
    }
    pub fn board_revealed(hand: i64, board: Board) -> Self {
        Self::BoardRevealed { hand, board }
    }
    pub fn chat(seat: Position, message: String) -> Self {
        Self::Chat { seat, message }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_serializes_with_tag() {
        let message = ServerMessage::connected("table-1", Some(3));
        let json = message.to_json();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"seat\":3"));
    }

    #[test]
    fn kicked_message_round_trips_through_json() {
        let message = ServerMessage::kicked_for_sitting_out(5);
        let json = message.to_json();
        assert!(json.contains("\"type\":\"kicked_for_sitting_out\""));
    }
}
