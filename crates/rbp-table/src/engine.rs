use crate::config::BetLimits;
use crate::error::TableError;
use async_trait::async_trait;
use rbp_cards::Board;
use rbp_cards::Hole;
use rbp_cards::Street;
use rbp_core::Chips;
use rbp_core::Position;

/// Every distinct kind of event a hand can emit, in the order the history
/// differ walks them. `Unknown` absorbs anything the engine reports that
/// this build doesn't recognize yet rather than failing the diff outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTag {
    Game,
    WaitFor,
    Rebuy,
    BuyOut,
    PlayerList,
    Round,
    Showdown,
    Rake,
    Muck,
    Position,
    BlindRequest,
    WaitBlind,
    Blind,
    AnteRequest,
    Ante,
    AllIn,
    Call,
    Check,
    Fold,
    Raise,
    Canceled,
    SitOut,
    Sit,
    Leave,
    End,
    Finish,
    EndRoundLast,
    Unknown(String),
}

/// One entry in a hand's append-only event history.
///
/// Fields are a superset over all tags; any given tag only populates the
/// fields relevant to it. The differ matches on `tag` and reads only the
/// fields that tag defines.
#[derive(Debug, Clone, Default)]
pub struct HistoryEvent {
    pub tag: Option<EventTag>,
    pub serial: Option<Position>,
    pub amount: Chips,
    pub dead: Chips,
    pub board: Option<Board>,
    pub hole: Option<(Position, Hole)>,
    pub shares: Vec<(Position, Chips)>,
    pub rake: Vec<(Position, Chips)>,
    pub street: Option<Street>,
}

impl Default for EventTag {
    fn default() -> Self {
        EventTag::Unknown(String::new())
    }
}

/// The hand-rules engine a table drives. A full implementation lives outside
/// this crate (hand evaluation, betting rounds, showdown) — this trait is
/// the seam the session manager calls through, queried every update cycle
/// and mutated in response to player actions and timers.
#[async_trait]
pub trait Engine: Send {
    // -- queries, synchronous: cheap, no side effects --
    fn is_end_or_null(&self) -> bool;
    fn is_end_or_muck(&self) -> bool;
    fn is_running(&self) -> bool;
    fn is_tournament(&self) -> bool;
    /// Only meaningful when `is_tournament()`: whether the tournament this
    /// table belongs to is still in its running phase (the autodeal gate,
    /// §4.H, refuses to deal a tournament table that has finished or has
    /// not yet started).
    fn is_tournament_running(&self) -> bool;
    fn is_open(&self) -> bool;
    fn seats(&self) -> Position;
    fn seats_left(&self) -> Position;
    fn serials_all(&self) -> Vec<Position>;
    fn serials_sit(&self) -> Vec<Position>;
    fn serials_playing(&self) -> Vec<Position>;
    fn is_seated(&self, seat: Position) -> bool;
    fn is_sit(&self, seat: Position) -> bool;
    fn is_broke(&self, seat: Position) -> bool;
    fn is_rebuy_possible(&self, seat: Position) -> bool;
    fn can_add_player(&self, seat: Position) -> bool;
    fn get_player_money(&self, seat: Position) -> Chips;
    fn buy_in(&self, seat: Position) -> Chips;
    fn best_buy_in(&self) -> Chips;
    fn max_buy_in(&self) -> Chips;
    fn bet_limits(&self) -> BetLimits;
    fn chip_unit(&self) -> Chips;
    /// The seat currently due to act, if any. Named after the original
    /// `getSerialInPosition` query; in this seat-addressed `Engine`, "serial"
    /// and "seat" coincide (global player identity lives one layer up, in
    /// the table's own seat↔[`rbp_core::Serial`] map).
    fn serial_in_position(&self) -> Option<Position>;
    fn hand_serial(&self) -> i64;
    fn history(&self) -> &[HistoryEvent];
    fn history_can_be_reduced(&self) -> bool;
    fn muckable_serials(&self) -> Vec<Position>;
    fn is_muck_state(&self) -> bool;

    // -- mutations: may append to history, may be refused --
    async fn begin_turn(&mut self) -> Result<(), TableError>;
    async fn add_player(&mut self, seat: Position, buy_in: Chips) -> Result<(), TableError>;
    async fn remove_player(&mut self, seat: Position) -> Result<(), TableError>;
    async fn sit(&mut self, seat: Position) -> Result<(), TableError>;
    async fn sit_out_next_turn(&mut self, seat: Position) -> Result<(), TableError>;
    async fn auto_player(&mut self, seat: Position, on: bool) -> Result<(), TableError>;
    async fn come_back(&mut self, seat: Position) -> Result<(), TableError>;
    async fn muck(&mut self, seat: Position, show: bool) -> Result<(), TableError>;
    async fn fold(&mut self, seat: Position) -> Result<(), TableError>;
    async fn rebuy(&mut self, seat: Position, amount: Chips) -> Result<(), TableError>;
    async fn history_reduce(&mut self) -> Result<(), TableError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_defaults_empty() {
        assert_eq!(EventTag::default(), EventTag::Unknown(String::new()));
    }

    #[test]
    fn history_event_default_has_no_tag() {
        let event = HistoryEvent::default();
        assert!(event.tag.is_none());
        assert!(event.shares.is_empty());
    }
}
