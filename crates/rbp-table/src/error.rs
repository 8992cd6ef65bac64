use std::fmt;

/// The error taxonomy a table session can surface.
///
/// Validation and engine-refusal variants are caller-visible failures with
/// no state change. Money-inconsistency, watchdog, and internal variants are
/// logged and the table keeps running — see the propagation policy in
/// SPEC_FULL §7.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// Caller precondition violated; no state change.
    NotSeated,
    SeatTaken,
    ServerFull,
    AlreadyAtMaxTables,
    TourneyLeaveRefused,
    NegativeRebuy,
    NotTransient,
    BuyInAlreadyPaid,
    HandRunning,
    /// Engine refused a mutation it was asked to perform.
    CannotAddPlayer,
    CannotSit,
    RebuyRefused,
    MaxBuyInReached,
    /// `update` was entered while already running.
    ReEntrant,
    /// The table has been destroyed; the factory handle is gone.
    Destroyed,
    /// An event tag the differ did not recognize.
    UnknownEventTag(String),
    /// A defensive assertion failed; logged, best-effort continue.
    Internal(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSeated => write!(f, "player is not seated"),
            Self::SeatTaken => write!(f, "seat is already taken"),
            Self::ServerFull => write!(f, "server has reached its joined-player cap"),
            Self::AlreadyAtMaxTables => write!(f, "player already joined the simultaneous-table limit"),
            Self::TourneyLeaveRefused => write!(f, "tournament tables refuse leave/stand-up"),
            Self::NegativeRebuy => write!(f, "rebuy amount must be positive"),
            Self::NotTransient => write!(f, "operation requires a transient table"),
            Self::BuyInAlreadyPaid => write!(f, "buy-in has already been paid"),
            Self::HandRunning => write!(f, "a hand is currently running"),
            Self::CannotAddPlayer => write!(f, "engine refused to add player"),
            Self::CannotSit => write!(f, "engine refused to sit player"),
            Self::RebuyRefused => write!(f, "rebuy is not possible for this player"),
            Self::MaxBuyInReached => write!(f, "player already holds the maximum buy-in"),
            Self::ReEntrant => write!(f, "update called while already running"),
            Self::Destroyed => write!(f, "table has been destroyed"),
            Self::UnknownEventTag(tag) => write!(f, "unknown event tag: {tag}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for TableError {}
