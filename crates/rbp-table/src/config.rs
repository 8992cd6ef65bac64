use rbp_cards::Card;
use rbp_core::Chips;
use rbp_core::Position;
use std::time::Duration;

/// A table's static configuration (SPEC_FULL §6 Configuration).
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: String,
    pub variant: String,
    pub betting_structure: String,
    pub seats: Position,
    pub forced_dealer_seat: Option<Position>,
    pub skin: Option<String>,
    pub currency_serial: i64,
    pub player_timeout: Duration,
    pub muck_timeout: Duration,
    pub transient: bool,
    pub tourney: Option<i64>,
    pub max_missed_round: u32,
    /// The room this table belongs to, passed to `Factory::create_hand`
    /// when a hand starts so the resulting `rbp_records::Hand` rows carry
    /// their real room, not a stand-in.
    pub room: rbp_core::ID<rbp_records::Room>,
}

impl Default for TableDescriptor {
    fn default() -> Self {
        Self {
            name: String::from("table"),
            variant: String::from("holdem"),
            betting_structure: String::from("no-limit"),
            seats: rbp_core::N,
            forced_dealer_seat: None,
            skin: None,
            currency_serial: 0,
            player_timeout: Duration::from_secs(60),
            muck_timeout: Duration::from_secs(5),
            transient: false,
            tourney: None,
            max_missed_round: 3,
            room: rbp_core::ID::default(),
        }
    }
}

impl TableDescriptor {
    pub fn is_tournament(&self) -> bool {
        self.tourney.is_some()
    }
}

/// Per-event-tag delay added to the delayed-action accumulator (SPEC_FULL §4.E.3).
#[derive(Debug, Clone)]
pub struct Delays {
    pub autodeal: Duration,
    pub round: Duration,
    pub position: Duration,
    pub showdown: Duration,
    pub finish: Duration,
    pub autodeal_check: Duration,
    pub autodeal_max: Duration,
    pub autodeal_tournament_min: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            autodeal: Duration::from_secs(1),
            round: Duration::from_millis(500),
            position: Duration::from_millis(0),
            showdown: Duration::from_secs(2),
            finish: Duration::from_secs(1),
            autodeal_check: Duration::from_secs(15),
            autodeal_max: Duration::from_secs(120),
            autodeal_tournament_min: Duration::from_secs(15),
        }
    }
}

/// Server-wide settings shared across every table (SPEC_FULL §6 Configuration).
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub delays: Delays,
    pub autodeal: bool,
    pub autodeal_temporary: bool,
    pub predefined_decks: Vec<Vec<Card>>,
    pub lock_threshold: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            delays: Delays::default(),
            autodeal: true,
            autodeal_temporary: false,
            predefined_decks: Vec::new(),
            lock_threshold: Duration::from_secs(rbp_core::LOCK_THRESHOLD),
        }
    }
}

impl ServerSettings {
    /// Overlays `TABLE_*` environment variables onto the compiled-in
    /// defaults, the way `rbp_core`'s `SHUTDOWN_AFTER` parser overlays a
    /// default deadline.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(v) = env_secs("TABLE_AUTODEAL_CHECK_SECS") {
            settings.delays.autodeal_check = Duration::from_secs(v);
        }
        if let Some(v) = env_secs("TABLE_AUTODEAL_MAX_SECS") {
            settings.delays.autodeal_max = Duration::from_secs(v);
        }
        if let Some(v) = env_secs("TABLE_AUTODEAL_TOURNAMENT_MIN_SECS") {
            settings.delays.autodeal_tournament_min = Duration::from_secs(v);
        }
        if let Some(v) = env_secs("TABLE_LOCK_THRESHOLD_SECS") {
            settings.lock_threshold = Duration::from_secs(v);
        }
        if let Ok(v) = std::env::var("TABLE_AUTODEAL") {
            settings.autodeal = v != "0" && !v.eq_ignore_ascii_case("false");
        }
        settings
    }
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}

/// Current bet-limits snapshot, used by the differ's change detection
/// (SPEC_FULL §4.E.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BetLimits {
    pub min: Chips,
    pub max: Chips,
    pub step: Chips,
    pub cap: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_literals() {
        let descriptor = TableDescriptor::default();
        assert_eq!(descriptor.player_timeout, Duration::from_secs(60));
        assert_eq!(descriptor.muck_timeout, Duration::from_secs(5));
        let settings = ServerSettings::default();
        assert_eq!(settings.delays.autodeal_max, Duration::from_secs(120));
        assert_eq!(settings.delays.autodeal_tournament_min, Duration::from_secs(15));
        assert_eq!(settings.lock_threshold, Duration::from_secs(1200));
    }
}
