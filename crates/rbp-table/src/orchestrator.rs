//! The table itself: the single-threaded `update` cycle that ties the
//! history differ, timers, money controller, avatar fan-out, and autodeal
//! scheduler together (SPEC_FULL §4.I).

use crate::autodeal::AutodealDecision;
use crate::avatar::AvatarIndex;
use crate::config::BetLimits;
use crate::config::ServerSettings;
use crate::config::TableDescriptor;
use crate::deck_source::DeckSource;
use crate::differ::DiffEffect;
use crate::differ::HistoryDiffer;
use crate::engine::Engine;
use crate::engine::EventTag;
use crate::error::TableError;
use crate::factory::Factory;
use crate::lifecycle::PlayerUserData;
use crate::money::AutoPolicies;
use crate::packet::ServerMessage;
use crate::timers::TimerBoard;
use crate::watchdog::LockWatchdog;
use crate::watchdog::SittingOutTracker;
use rbp_core::Chips;
use rbp_core::Position;
use rbp_core::Serial;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Weak;
use std::time::Duration;
use tokio::time::Instant;

/// What an `update` call actually did, surfaced mostly for tests and the
/// defensive re-entrancy assertion (invariant 8, SPEC_FULL §3).
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Ran to completion; carries the packets broadcast this cycle.
    Ran { packets: usize },
    /// `update` was entered while an outer call was still running.
    ReEntrant,
    /// The table was already destroyed.
    Destroyed,
}

/// The table session manager proper. One instance owns exactly one
/// engine, one avatar index, and one factory handle; it is driven by a
/// dedicated `tokio` task in production (SPEC_FULL §5), but every
/// operation here is a plain `&mut self` method so it can also be driven
/// directly in tests.
pub struct Table {
    pub id: i64,
    pub(crate) descriptor: TableDescriptor,
    pub(crate) settings: ServerSettings,
    pub(crate) engine: Box<dyn Engine>,
    pub(crate) factory: Option<Weak<dyn Factory>>,
    pub(crate) avatars: AvatarIndex,
    pub(crate) seat_occupant: HashMap<Position, Serial>,
    pub(crate) occupant_seat: HashMap<Serial, Position>,
    pub(crate) user_data: HashMap<Serial, PlayerUserData>,
    pub(crate) auto_policy: HashMap<Serial, AutoPolicies>,
    pub(crate) buy_in_paid: HashSet<Serial>,
    pub(crate) last_buy_in: HashMap<Serial, Chips>,
    pub(crate) deck_source: DeckSource,
    pub(crate) watchdog: LockWatchdog,
    pub(crate) sitting_out: SittingOutTracker,
    pub(crate) timers: TimerBoard,
    pub(crate) muck_deadline: Option<Instant>,
    pub(crate) differ: HistoryDiffer,
    pub(crate) previous_dealer: Option<Position>,
    pub(crate) current_hand_id: Option<rbp_core::ID<rbp_records::Hand>>,
    pub(crate) bet_limits: BetLimits,
    pub(crate) rebuy_stack: Vec<(Serial, Chips)>,
    pub(crate) last_rebuy_hand_serial: Option<i64>,
    pub(crate) delayed_accumulator: Duration,
    pub(crate) delay_start: Option<Instant>,
    pub(crate) updating: bool,
    pub(crate) alive: bool,
    pub(crate) locked: bool,
    pub(crate) hands_dealt: usize,
}

impl Table {
    pub fn new(
        id: i64,
        descriptor: TableDescriptor,
        settings: ServerSettings,
        engine: Box<dyn Engine>,
        factory: Weak<dyn Factory>,
        deck_source: DeckSource,
    ) -> Self {
        let watchdog = LockWatchdog::new(settings.lock_threshold);
        Self {
            id,
            descriptor,
            settings,
            engine,
            factory: Some(factory),
            avatars: AvatarIndex::new(),
            seat_occupant: HashMap::new(),
            occupant_seat: HashMap::new(),
            user_data: HashMap::new(),
            auto_policy: HashMap::new(),
            buy_in_paid: HashSet::new(),
            last_buy_in: HashMap::new(),
            deck_source,
            watchdog,
            sitting_out: SittingOutTracker::new(),
            timers: TimerBoard::new(),
            muck_deadline: None,
            differ: HistoryDiffer::new(0),
            previous_dealer: None,
            current_hand_id: None,
            bet_limits: BetLimits::default(),
            rebuy_stack: Vec::new(),
            last_rebuy_hand_serial: None,
            delayed_accumulator: Duration::ZERO,
            delay_start: None,
            updating: false,
            alive: true,
            locked: false,
            hands_dealt: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Invariant 7: a table may be despawned only once it is idle, holds
    /// no avatars and no observers, and is not tied to a tournament.
    pub fn can_be_despawned(&self) -> bool {
        !self.engine.is_running() && self.avatars.is_empty() && !self.descriptor.is_tournament()
    }

    /// Cancels every timer, broadcasts a terminal packet, detaches every
    /// avatar, and clears the factory handle so racing callbacks early
    /// return (SPEC_FULL §3 "Lifecycle", §5 "Cancellation").
    pub fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        self.timers.clear_all();
        self.timers.clear_delayed();
        self.muck_deadline = None;
        // Mirror every still-outstanding `joined_count_increase` (SPEC_FULL
        // §3 Lifecycle "detaches from every avatar's table set") before the
        // factory handle is cleared below.
        if let Ok(factory) = self.factory() {
            for player in self.avatars.players().collect::<Vec<_>>() {
                factory.joined_count_decrease(player);
            }
        }
        self.avatars.broadcast(ServerMessage::table_destroyed());
        self.factory = None;
        self.alive = false;
    }

    pub(crate) fn arm_muck_timer(&mut self) {
        self.muck_deadline = Some(Instant::now() + self.descriptor.muck_timeout);
    }

    fn clear_muck_timer(&mut self) {
        self.muck_deadline = None;
    }

    /// The soonest of: any armed player-turn deadline, the muck deadline,
    /// and the delayed-action (deal) deadline. `None` means nothing to
    /// wait on; a driving loop should block on the next inbound message.
    pub fn next_deadline(&self) -> Option<Instant> {
        let seat_deadline = self.timers.soonest_deadline();
        let muck = self.muck_deadline;
        [seat_deadline, muck].into_iter().flatten().min()
    }

    /// Top-level entry point: the non-reentrant update cycle (SPEC_FULL
    /// §4.I). Re-entry is detected with a plain flag, since the table is
    /// only ever driven from its own single-threaded task.
    pub async fn update(&mut self) -> UpdateOutcome {
        if !self.alive {
            return UpdateOutcome::Destroyed;
        }
        if self.updating {
            log::warn!("table {}: update re-entered while already running", self.id);
            return UpdateOutcome::ReEntrant;
        }
        self.updating = true;
        let outcome = self.update_inner().await;
        self.updating = false;
        outcome
    }

    async fn update_inner(&mut self) -> UpdateOutcome {
        // Step 2: drain pending rebuys (idempotent per hand serial).
        self.drain_rebuy_stack().await;

        // Step 3: remember the tail and the pre-diff history length.
        let history_len_before = self.engine.history().len();
        let diff_cursor_before = self.differ.cursor();
        let tail_start = diff_cursor_before.min(history_len_before);

        // Step 4: timers.
        self.update_timers();

        // Step 5: differ -> packets / money deltas / rake deltas.
        let effects = self.differ.diff(self.engine.history());
        if self.engine.history().len() != history_len_before {
            log::error!(
                "table {}: history grew from {} to {} while the (read-only) differ ran; this should be impossible",
                self.id,
                history_len_before,
                self.engine.history().len()
            );
        }

        let tail_end = history_len_before;
        let tail = &self.engine.history()[tail_start.min(tail_end)..tail_end];
        let has_tag = |wanted: &EventTag| tail.iter().any(|event| event.tag.as_ref() == Some(wanted));

        let mut packets = Vec::new();
        for effect in effects {
            match effect {
                DiffEffect::Packet(message) => packets.push(message),
                DiffEffect::MoneyDelta { seat, delta } => self.apply_money_delta(seat, delta).await,
                DiffEffect::RakeDelta { seat, amount } => self.apply_rake_delta(seat, amount).await,
            }
        }

        // Step 6/7: DB sync on `finish`, delayed-action accumulator, `leave` demotion.
        if has_tag(&EventTag::Game) {
            self.delayed_accumulator = self.settings.delays.autodeal;
            self.delay_start = Some(Instant::now());
            self.previous_dealer = self.engine.serial_in_position();
            // Armed only when per-player timeout is below the lock threshold,
            // so genuine slow play never trips the alarm (SPEC_FULL §4.C).
            if self.descriptor.player_timeout < self.settings.lock_threshold {
                self.watchdog.mark_dirty();
            }
            if let Ok(factory) = self.factory() {
                match factory.create_hand(self.descriptor.room).await {
                    Ok(id) => self.current_hand_id = Some(id),
                    Err(error) => log::warn!("table {}: create_hand failed: {error}", self.id),
                }
            }
        }
        for tag in [EventTag::Round, EventTag::Position, EventTag::Showdown, EventTag::Finish] {
            if has_tag(&tag) {
                self.delayed_accumulator += self.delay_for_tag(&tag);
            }
        }
        for event in tail {
            if event.tag.as_ref() == Some(&EventTag::Leave) {
                if let Some(seat) = event.serial {
                    if let Some(&player) = self.seat_occupant.get(&seat) {
                        if let Ok(factory) = self.factory() {
                            let _ = factory.leave_player(player).await;
                        }
                        self.stand_up(player, seat);
                    }
                }
            }
            if event.tag.as_ref() == Some(&EventTag::Muck) {
                self.arm_muck_timer();
                self.sitting_out.record_missed_round(event.serial.unwrap_or(0));
            }
        }
        if has_tag(&EventTag::EndRoundLast) {
            self.watchdog.mark_clean();
            self.locked = false;
        }
        if has_tag(&EventTag::Finish) {
            self.clear_muck_timer();
            self.persist_finish().await;
        }

        // Step 8: bet-limits change detection.
        if has_tag(&EventTag::Game) || has_tag(&EventTag::Round) {
            let current = self.engine.bet_limits();
            if current != self.bet_limits {
                self.bet_limits = current;
                packets.insert(0, ServerMessage::bet_limits(current));
            }
        }

        // Step 9: broadcast.
        let packet_count = packets.len();
        for packet in packets {
            self.avatars.broadcast(packet);
        }

        // Step 10: despawn if eligible.
        if self.can_be_despawned() {
            self.destroy();
            return UpdateOutcome::Ran { packets: packet_count };
        }

        // Step 11: tournament/kick hooks + reschedule, while still valid.
        if has_tag(&EventTag::Finish) {
            self.kick_sitting_out_too_long().await;
            self.tourney_update_stats_hook().await;
        }
        if has_tag(&EventTag::End) {
            self.tourney_end_turn_hook().await;
        }
        if matches!(self.decide_autodeal(), AutodealDecision::Deal) || self.engine.is_end_or_null() {
            let all_ready = self.user_data.values().all(|data| data.ready);
            self.schedule_autodeal(all_ready);
        }

        // Step 12: let the engine reduce history if it is safe to, then
        // fast-forward the cursor past anything appended by this cycle's
        // own bookkeeping (kick sweep, tournament hooks) without re-diffing it.
        if self.engine.history_can_be_reduced() {
            if let Err(error) = self.engine.history_reduce().await {
                log::warn!("table {}: history_reduce failed: {error}", self.id);
            }
        }
        self.differ.skip_to_end(self.engine.history());

        // Watchdog poll: a hand that has not crossed a round boundary
        // (`end_round_last`) within the lock threshold gets flagged locked
        // and logged, but the table keeps operating (SPEC_FULL §4.C, §7.v).
        if self.watchdog.poll() {
            log::warn!(
                "table {}: lock watchdog tripped, hand {} has not progressed past a round boundary in {:?}",
                self.id,
                self.engine.hand_serial(),
                self.watchdog.dirty_for().unwrap_or_default(),
            );
            self.locked = true;
        }

        UpdateOutcome::Ran { packets: packet_count }
    }

    fn delay_for_tag(&self, tag: &EventTag) -> Duration {
        let delays = &self.settings.delays;
        match tag {
            EventTag::Round => delays.round,
            EventTag::Position => delays.position,
            EventTag::Showdown => delays.showdown,
            EventTag::Finish => delays.finish,
            _ => Duration::ZERO,
        }
    }

    /// SPEC_FULL §4.D: phase 1 (warning) fires at `playerTimeout/2`; phase 2
    /// (forced action) fires `TIMEOUT_DELAY_COMPENSATION` seconds after
    /// that. Rather than two physical timers, one `SeatTimer` is armed for
    /// the phase-2 deadline directly (`half + compensation`); the warning
    /// is the moment its remaining time drops to `compensation`, which
    /// lands at exactly `half` elapsed.
    fn update_timers(&mut self) {
        let Some(seat) = self.engine.serial_in_position() else {
            return;
        };
        let half = self.descriptor.player_timeout / 2;
        let compensation = Duration::from_secs(rbp_core::TIMEOUT_DELAY_COMPENSATION);
        if self.timers.get(seat).is_none() {
            self.timers.arm(seat, half + compensation);
        }
        if let Some(timer) = self.timers.get_mut(seat) {
            if timer.should_warn(compensation) {
                self.avatars.broadcast(ServerMessage::timeout_warning(seat, half.as_secs()));
            }
        }
    }

    /// Forced action on timer expiry (SPEC_FULL §4.D "Player-turn timer",
    /// phase 2). Re-syncs rather than fires if the engine is no longer
    /// running or the in-position seat changed since the timer armed.
    pub async fn force_timeout_action(&mut self, seat: Position) {
        if !self.engine.is_running() || self.engine.serial_in_position() != Some(seat) {
            self.timers.clear(seat);
            return;
        }
        if self.engine.is_open() {
            let _ = self.engine.sit_out_next_turn(seat).await;
            let _ = self.engine.auto_player(seat, true).await;
        } else {
            let _ = self.engine.auto_player(seat, true).await;
            self.avatars.broadcast(ServerMessage::auto_fold(seat));
        }
        self.avatars.broadcast(ServerMessage::timeout_notice(seat));
        self.timers.clear(seat);
    }

    /// Muck timer fire: force-muck every pending muckable seat (SPEC_FULL
    /// §4.D "Muck timer").
    pub async fn force_muck_timeout(&mut self) {
        self.clear_muck_timer();
        for seat in self.engine.muckable_serials() {
            if let Err(error) = self.engine.muck(seat, false).await {
                log::warn!("table {}: forced muck for seat {seat} failed: {error}", self.id);
            }
        }
    }

    async fn apply_money_delta(&mut self, seat: Position, delta: Chips) {
        let Some(&player) = self.seat_occupant.get(&seat) else {
            return;
        };
        if let Ok(factory) = self.factory() {
            if let Err(error) = factory.update_player_money(player, delta).await {
                log::error!("table {}: update_player_money failed for {player}: {error}", self.id);
            }
        }
    }

    async fn apply_rake_delta(&mut self, seat: Position, amount: Chips) {
        let Some(&player) = self.seat_occupant.get(&seat) else {
            return;
        };
        if let Ok(factory) = self.factory() {
            if let Err(error) = factory.update_player_rake(player, amount).await {
                log::error!("table {}: update_player_rake failed for {player}: {error}", self.id);
            }
        }
    }

    async fn persist_finish(&mut self) {
        let hand_serial = self.engine.hand_serial();
        let (board, pot) = self.current_hand_summary();
        if let Ok(factory) = self.factory() {
            let id = self.current_hand_id.take().unwrap_or_default();
            let hand = rbp_records::Hand::new(id, self.descriptor.room, board.unwrap_or_default(), pot, self.previous_dealer.unwrap_or(0));
            if let Err(error) = factory.save_hand(&hand).await {
                log::warn!("table {}: save_hand failed for hand {hand_serial}: {error}", self.id);
            }
            let compressed = self.compress_history();
            if let Err(error) = factory.save_compressed_hand(self.id, hand_serial, &compressed).await {
                log::warn!("table {}: save_compressed_hand failed for hand {hand_serial}: {error}", self.id);
            }
        }
        self.drain_auto_policies().await;
    }

    /// Walks backward from the end of history to the most recent `Game`
    /// event (this hand's start) and summarizes it: the last revealed
    /// board and the total pot, taken as shares paid out plus rake taken
    /// (SPEC_FULL §4.E "Compressed-history persistence").
    fn current_hand_summary(&self) -> (Option<rbp_cards::Board>, Chips) {
        let history = self.engine.history();
        let start = history
            .iter()
            .rposition(|event| event.tag == Some(EventTag::Game))
            .unwrap_or(0);
        let mut board = None;
        let mut pot = 0;
        for event in &history[start..] {
            if event.board.is_some() {
                board = event.board;
            }
            pot += event.shares.iter().map(|&(_, amount)| amount).sum::<Chips>();
            pot += event.rake.iter().map(|&(_, amount)| amount).sum::<Chips>();
        }
        (board, pot)
    }

    /// Drops purely transient tags from the current hand's history for
    /// durable storage, and collapses repeated `board`/`pockets` across
    /// `round`/`showdown` events — null-ed out if unchanged since the last
    /// emit — while passing every betting and structural event through
    /// with its real payload (SPEC_FULL §4.E "Compressed-history
    /// persistence").
    fn compress_history(&self) -> serde_json::Value {
        let mut last_board = None;
        let mut last_hole = None;
        let events: Vec<serde_json::Value> = self
            .engine
            .history()
            .iter()
            .filter(|event| {
                !matches!(
                    event.tag,
                    Some(EventTag::AllIn)
                        | Some(EventTag::WaitFor)
                        | Some(EventTag::BlindRequest)
                        | Some(EventTag::Muck)
                        | Some(EventTag::Finish)
                        | Some(EventTag::Leave)
                        | Some(EventTag::Rebuy)
                        | Some(EventTag::BuyOut)
                )
            })
            .map(|event| {
                let mut board = event.board;
                let mut hole = event.hole;
                if matches!(event.tag, Some(EventTag::Round) | Some(EventTag::Showdown)) {
                    if board == last_board {
                        board = None;
                    } else {
                        last_board = board;
                    }
                    if hole == last_hole {
                        hole = None;
                    } else {
                        last_hole = hole;
                    }
                }
                serde_json::json!({
                    "tag": format!("{:?}", event.tag),
                    "serial": event.serial,
                    "amount": event.amount,
                    "dead": event.dead,
                    "board": board,
                    "hole": hole,
                    "shares": event.shares,
                    "rake": event.rake,
                    "street": event.street,
                })
            })
            .collect();
        serde_json::Value::Array(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despawn_requires_no_avatars_and_no_tournament() {
        // The full update cycle is exercised below against `FakeEngine`;
        // here we just check the tournament short-circuit in isolation.
        let descriptor = TableDescriptor {
            tourney: Some(1),
            ..TableDescriptor::default()
        };
        assert!(descriptor.is_tournament());
    }

    mod scenario {
        use super::*;
        use crate::factory::PlayerInfo;
        use async_trait::async_trait;
        use std::sync::Mutex;

        /// A hand-rules engine stand-in whose history is scripted up front
        /// by the test and whose money/position state is the minimum an
        /// `update` cycle needs to read.
        struct FakeEngine {
            history: Vec<HistoryEvent>,
            money: HashMap<Position, Chips>,
            running: bool,
        }

        impl FakeEngine {
            fn new() -> Self {
                Self {
                    history: Vec::new(),
                    money: HashMap::new(),
                    running: false,
                }
            }

            fn push(&mut self, event: HistoryEvent) {
                self.history.push(event);
            }
        }

        #[async_trait]
        impl Engine for FakeEngine {
            fn is_end_or_null(&self) -> bool {
                true
            }
            fn is_end_or_muck(&self) -> bool {
                true
            }
            fn is_running(&self) -> bool {
                self.running
            }
            fn is_tournament(&self) -> bool {
                false
            }
            fn is_tournament_running(&self) -> bool {
                false
            }
            fn is_open(&self) -> bool {
                true
            }
            fn seats(&self) -> Position {
                2
            }
            fn seats_left(&self) -> Position {
                0
            }
            fn serials_all(&self) -> Vec<Position> {
                vec![0, 1]
            }
            fn serials_sit(&self) -> Vec<Position> {
                vec![0, 1]
            }
            fn serials_playing(&self) -> Vec<Position> {
                vec![0, 1]
            }
            fn is_seated(&self, _seat: Position) -> bool {
                true
            }
            fn is_sit(&self, _seat: Position) -> bool {
                true
            }
            fn is_broke(&self, seat: Position) -> bool {
                self.get_player_money(seat) <= 0
            }
            fn is_rebuy_possible(&self, _seat: Position) -> bool {
                true
            }
            fn can_add_player(&self, _seat: Position) -> bool {
                true
            }
            fn get_player_money(&self, seat: Position) -> Chips {
                self.money.get(&seat).copied().unwrap_or(100)
            }
            fn buy_in(&self, _seat: Position) -> Chips {
                100
            }
            fn best_buy_in(&self) -> Chips {
                100
            }
            fn max_buy_in(&self) -> Chips {
                1000
            }
            fn bet_limits(&self) -> BetLimits {
                BetLimits::default()
            }
            fn chip_unit(&self) -> Chips {
                1
            }
            fn serial_in_position(&self) -> Option<Position> {
                Some(0)
            }
            fn hand_serial(&self) -> i64 {
                1
            }
            fn history(&self) -> &[HistoryEvent] {
                &self.history
            }
            fn history_can_be_reduced(&self) -> bool {
                false
            }
            fn muckable_serials(&self) -> Vec<Position> {
                Vec::new()
            }
            fn is_muck_state(&self) -> bool {
                false
            }

            async fn begin_turn(&mut self) -> Result<(), TableError> {
                self.running = true;
                Ok(())
            }
            async fn add_player(&mut self, _seat: Position, _buy_in: Chips) -> Result<(), TableError> {
                Ok(())
            }
            async fn remove_player(&mut self, _seat: Position) -> Result<(), TableError> {
                Ok(())
            }
            async fn sit(&mut self, _seat: Position) -> Result<(), TableError> {
                Ok(())
            }
            async fn sit_out_next_turn(&mut self, _seat: Position) -> Result<(), TableError> {
                Ok(())
            }
            async fn auto_player(&mut self, _seat: Position, _on: bool) -> Result<(), TableError> {
                Ok(())
            }
            async fn come_back(&mut self, _seat: Position) -> Result<(), TableError> {
                Ok(())
            }
            async fn muck(&mut self, _seat: Position, _show: bool) -> Result<(), TableError> {
                Ok(())
            }
            async fn fold(&mut self, _seat: Position) -> Result<(), TableError> {
                Ok(())
            }
            async fn rebuy(&mut self, seat: Position, amount: Chips) -> Result<(), TableError> {
                *self.money.entry(seat).or_insert(100) += amount;
                Ok(())
            }
            async fn history_reduce(&mut self) -> Result<(), TableError> {
                Ok(())
            }
        }

        /// Records every call a real factory would have durably persisted,
        /// so assertions can check exactly what the update cycle wrote.
        #[derive(Default)]
        struct FakeFactory {
            saved_hands: Mutex<Vec<rbp_records::Hand>>,
            compressed_hands: Mutex<Vec<(i64, i64, serde_json::Value)>>,
            money_deltas: Mutex<Vec<(Serial, Chips)>>,
            joined_count: Mutex<HashMap<Serial, i64>>,
            buy_ins: Mutex<Vec<(Serial, Chips)>>,
        }

        #[async_trait]
        impl Factory for FakeFactory {
            async fn create_hand(&self, _room: rbp_core::ID<rbp_records::Room>) -> anyhow::Result<rbp_core::ID<rbp_records::Hand>> {
                Ok(rbp_core::ID::default())
            }
            async fn save_hand(&self, hand: &rbp_records::Hand) -> anyhow::Result<()> {
                self.saved_hands.lock().unwrap().push(hand.clone());
                Ok(())
            }
            async fn save_compressed_hand(&self, table: i64, hand_serial: i64, blob: &serde_json::Value) -> anyhow::Result<()> {
                self.compressed_hands.lock().unwrap().push((table, hand_serial, blob.clone()));
                Ok(())
            }
            async fn update_player_money(&self, player: Serial, delta: Chips) -> anyhow::Result<()> {
                self.money_deltas.lock().unwrap().push((player, delta));
                Ok(())
            }
            async fn update_player_rake(&self, _player: Serial, _amount: Chips) -> anyhow::Result<()> {
                Ok(())
            }
            async fn buy_in_player(&self, player: Serial, amount: Chips) -> anyhow::Result<()> {
                self.buy_ins.lock().unwrap().push((player, amount));
                Ok(())
            }
            async fn leave_player(&self, _player: Serial) -> anyhow::Result<()> {
                Ok(())
            }
            async fn buy_out_player(&self, _player: Serial, _amount: Chips) -> anyhow::Result<()> {
                Ok(())
            }
            async fn move_player(&self, _player: Serial, _from: Position, _to: Position) -> anyhow::Result<()> {
                Ok(())
            }
            async fn seat_player(&self, _player: Serial, _seat: Position) -> anyhow::Result<()> {
                Ok(())
            }
            fn get_name(&self) -> String {
                "fake".into()
            }
            fn get_player_info(&self, _player: Serial) -> Option<PlayerInfo> {
                None
            }
            fn is_temporary_user(&self, _player: Serial) -> bool {
                false
            }
            fn joined_count_reached_max(&self, _player: Serial) -> bool {
                false
            }
            fn joined_count_increase(&self, player: Serial) {
                *self.joined_count.lock().unwrap().entry(player).or_default() += 1;
            }
            fn joined_count_decrease(&self, player: Serial) {
                *self.joined_count.lock().unwrap().entry(player).or_default() -= 1;
            }
            fn simultaneous_tables_allowed(&self) -> usize {
                4
            }
            fn missed_round_max(&self) -> u32 {
                3
            }
            async fn tourney_end_turn(&self, _table: i64) -> anyhow::Result<()> {
                Ok(())
            }
            async fn tourney_update_stats(&self, _table: i64, _player: Serial, _chips: Chips) -> anyhow::Result<()> {
                Ok(())
            }
            fn chat_filter(&self, _player: Serial, _message: &str) -> bool {
                true
            }
            async fn chat_message_archive(&self, _player: Serial, _message: &str) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutting_down(&self) -> bool {
                false
            }
        }

        fn make_table(engine: FakeEngine, factory: &std::sync::Arc<FakeFactory>) -> Table {
            let descriptor = TableDescriptor {
                player_timeout: Duration::ZERO,
                ..TableDescriptor::default()
            };
            let settings = ServerSettings {
                lock_threshold: Duration::from_nanos(1),
                ..ServerSettings::default()
            };
            let factory_handle: Weak<dyn Factory> = std::sync::Arc::downgrade(factory);
            Table::new(1, descriptor, settings, Box::new(engine), factory_handle, DeckSource::Random)
        }

        #[tokio::test]
        async fn game_event_arms_the_watchdog() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut engine = FakeEngine::new();
            engine.push(HistoryEvent {
                tag: Some(EventTag::Game),
                ..HistoryEvent::default()
            });
            let mut table = make_table(engine, &factory);

            table.update().await;

            assert!(table.watchdog.is_dirty());
            assert!(table.watchdog.poll(), "player_timeout below lock_threshold should arm and trip the watchdog");
        }

        #[tokio::test]
        async fn finish_persists_the_hand_with_the_pot_and_dead_aware_blind_delta() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut engine = FakeEngine::new();
            engine.push(HistoryEvent {
                tag: Some(EventTag::Game),
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Blind),
                serial: Some(0),
                amount: 10,
                dead: 5,
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::End),
                shares: vec![(1, 15)],
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::EndRoundLast),
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Finish),
                ..HistoryEvent::default()
            });
            let mut table = make_table(engine, &factory);
            table.seat_occupant.insert(0, 42);
            table.seat_occupant.insert(1, 99);
            table.occupant_seat.insert(42, 0);
            table.occupant_seat.insert(99, 1);

            table.update().await;

            let deltas = factory.money_deltas.lock().unwrap();
            assert!(deltas.contains(&(42, -15)), "blind delta should include the dead chips: {deltas:?}");
            assert!(deltas.contains(&(99, 15)));
            drop(deltas);

            let hands = factory.saved_hands.lock().unwrap();
            assert_eq!(hands.len(), 1);
            assert_eq!(hands[0].pot(), 15);
            assert_eq!(hands[0].dealer(), 0);

            // `end_round_last` ran in the same cycle, so the watchdog it
            // armed on `Game` is cleared again by the time `update` returns.
            assert!(!table.watchdog.is_dirty());
            assert!(!table.locked);
        }

        #[tokio::test]
        async fn auto_rebuy_tops_up_a_broke_player_at_finish() {
            use crate::money::AutoPolicies;
            use crate::money::AutoPolicy;

            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut engine = FakeEngine::new();
            engine.push(HistoryEvent {
                tag: Some(EventTag::Game),
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Finish),
                ..HistoryEvent::default()
            });
            engine.money.insert(0, 0);
            engine.money.insert(1, 100);
            let mut table = make_table(engine, &factory);
            table.seat_occupant.insert(0, 42);
            table.seat_occupant.insert(1, 99);
            table.occupant_seat.insert(42, 0);
            table.occupant_seat.insert(99, 1);
            table.buy_in_paid.insert(42);
            table.buy_in_paid.insert(99);
            table
                .set_auto_policy(42, AutoPolicies { refill: AutoPolicy::Off, rebuy: AutoPolicy::Min })
                .expect("42 is seated");

            table.update().await;

            let buy_ins = factory.buy_ins.lock().unwrap();
            assert!(buy_ins.contains(&(42, 100)), "a broke player with auto-rebuy=min should be topped up to the table minimum: {buy_ins:?}");
        }

        #[tokio::test]
        async fn set_auto_policy_rejects_an_unseated_player() {
            use crate::money::AutoPolicies;

            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut table = make_table(FakeEngine::new(), &factory);
            assert!(matches!(table.set_auto_policy(7, AutoPolicies::default()), Err(TableError::NotSeated)));
        }

        #[tokio::test]
        async fn seat_seeds_ready_false_and_autodeal_marks_everyone_ready() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut table = make_table(FakeEngine::new(), &factory);
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

            table.join(42, tx.clone(), 0).await.expect("observer slot is free");
            table.join(99, tx.clone(), 0).await.expect("observer slot is free");
            table.seat(42, Some(0), 100).await.expect("seat 0 is free");
            table.seat(99, Some(1), 100).await.expect("seat 1 is free");

            assert!(!table.user_data.get(&42).unwrap().ready, "a freshly seated player hasn't readied up yet");
            assert!(!table.user_data.get(&99).unwrap().ready);

            let dealt = table.autodeal().await.expect("autodeal should not error");
            assert!(dealt, "two seated players should be enough to deal");
            assert!(table.user_data.get(&42).unwrap().ready, "begin_turn should mark every player ready");
            assert!(table.user_data.get(&99).unwrap().ready);
        }

        #[test]
        fn compress_history_collapses_an_unchanged_board_across_round_events() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut engine = FakeEngine::new();
            let board = rbp_cards::Board::default();
            engine.push(HistoryEvent {
                tag: Some(EventTag::Round),
                board: Some(board),
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Round),
                board: Some(board),
                ..HistoryEvent::default()
            });
            let table = make_table(engine, &factory);

            let compressed = table.compress_history();
            let events = compressed.as_array().expect("compress_history returns a JSON array");
            assert_eq!(events.len(), 2);
            assert_ne!(events[0]["board"], serde_json::Value::Null, "the first sighting of a board must be kept");
            assert_eq!(events[1]["board"], serde_json::Value::Null, "an unchanged board should be collapsed to null");
        }

        #[tokio::test]
        async fn finish_persists_a_compressed_history_blob() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut engine = FakeEngine::new();
            engine.push(HistoryEvent {
                tag: Some(EventTag::Game),
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Raise),
                serial: Some(0),
                amount: 20,
                ..HistoryEvent::default()
            });
            engine.push(HistoryEvent {
                tag: Some(EventTag::Finish),
                ..HistoryEvent::default()
            });
            let mut table = make_table(engine, &factory);
            table.seat_occupant.insert(0, 42);
            table.occupant_seat.insert(42, 0);

            table.update().await;

            let compressed_hands = factory.compressed_hands.lock().unwrap();
            assert_eq!(compressed_hands.len(), 1);
            let (table_id, hand_serial, blob) = &compressed_hands[0];
            assert_eq!(*table_id, 1);
            assert_eq!(*hand_serial, 1);
            let events = blob.as_array().expect("blob is a JSON array of events");
            let raise = events.iter().find(|e| e["amount"] == 20).expect("the raise's real amount must survive compression");
            assert_eq!(raise["serial"], 0);
        }

        #[tokio::test]
        async fn join_then_leave_balances_the_joined_count() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut table = make_table(FakeEngine::new(), &factory);
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

            table.join(42, tx.clone(), 0).await.expect("server has room");
            table.seat(42, Some(0), 100).await.expect("seat 0 is free");
            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 1);

            table.leave(42).await.expect("42 is seated and the table is open");
            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 0);
        }

        #[tokio::test]
        async fn disconnect_decrements_only_once_the_last_avatar_drops() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut table = make_table(FakeEngine::new(), &factory);
            let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
            let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();

            table.join(42, tx1.clone(), 0).await.expect("server has room");
            table.join(42, tx2.clone(), 0).await.expect("second tab resumes the same join");
            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 1);

            table.disconnect(42, &tx1);
            assert_eq!(
                *factory.joined_count.lock().unwrap().get(&42).unwrap(),
                1,
                "one avatar session remains, the count should not drop yet"
            );

            table.disconnect(42, &tx2);
            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 0);
        }

        #[tokio::test]
        async fn destroy_decrements_the_joined_count_for_every_remaining_avatar() {
            let factory = std::sync::Arc::new(FakeFactory::default());
            let mut table = make_table(FakeEngine::new(), &factory);
            let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

            table.join(42, tx.clone(), 0).await.expect("server has room");
            table.join(99, tx.clone(), 0).await.expect("server has room");
            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 1);
            assert_eq!(*factory.joined_count.lock().unwrap().get(&99).unwrap(), 1);

            table.destroy();

            assert_eq!(*factory.joined_count.lock().unwrap().get(&42).unwrap(), 0);
            assert_eq!(*factory.joined_count.lock().unwrap().get(&99).unwrap(), 0);
        }
    }
}
