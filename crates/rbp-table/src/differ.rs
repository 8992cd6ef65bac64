use crate::engine::EventTag;
use crate::engine::HistoryEvent;
use crate::packet::ServerMessage;
use rbp_core::Chips;
use rbp_core::Position;

/// One effect the differ produces from a single history event. The
/// orchestrator applies these in order: persisted records go to the
/// repository, money deltas go through the money-update safety loop,
/// packets go out to avatars, and a delayed-action request reschedules
/// the table's next wakeup.
#[derive(Debug, Clone)]
pub enum DiffEffect {
    Packet(ServerMessage),
    MoneyDelta { seat: Position, delta: Chips },
    RakeDelta { seat: Position, amount: Chips },
}

/// Walks history events the engine appended since the last diff and turns
/// each into zero or more effects. Matches `EventTag` exhaustively; an
/// unrecognized tag becomes a single logged-and-dropped effect rather than
/// aborting the whole diff, since an engine upgrade may emit a tag this
/// build predates.
pub struct HistoryDiffer {
    hand: i64,
    cursor: usize,
}

impl HistoryDiffer {
    pub fn new(hand: i64) -> Self {
        Self { hand, cursor: 0 }
    }

    pub fn reset(&mut self, hand: i64) {
        self.hand = hand;
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advances the cursor to `history.len()` without diffing the skipped
    /// range — used after events appended by the orchestrator's own
    /// post-diff mutations (kick sweep, tournament hooks), whose packets
    /// are emitted directly by the code that caused them rather than
    /// through this differ (SPEC_FULL §4.I step 12).
    pub fn skip_to_end(&mut self, history: &[HistoryEvent]) {
        self.cursor = history.len();
    }

    /// Diffs every event past the cursor, advancing it to the end of
    /// `history`. Returns the effects in event order.
    pub fn diff(&mut self, history: &[HistoryEvent]) -> Vec<DiffEffect> {
        let mut effects = Vec::new();
        for event in &history[self.cursor..] {
            effects.extend(self.diff_one(event));
        }
        self.cursor = history.len();
        effects
    }

    fn diff_one(&self, event: &HistoryEvent) -> Vec<DiffEffect> {
        let Some(tag) = &event.tag else {
            return Vec::new();
        };
        match tag {
            EventTag::Game => vec![DiffEffect::Packet(ServerMessage::connected("table", None))],
            EventTag::WaitFor => Vec::new(),
            EventTag::Rebuy => self.money_and_packet(event, |seat, stack| ServerMessage::money_changed(seat, stack)),
            EventTag::BuyOut => self.money_and_packet(event, |seat, stack| ServerMessage::money_changed(seat, stack)),
            EventTag::PlayerList => Vec::new(),
            EventTag::Round => Vec::new(),
            EventTag::Showdown => event
                .board
                .map(|board| DiffEffect::Packet(ServerMessage::board_revealed(self.hand, board)))
                .into_iter()
                .collect(),
            EventTag::Rake => event
                .rake
                .iter()
                .map(|&(seat, amount)| DiffEffect::RakeDelta { seat, amount })
                .collect(),
            EventTag::Muck => event
                .serial
                .map(|seat| DiffEffect::Packet(ServerMessage::muck_request(seat)))
                .into_iter()
                .collect(),
            EventTag::Position => Vec::new(),
            EventTag::BlindRequest | EventTag::AnteRequest => Vec::new(),
            EventTag::WaitBlind => Vec::new(),
            EventTag::Blind => match event.serial {
                Some(seat) if event.amount != 0 || event.dead != 0 => {
                    vec![DiffEffect::MoneyDelta { seat, delta: -(event.amount + event.dead) }]
                }
                _ => Vec::new(),
            },
            EventTag::Ante => self.money_delta(event),
            EventTag::AllIn | EventTag::Call | EventTag::Check | EventTag::Fold | EventTag::Raise => self.money_delta(event),
            EventTag::Canceled => match event.serial {
                Some(seat) if seat > 0 && event.amount > 0 => vec![DiffEffect::MoneyDelta { seat, delta: event.amount }],
                _ => Vec::new(),
            },
            EventTag::SitOut => event
                .serial
                .map(|seat| DiffEffect::Packet(ServerMessage::kicked_for_sitting_out(seat)))
                .into_iter()
                .collect(),
            EventTag::Sit => Vec::new(),
            EventTag::Leave => event
                .serial
                .map(|seat| DiffEffect::Packet(ServerMessage::player_left(seat)))
                .into_iter()
                .collect(),
            EventTag::End => event
                .shares
                .iter()
                .map(|&(seat, amount)| DiffEffect::MoneyDelta { seat, delta: amount })
                .collect(),
            EventTag::Finish => Vec::new(),
            EventTag::EndRoundLast => Vec::new(),
            EventTag::Unknown(_) => Vec::new(),
        }
    }

    fn money_delta(&self, event: &HistoryEvent) -> Vec<DiffEffect> {
        match event.serial {
            Some(seat) if event.amount != 0 => vec![DiffEffect::MoneyDelta { seat, delta: -event.amount }],
            _ => Vec::new(),
        }
    }

    fn money_and_packet(
        &self,
        event: &HistoryEvent,
        to_packet: impl Fn(Position, Chips) -> ServerMessage,
    ) -> Vec<DiffEffect> {
        match event.serial {
            Some(seat) => vec![
                DiffEffect::MoneyDelta { seat, delta: event.amount },
                DiffEffect::Packet(to_packet(seat, event.amount)),
            ],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tag: EventTag) -> HistoryEvent {
        HistoryEvent {
            tag: Some(tag),
            ..HistoryEvent::default()
        }
    }

    #[test]
    fn diff_advances_cursor_past_seen_events() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![event(EventTag::Sit), event(EventTag::Round)];
        let first = differ.diff(&history);
        assert!(first.is_empty());
        let history = vec![history[0].clone(), history[1].clone(), event(EventTag::Round)];
        let second = differ.diff(&history);
        assert!(second.is_empty());
    }

    #[test]
    fn fold_produces_no_money_delta_with_zero_amount() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Fold),
            serial: Some(2),
            amount: 0,
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert!(effects.is_empty());
    }

    #[test]
    fn call_produces_a_negative_money_delta() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Call),
            serial: Some(3),
            amount: 50,
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert!(matches!(
            effects.as_slice(),
            [DiffEffect::MoneyDelta { seat: 3, delta: -50 }]
        ));
    }

    #[test]
    fn end_distributes_shares_as_money_deltas() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::End),
            shares: vec![(0, 100), (1, 0)],
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn blind_delta_includes_the_dead_amount() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Blind),
            serial: Some(4),
            amount: 10,
            dead: 5,
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert!(matches!(
            effects.as_slice(),
            [DiffEffect::MoneyDelta { seat: 4, delta: -15 }]
        ));
    }

    #[test]
    fn canceled_with_a_positive_seat_and_amount_refunds() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Canceled),
            serial: Some(2),
            amount: 30,
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert!(matches!(
            effects.as_slice(),
            [DiffEffect::MoneyDelta { seat: 2, delta: 30 }]
        ));
    }

    #[test]
    fn canceled_at_seat_zero_is_ignored() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Canceled),
            serial: Some(0),
            amount: 30,
            ..HistoryEvent::default()
        }];
        assert!(differ.diff(&history).is_empty());
    }

    #[test]
    fn muck_prompts_the_named_seat() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![HistoryEvent {
            tag: Some(EventTag::Muck),
            serial: Some(2),
            ..HistoryEvent::default()
        }];
        let effects = differ.diff(&history);
        assert!(matches!(effects.as_slice(), [DiffEffect::Packet(ServerMessage::MuckRequest { seat: 2 })]));
    }

    #[test]
    fn unknown_tag_produces_no_effects() {
        let mut differ = HistoryDiffer::new(1);
        let history = vec![event(EventTag::Unknown("future_tag".into()))];
        assert!(differ.diff(&history).is_empty());
    }
}
