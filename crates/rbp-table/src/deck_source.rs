use rbp_cards::Card;
use rbp_cards::Deck;
use rbp_cards::Hand;

/// Where a table's next shuffle comes from: a fresh random deck, or one
/// pulled from a server-wide list of predefined decks (used for dealt
/// tournaments replaying a fixed card sequence, or for deterministic
/// testing). Mirrors `pokertable.py`'s `PokerPredefinedDecks` queue.
#[derive(Debug)]
pub enum DeckSource {
    Random,
    Predefined(Vec<Vec<Card>>),
}

impl DeckSource {
    /// Produces the next deck to deal from. A predefined source is
    /// round-robined: once exhausted, it wraps back to its first entry
    /// rather than falling back to random, so a fixed sequence replays
    /// deterministically across many hands.
    pub fn next_deck(&self, hands_dealt: usize) -> Deck {
        match self {
            DeckSource::Random => Deck::new(),
            DeckSource::Predefined(decks) if !decks.is_empty() => {
                let cards = &decks[hands_dealt % decks.len()];
                let hand = cards
                    .iter()
                    .copied()
                    .fold(Hand::empty(), |acc, card| acc.add(Hand::from(card)));
                Deck::from(hand)
            }
            DeckSource::Predefined(_) => Deck::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_source_always_yields_a_full_deck() {
        let source = DeckSource::Random;
        let deck = source.next_deck(0);
        assert_eq!(Hand::from(deck).size(), 52);
    }

    #[test]
    fn predefined_source_round_robins() {
        let mut deck_a = Deck::new();
        let mut deck_b = Deck::new();
        let cards_a: Vec<Card> = (0..52).filter_map(|_| Some(deck_a.draw())).collect();
        let cards_b: Vec<Card> = (0..52).filter_map(|_| Some(deck_b.draw())).collect();
        let source = DeckSource::Predefined(vec![cards_a, cards_b]);
        let first = source.next_deck(0);
        let wrapped = source.next_deck(2);
        assert_eq!(Hand::from(first), Hand::from(wrapped));
    }

    #[test]
    fn empty_predefined_falls_back_to_random() {
        let source = DeckSource::Predefined(Vec::new());
        let deck = source.next_deck(0);
        assert_eq!(Hand::from(deck).size(), 52);
    }
}
