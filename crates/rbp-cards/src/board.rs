use super::card::Card;
use super::hand::Hand;

/// The shared community cards (flop, turn, river).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Board(Hand);

impl Board {
    pub fn cards(&self) -> Vec<Card> {
        self.0.cards()
    }
    pub fn add(&mut self, dealt: Hand) {
        self.0 = self.0.add(dealt);
    }
}

impl From<Hand> for Board {
    fn from(hand: Hand) -> Self {
        Self(hand)
    }
}
impl From<Board> for Hand {
    fn from(board: Board) -> Self {
        board.0
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in self.cards() {
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_streets() {
        let mut board = Board::default();
        board.add(Hand::from(Card::from(0u8)));
        board.add(Hand::from(Card::from(1u8)).add(Hand::from(Card::from(2u8))));
        assert_eq!(board.cards().len(), 3);
    }
}
