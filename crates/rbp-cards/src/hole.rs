use super::card::Card;
use super::hand::Hand;

/// A player's two private cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Hole(Card, Card);

impl Hole {
    pub fn cards(&self) -> (Card, Card) {
        (self.0, self.1)
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        Self(a, b)
    }
}

impl From<Hole> for Hand {
    fn from(hole: Hole) -> Self {
        Hand::from(hole.0).add(Hand::from(hole.1))
    }
}
impl From<Hand> for Hole {
    fn from(hand: Hand) -> Self {
        let cards = hand.cards();
        match cards.as_slice() {
            [a, b] => Self(*a, *b),
            [a] => Self(*a, *a),
            _ => Self(Card::from(0u8), Card::from(1u8)),
        }
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_roundtrip() {
        let hole = Hole::from((Card::from(0u8), Card::from(5u8)));
        let hand: Hand = hole.into();
        let back = Hole::from(hand);
        assert_eq!(hole, back);
    }
}
