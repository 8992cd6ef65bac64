/// The four betting rounds of a hand.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Street {
    Pre,
    Flop,
    Turn,
    River,
}

impl Street {
    /// The street that follows this one. `River` has no successor and maps to itself.
    pub fn next(&self) -> Street {
        match self {
            Street::Pre => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River => Street::River,
        }
    }
    /// Number of board cards revealed when this street begins.
    pub fn n_revealed(&self) -> usize {
        match self {
            Street::Pre => 0,
            Street::Flop => 3,
            Street::Turn => 1,
            Street::River => 1,
        }
    }
}

impl std::fmt::Display for Street {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Street::Pre => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn river_is_terminal() {
        assert_eq!(Street::River.next(), Street::River);
    }

    #[test]
    fn flop_reveals_three() {
        assert_eq!(Street::Pre.next().n_revealed(), 3);
    }
}
