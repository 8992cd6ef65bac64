use rbp_core::Chips;

/// A single betting decision, as persisted in the `actions` table and as
/// produced by a `Sit`/`Call`/`Raise` client message on the wire.
///
/// This is intentionally a closed, table-session-manager-owned type: the
/// hand engine is an external collaborator consumed through [`crate::Hand`]
/// and friends, and all the core needs from it is enough of an action
/// vocabulary to log history and render packets. The engine's own richer
/// action representation, if any, is translated into this one at the seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Fold,
    Check,
    Call(Chips),
    Raise(Chips),
    AllIn(Chips),
    Blind(Chips),
    Ante(Chips),
}

/// Tag byte used by the `u64` encoding. Kept internal; only the bijection matters.
const TAG_FOLD: u64 = 0;
const TAG_CHECK: u64 = 1;
const TAG_CALL: u64 = 2;
const TAG_RAISE: u64 = 3;
const TAG_ALLIN: u64 = 4;
const TAG_BLIND: u64 = 5;
const TAG_ANTE: u64 = 6;

/// Mask for the 56-bit amount field — wide enough for any real chip stack
/// (`Chips` is `i64`; table buy-ins run into the hundreds of thousands).
const AMOUNT_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

impl From<Action> for u64 {
    fn from(action: Action) -> u64 {
        let (tag, amount) = match action {
            Action::Fold => (TAG_FOLD, 0),
            Action::Check => (TAG_CHECK, 0),
            Action::Call(c) => (TAG_CALL, c),
            Action::Raise(c) => (TAG_RAISE, c),
            Action::AllIn(c) => (TAG_ALLIN, c),
            Action::Blind(c) => (TAG_BLIND, c),
            Action::Ante(c) => (TAG_ANTE, c),
        };
        (tag << 56) | (amount as u64 & AMOUNT_MASK)
    }
}
impl From<u64> for Action {
    fn from(encoded: u64) -> Self {
        let tag = encoded >> 56;
        let amount = (encoded & AMOUNT_MASK) as Chips;
        match tag {
            TAG_FOLD => Action::Fold,
            TAG_CHECK => Action::Check,
            TAG_CALL => Action::Call(amount),
            TAG_RAISE => Action::Raise(amount),
            TAG_ALLIN => Action::AllIn(amount),
            TAG_BLIND => Action::Blind(amount),
            TAG_ANTE => Action::Ante(amount),
            _ => Action::Fold,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call(c) => write!(f, "call {c}"),
            Action::Raise(c) => write!(f, "raise {c}"),
            Action::AllIn(c) => write!(f, "all-in {c}"),
            Action::Blind(c) => write!(f, "blind {c}"),
            Action::Ante(c) => write!(f, "ante {c}"),
        }
    }
}

impl TryFrom<&str> for Action {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut parts = s.trim().split_whitespace();
        let word = parts.next().ok_or_else(|| "empty action".to_string())?;
        let amount = || -> Result<Chips, String> {
            parts
                .clone()
                .next()
                .ok_or_else(|| format!("{word} requires an amount"))?
                .parse::<Chips>()
                .map_err(|e| e.to_string())
        };
        match word {
            "fold" => Ok(Action::Fold),
            "check" => Ok(Action::Check),
            "call" => Ok(Action::Call(amount()?)),
            "raise" => Ok(Action::Raise(amount()?)),
            "all-in" => Ok(Action::AllIn(amount()?)),
            other => Err(format!("unrecognized action: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u64_roundtrip() {
        for action in [
            Action::Fold,
            Action::Check,
            Action::Call(10),
            Action::Raise(250),
            Action::AllIn(5000),
            Action::Raise(200_000),
        ] {
            assert_eq!(Action::from(u64::from(action)), action);
        }
    }

    #[test]
    fn parses_display() {
        assert_eq!(Action::try_from("fold").unwrap(), Action::Fold);
        assert_eq!(Action::try_from("call 10").unwrap(), Action::Call(10));
        assert!(Action::try_from("call").is_err());
        assert!(Action::try_from("bogus").is_err());
    }
}
