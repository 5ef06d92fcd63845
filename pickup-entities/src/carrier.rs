use std::{fmt, num::NonZeroU64, str::FromStr};

use thiserror::Error;

/// Identifies the delivery method (carrier) a pickup point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarrierId(NonZeroU64);

impl CarrierId {
    #[must_use]
    pub const fn new(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarrierIdParseError {
    #[error("Missing carrier id")]
    Missing,
    #[error("Carrier id is not a positive integer: {0:?}")]
    Invalid(String),
}

impl FromStr for CarrierId {
    type Err = CarrierIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CarrierIdParseError::Missing);
        }
        s.parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| CarrierIdParseError::Invalid(s.to_owned()))
    }
}

impl TryFrom<Option<&str>> for CarrierId {
    type Error = CarrierIdParseError;

    fn try_from(from: Option<&str>) -> Result<Self, Self::Error> {
        from.ok_or(CarrierIdParseError::Missing)?.parse()
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_ids() {
        assert_eq!("7".parse::<CarrierId>().unwrap().get(), 7);
        assert_eq!(" 42 ".parse::<CarrierId>().unwrap().get(), 42);
    }

    #[test]
    fn reject_missing_and_invalid_ids() {
        assert_eq!(
            CarrierId::try_from(None::<&str>),
            Err(CarrierIdParseError::Missing)
        );
        assert_eq!("  ".parse::<CarrierId>(), Err(CarrierIdParseError::Missing));
        for invalid in ["0", "-3", "abc", "12abc", "1.5", "99999999999999999999"] {
            assert_eq!(
                invalid.parse::<CarrierId>(),
                Err(CarrierIdParseError::Invalid(invalid.to_owned())),
                "{invalid}"
            );
        }
    }

    #[test]
    fn zero_is_not_an_id() {
        assert!(CarrierId::new(0).is_none());
        assert_eq!(CarrierId::new(3).map(CarrierId::get), Some(3));
    }
}
