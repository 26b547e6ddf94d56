//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory item (SQLite rowid).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ItemId> for i64 {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("ItemId: {e}")))?;
        if raw <= 0 {
            return Err(DomainError::invalid_id("ItemId: must be positive"));
        }
        Ok(Self(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert!("0".parse::<ItemId>().is_err());
        assert!("-3".parse::<ItemId>().is_err());
        assert!("abc".parse::<ItemId>().is_err());
    }
}
