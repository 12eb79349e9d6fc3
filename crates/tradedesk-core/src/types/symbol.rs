//! Watchlist symbols.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A case-insensitive ticker, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trim and uppercase raw input; blank input is rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a requested watchlist.
///
/// Duplicates (after uppercasing) are dropped, keeping the first occurrence,
/// so the returned order matches the order the user asked for. A single
/// blank entry rejects the whole list.
pub fn normalize_watchlist<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Symbol>, ValidationError> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut symbols = Vec::with_capacity(raw.len());

    for entry in raw {
        let symbol = Symbol::parse(entry.as_ref())?;
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    Ok(symbols)
}
