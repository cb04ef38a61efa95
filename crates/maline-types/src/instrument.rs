//! Instrument identifiers.

use derive_more::Display;

/// Instrument fetched when none is given.
pub const DEFAULT_INSTRUMENT: &str = "SOL-USDT-SWAP";

/// Exchange instrument identifier (e.g. `SOL-USDT-SWAP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Creates an identifier, normalizing it to upper case.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_uppercase())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstrumentId {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUMENT)
    }
}

impl std::str::FromStr for InstrumentId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
