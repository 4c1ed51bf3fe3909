// =============================================================================
// Shared types used across the Marketscope backend
// =============================================================================

use serde::{Deserialize, Serialize};

/// Which half of an options chain a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Per-bar trading signal from the crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Default for Signal {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Outcome of a fetch-and-compute cycle against the data provider.
///
/// The provider answering with nothing (unknown ticker, delisted symbol, no
/// options listed) is a normal outcome, distinct from a transport or parse
/// failure. The API layer maps `Data` to 200, `Empty` to 404, and `Failed`
/// to 502.
#[derive(Debug, Clone)]
pub enum Fetched<T> {
    Data(T),
    Empty,
    Failed(String),
}

impl<T> Fetched<T> {
    /// Apply `f` to the payload, passing `Empty`/`Failed` through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Data(v) => Fetched::Data(f(v)),
            Self::Empty => Fetched::Empty,
            Self::Failed(reason) => Fetched::Failed(reason),
        }
    }

}
