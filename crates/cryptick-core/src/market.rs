//! Market (trading venue) identification.

use serde::{Deserialize, Serialize};

/// Trading venue a price update originated from.
///
/// The two feeds are fully independent; a symbol may tick on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Spot trading venue.
    Spot,
    /// Derivative (futures) trading venue.
    Derivative,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Derivative => write!(f, "derivative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Market::Spot).unwrap(), "\"spot\"");
        assert_eq!(
            serde_json::to_string(&Market::Derivative).unwrap(),
            "\"derivative\""
        );
    }
}
