use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Strategy used to resolve a similarity graph into a one-to-one mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Best target per source, first claimant keeps ties. Fastest.
    #[default]
    Threshold,
    /// Optimal assignment (Hungarian algorithm)
    Bipartite,
    /// Optimal assignment via min-cost flow; scales with edge count
    Weighted,
    /// Global descending-score pass, ≥ ½ optimal weight
    Greedy,
}

impl MatchMethod {
    /// All strategies, in documentation order
    pub const ALL: [MatchMethod; 4] = [
        MatchMethod::Threshold,
        MatchMethod::Bipartite,
        MatchMethod::Weighted,
        MatchMethod::Greedy,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Bipartite => "bipartite",
            Self::Weighted => "weighted",
            Self::Greedy => "greedy",
        }
    }

    /// Whether the strategy maximises the total matched score
    #[must_use]
    pub fn is_optimal(self) -> bool {
        matches!(self, Self::Bipartite | Self::Weighted)
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for a strategy name that is not recognised; carries the name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethodName(pub String);

impl FromStr for MatchMethod {
    type Err = UnknownMethodName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threshold" => Ok(Self::Threshold),
            "bipartite" => Ok(Self::Bipartite),
            "weighted" | "weighted-flow" | "weighted_flow" => Ok(Self::Weighted),
            "greedy" => Ok(Self::Greedy),
            _ => Err(UnknownMethodName(s.to_string())),
        }
    }
}
