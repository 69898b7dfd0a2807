use crate::constants::*;
use crate::terrain::TileState;
use serde::{Deserialize, Serialize};

/// Per-state weights used to value islands and flooded clusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileWeights {
    pub flooded: u32,
    pub redried: u32,
    pub dry: u32,
}

impl TileWeights {
    pub fn weight(&self, state: TileState) -> u32 {
        match state {
            TileState::Dry => self.dry,
            TileState::Flooded => self.flooded,
            TileState::Redried => self.redried,
            TileState::Drowned => 0,
        }
    }
}

impl Default for TileWeights {
    fn default() -> Self {
        TileWeights {
            flooded: FLOODED_WEIGHT,
            redried: REDRIED_WEIGHT,
            dry: DRY_WEIGHT,
        }
    }
}

/// Which decision procedure runs each round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Pick farming, moving or dry-max each turn from the island layout.
    #[default]
    Adaptive,
    /// Always dry as many tiles as possible around the bot.
    DryMax,
}

/// Tunables of the strategy engine. Missing fields fall back to defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub weights: TileWeights,
    /// Score lost per tile of walking distance to a flooded cluster.
    pub cluster_distance_penalty: i64,
    pub strategy: StrategyKind,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            weights: TileWeights::default(),
            cluster_distance_penalty: CLUSTER_DISTANCE_PENALTY,
            strategy: StrategyKind::default(),
        }
    }
}

impl StrategyConfig {
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config: StrategyConfig =
            serde_json::from_str(r#"{ "weights": { "dry": 5 }, "strategy": "dry-max" }"#).unwrap();
        assert_eq!(config.weights.dry, 5);
        assert_eq!(config.weights.flooded, FLOODED_WEIGHT);
        assert_eq!(config.strategy, StrategyKind::DryMax);
        assert_eq!(config.cluster_distance_penalty, CLUSTER_DISTANCE_PENALTY);
    }
}
