//! Ranking metric — which number a search optimizes.

use serde::{Deserialize, Serialize};

use zonelab_core::RunResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    #[default]
    TotalPnl,
    WinRate,
    FinalBalance,
    RiskReward,
}

impl RankMetric {
    pub fn extract(&self, result: &RunResult) -> f64 {
        match self {
            Self::TotalPnl => result.total_pnl,
            Self::WinRate => result.win_rate,
            Self::FinalBalance => result.final_balance,
            Self::RiskReward => result.risk_reward,
        }
    }

    /// Higher is better for every supported metric.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        a > b
    }
}
