//! Retention risk tiers derived from a prediction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ml::PredictionResult;

/// Stay-probability cut-offs separating the tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionThresholds {
    /// `p_stay` strictly above this is [`RiskTier::HighRetention`].
    pub high_retention: f64,
    /// `p_stay` strictly above this (and not high retention) is [`RiskTier::ModerateRisk`].
    pub moderate_risk: f64,
}

impl Default for PredictionThresholds {
    fn default() -> Self {
        Self {
            high_retention: 0.7,
            moderate_risk: 0.5,
        }
    }
}

impl PredictionThresholds {
    /// Clamp both cut-offs into `[0, 1]` and keep `moderate_risk <= high_retention`.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let high_retention = clamp(self.high_retention, defaults.high_retention);
        let moderate_risk =
            clamp(self.moderate_risk, defaults.moderate_risk).min(high_retention);
        Self {
            high_retention,
            moderate_risk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    HighRetention,
    ModerateRisk,
    HighChurnRisk,
}

impl RiskTier {
    pub fn classify(prediction: &PredictionResult, thresholds: &PredictionThresholds) -> Self {
        if prediction.p_stay > thresholds.high_retention {
            RiskTier::HighRetention
        } else if prediction.p_stay > thresholds.moderate_risk {
            RiskTier::ModerateRisk
        } else {
            RiskTier::HighChurnRisk
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::HighRetention => "High retention",
            RiskTier::ModerateRisk => "Moderate risk",
            RiskTier::HighChurnRisk => "High churn risk",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            RiskTier::HighRetention => "Employee is likely to stay.",
            RiskTier::ModerateRisk => "Some risk of leaving; worth a check-in.",
            RiskTier::HighChurnRisk => "Employee is likely to leave; retention action advised.",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(p_stay: f64) -> RiskTier {
        let prediction = PredictionResult::from_leave_probability(1.0 - p_stay).unwrap();
        RiskTier::classify(&prediction, &PredictionThresholds::default())
    }

    #[test]
    fn tiers_use_strict_upper_bounds() {
        assert_eq!(tier(0.9), RiskTier::HighRetention);
        assert_eq!(tier(0.6), RiskTier::ModerateRisk);
        assert_eq!(tier(0.5), RiskTier::HighChurnRisk);
        assert_eq!(tier(0.1), RiskTier::HighChurnRisk);
    }

    #[test]
    fn exact_high_retention_cutoff_is_moderate() {
        let prediction = PredictionResult {
            p_stay: 0.7,
            p_leave: 0.3,
        };
        assert_eq!(
            RiskTier::classify(&prediction, &PredictionThresholds::default()),
            RiskTier::ModerateRisk
        );
    }

    #[test]
    fn normalization_orders_and_clamps_thresholds() {
        let thresholds = PredictionThresholds {
            high_retention: 1.5,
            moderate_risk: f64::NAN,
        }
        .normalized();
        assert_eq!(thresholds.high_retention, 1.0);
        assert_eq!(thresholds.moderate_risk, 0.5);

        let inverted = PredictionThresholds {
            high_retention: 0.4,
            moderate_risk: 0.6,
        }
        .normalized();
        assert_eq!(inverted.moderate_risk, 0.4);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let thresholds: PredictionThresholds = toml::from_str("high_retention = 0.8").unwrap();
        assert_eq!(thresholds.high_retention, 0.8);
        assert_eq!(thresholds.moderate_risk, 0.5);
    }
}
