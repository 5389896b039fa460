use serde::{Deserialize, Serialize};

/// Binary churn prediction: probabilities of staying and of leaving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub p_stay: f64,
    pub p_leave: f64,
}

impl PredictionResult {
    /// Build from the probability of leaving, clamped into `[0, 1]`.
    ///
    /// Returns `None` for NaN, which has no place in either probability.
    pub fn from_leave_probability(p_leave: f64) -> Option<Self> {
        if p_leave.is_nan() {
            return None;
        }
        let p_leave = p_leave.clamp(0.0, 1.0);
        Some(Self {
            p_stay: 1.0 - p_leave,
            p_leave,
        })
    }

    /// Probability assigned to the predicted outcome.
    pub fn confidence(&self) -> f64 {
        self.p_stay.max(self.p_leave)
    }

    /// True when leaving is at least as likely as staying.
    pub fn predicts_leave(&self) -> bool {
        self.p_leave >= self.p_stay
    }
}
