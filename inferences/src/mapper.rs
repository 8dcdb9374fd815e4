use crate::types::{Label, PredictionResult, Probability};

/// Scores strictly above this are `Dog`; a tie goes to `Cat`.
pub const DECISION_THRESHOLD: f32 = 0.5;

pub fn map_probability(probability: Probability) -> PredictionResult {
    let p = f64::from(probability.value());
    let label = if probability.value() > DECISION_THRESHOLD {
        Label::Dog
    } else {
        Label::Cat
    };
    let confidence = match label {
        Label::Dog => p,
        Label::Cat => 1.0 - p,
    };

    PredictionResult {
        label,
        confidence: round4(confidence),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
