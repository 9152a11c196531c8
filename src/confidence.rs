use serde::{Deserialize, Serialize};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub interval: (f64, f64),
    pub confidence_score: f64,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Uncertainty band around `rating` from sample size, season stage and how far
/// the adjustments moved the rating.
pub fn calculate_confidence_interval(
    rating: f64,
    games_played: u32,
    current_gameweek: u32,
    adjustment_magnitude: f64,
) -> ConfidenceInterval {
    let sample_size = if games_played < 5 {
        0.6
    } else if games_played < 10 {
        0.4
    } else {
        0.2
    };
    let early_season = if current_gameweek <= 8 { 0.5 } else { 0.2 };
    let adjustment = (adjustment_magnitude * 0.3).min(0.4);
    let uncertainty = sample_size + early_season + adjustment;

    let score = (1.0 - uncertainty / 1.5).clamp(0.1, 1.0);
    let lower = (rating - uncertainty).clamp(MIN_RATING, MAX_RATING);
    let upper = (rating + uncertainty).clamp(MIN_RATING, MAX_RATING);

    ConfidenceInterval {
        interval: (round_to(lower, 1), round_to(upper, 1)),
        confidence_score: round_to(score, 2),
    }
}

pub fn calculate_confidence(games_played: u32, current_gameweek: u32) -> Confidence {
    if current_gameweek <= 8 {
        return if games_played >= 5 {
            Confidence::Medium
        } else {
            Confidence::Low
        };
    }
    let (high, medium) = if current_gameweek <= 20 { (8, 4) } else { (15, 8) };
    if games_played >= high {
        Confidence::High
    } else if games_played >= medium {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    High,
    Medium,
    Low,
}

pub fn volatility(interval: (f64, f64)) -> Volatility {
    let width = interval.1 - interval.0;
    if width >= 1.0 {
        Volatility::High
    } else if width >= 0.5 {
        Volatility::Medium
    } else {
        Volatility::Low
    }
}

pub fn confidence_message(score: f64, volatility: Volatility) -> String {
    if score >= 0.8 {
        return "High confidence, trust this rating.".to_string();
    }
    if score >= 0.5 {
        return format!("Moderate confidence, watch for changes. Volatility: {volatility:?}.");
    }
    format!("Low confidence, high uncertainty. Volatility: {volatility:?}.")
}
