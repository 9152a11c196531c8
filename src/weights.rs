use serde::{Deserialize, Serialize};

const SEASON_LENGTH: f64 = 38.0;

/// How much each signal counts towards the final rating. Not normalised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub base: f64,
    pub season: f64,
    pub form: f64,
    pub home: f64,
}

pub fn calculate_dynamic_weights(current_gameweek: u32, games_played: u32) -> WeightConfig {
    let season_progress = (current_gameweek as f64 / SEASON_LENGTH).min(1.0);
    let data_availability = (games_played as f64 / 10.0).min(1.0);

    // Opening weeks: preseason ratings dominate.
    if current_gameweek <= 5 {
        return WeightConfig {
            base: 0.8,
            season: 0.05,
            form: 0.1,
            home: 0.05,
        };
    }

    if current_gameweek <= 15 {
        let season = 0.05 + season_progress * 0.2;
        return WeightConfig {
            base: 0.8 - season_progress * 0.2,
            season: season * data_availability,
            form: 0.15,
            home: 0.05,
        };
    }

    WeightConfig {
        base: 0.5,
        season: 0.35 * data_availability,
        form: 0.1,
        home: 0.05,
    }
}
