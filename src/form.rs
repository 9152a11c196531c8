use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Fixture, Team, result_points};

const FORM_WINDOW: usize = 5;
const MIN_FORM_MATCHES: usize = 3;
const RECENCY_WEIGHTS: [f64; FORM_WINDOW] = [1.0, 0.8, 0.6, 0.4, 0.2];
const REFERENCE_STRENGTH: f64 = 1200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPerformance {
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub opponent_strength: f64,
    pub strength_adjusted_score: f64,
    pub is_home: bool,
}

/// Most recent scored fixtures for `team_id`, newest first.
fn recent_results(team_id: u32, fixtures: &[Fixture]) -> Vec<&Fixture> {
    let mut recent: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| f.involves(team_id) && f.is_scored())
        .collect();
    recent.sort_by(|a, b| b.event_or_zero().cmp(&a.event_or_zero()));
    recent.truncate(FORM_WINDOW);
    recent
}

/// Short-horizon momentum in [-0.5, 0.5] from the last five results.
/// Returns 0 with fewer than three completed matches.
pub fn calculate_form_adjustment(team_id: u32, fixtures: &[Fixture], teams: &[Team]) -> f64 {
    let recent = recent_results(team_id, fixtures);
    if recent.len() < MIN_FORM_MATCHES {
        return 0.0;
    }

    let team_map: HashMap<u32, &Team> = teams.iter().map(|t| (t.id, t)).collect();
    let mut performances = Vec::with_capacity(recent.len());
    for f in recent {
        let is_home = f.team_h == team_id;
        let Some(opponent) = team_map.get(&f.opponent_of(team_id)) else {
            continue;
        };
        let Some((goals_for, goals_against)) = f.goals_for_against(team_id) else {
            continue;
        };
        let points = result_points(goals_for, goals_against);
        let opponent_strength = opponent.average_overall_strength();
        performances.push(MatchPerformance {
            points,
            goals_for,
            goals_against,
            goal_difference: goals_for as i64 - goals_against as i64,
            opponent_strength,
            strength_adjusted_score: strength_adjusted_score(
                points,
                goals_for,
                goals_against,
                opponent_strength,
                is_home,
            ),
            is_home,
        });
    }

    weighted_form_score(&performances)
}

pub fn strength_adjusted_score(
    points: u32,
    goals_for: u32,
    goals_against: u32,
    opponent_strength: f64,
    is_home: bool,
) -> f64 {
    let mut score = points as f64;
    let strength_factor = opponent_strength / REFERENCE_STRENGTH;

    if points == 3 {
        score += ((strength_factor - 1.0) * 2.0).max(0.0);
    } else if points == 0 {
        score -= ((1.0 - strength_factor) * 1.5).max(0.0);
    }

    if goals_for >= 3 {
        score += 0.5;
    } else if goals_for >= 2 {
        score += 0.25;
    } else if goals_for == 0 {
        score -= 0.25;
    }

    if goals_against == 0 {
        score += 0.3;
    } else if goals_against >= 3 {
        score -= 0.5;
    } else if goals_against >= 2 {
        score -= 0.25;
    }

    // Away results count slightly more.
    if is_home { score * 0.95 } else { score * 1.05 }
}

fn weighted_form_score(performances: &[MatchPerformance]) -> f64 {
    if performances.is_empty() {
        return 0.0;
    }
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (idx, perf) in performances.iter().enumerate() {
        let w = RECENCY_WEIGHTS.get(idx).copied().unwrap_or(0.1);
        weighted += perf.strength_adjusted_score * w;
        total_weight += w;
    }
    let avg = if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    };
    ((avg - 1.5) / 3.0).clamp(-0.5, 0.5)
}

/// Last five results oldest to newest, e.g. `"WWDLW (9 GF, 4 GA)"`.
pub fn form_summary(team_id: u32, fixtures: &[Fixture]) -> String {
    let recent = recent_results(team_id, fixtures);
    if recent.is_empty() {
        return "No recent games".to_string();
    }

    let mut letters = Vec::with_capacity(recent.len());
    let mut total_for = 0;
    let mut total_against = 0;
    for f in &recent {
        let Some((gf, ga)) = f.goals_for_against(team_id) else {
            continue;
        };
        total_for += gf;
        total_against += ga;
        letters.push(match result_points(gf, ga) {
            3 => 'W',
            1 => 'D',
            _ => 'L',
        });
    }
    letters.reverse();
    let results: String = letters.into_iter().collect();
    format!("{results} ({total_for} GF, {total_against} GA)")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormIndicator {
    Excellent,
    Good,
    Average,
    Poor,
    VeryPoor,
    NoData,
}

impl FormIndicator {
    pub fn label(self) -> &'static str {
        match self {
            FormIndicator::Excellent => "Excellent",
            FormIndicator::Good => "Good",
            FormIndicator::Average => "Average",
            FormIndicator::Poor => "Poor",
            FormIndicator::VeryPoor => "Very Poor",
            FormIndicator::NoData => "No data",
        }
    }
}

/// Bucket the provider's free-text form value (e.g. `"3.5"`).
pub fn form_indicator(raw: &str) -> FormIndicator {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return FormIndicator::NoData;
    };
    if !value.is_finite() || value <= 0.0 {
        return FormIndicator::NoData;
    }
    if value >= 4.0 {
        FormIndicator::Excellent
    } else if value >= 3.0 {
        FormIndicator::Good
    } else if value >= 2.0 {
        FormIndicator::Average
    } else if value >= 1.0 {
        FormIndicator::Poor
    } else {
        FormIndicator::VeryPoor
    }
}
