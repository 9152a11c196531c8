use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use crate::confidence::{
    Confidence, MAX_RATING, MIN_RATING, calculate_confidence, calculate_confidence_interval,
    round_to,
};
use crate::form::calculate_form_adjustment;
use crate::league_comparator::{
    TeamPerformanceData, calculate_all_teams_performance, calculate_season_adjustment,
};
use crate::model::{Fixture, Team};
use crate::season_performance::calculate_season_performance;
use crate::weights::{WeightConfig, calculate_dynamic_weights};

const HOME_ADVANTAGE: f64 = 0.15;

/// Strength band the provider's ratings live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthRange {
    pub min: f64,
    pub max: f64,
}

impl StrengthRange {
    pub const EMPIRICAL: StrengthRange = StrengthRange {
        min: 1000.0,
        max: 1400.0,
    };

    /// Map a strength onto the 1..5 difficulty scale. A collapsed range is neutral.
    pub fn normalize(&self, strength: f64) -> f64 {
        if (self.max - self.min).abs() < f64::EPSILON {
            return 3.0;
        }
        let clamped = strength.clamp(self.min, self.max);
        MIN_RATING + (MAX_RATING - MIN_RATING) * (clamped - self.min) / (self.max - self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdrConfidenceIntervals {
    pub overall: (f64, f64),
    pub attacking: (f64, f64),
    pub defensive: (f64, f64),
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdrAdjustments {
    pub season_form: f64,
    pub recent_form: f64,
    pub home_advantage: f64,
    pub strength_evolution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FdrDebug {
    pub base_strength: f64,
    pub season_adjustment: f64,
    pub form_adjustment: f64,
    pub home_advantage: f64,
    pub raw_score: f64,
    pub weights: WeightConfig,
}

/// Opponent difficulty as seen from one side of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedFdrResult {
    pub overall: f64,
    pub attacking: f64,
    pub defensive: f64,
    pub confidence: Confidence,
    pub confidence_interval: FdrConfidenceIntervals,
    pub adjustments: FdrAdjustments,
    pub debug: FdrDebug,
}

/// League-wide inputs shared by every rating in one request.
pub struct LeagueContext<'a> {
    teams: &'a [Team],
    fixtures: &'a [Fixture],
    current_gameweek: u32,
    performance: Vec<TeamPerformanceData>,
}

impl<'a> LeagueContext<'a> {
    pub fn new(teams: &'a [Team], fixtures: &'a [Fixture], current_gameweek: u32) -> Self {
        Self {
            teams,
            fixtures,
            current_gameweek,
            performance: calculate_all_teams_performance(teams, fixtures, current_gameweek),
        }
    }

    pub fn current_gameweek(&self) -> u32 {
        self.current_gameweek
    }

    pub fn teams(&self) -> &'a [Team] {
        self.teams
    }

    pub fn performance(&self) -> &[TeamPerformanceData] {
        &self.performance
    }

    /// Rate the opponent in `home` vs `away`, from the home side when `is_home`.
    pub fn rate(&self, home: &Team, away: &Team, is_home: bool) -> Result<EnhancedFdrResult> {
        ensure!(
            self.current_gameweek >= 1,
            "current gameweek must be at least 1"
        );
        for team in [home, away] {
            ensure!(
                team.strength_values().iter().all(|v| v.is_finite()),
                "team {} has a non-finite strength rating",
                team.id
            );
        }

        let gw = self.current_gameweek;
        let opponent = if is_home { away } else { home };
        let opponent_perf = calculate_season_performance(opponent.id, self.fixtures, gw);
        let weights = calculate_dynamic_weights(gw, opponent_perf.games_played);

        let attacking_base = attacking_difficulty(opponent, is_home);
        let defensive_base = defensive_difficulty(opponent, is_home);
        let overall_base = (attacking_base + defensive_base) / 2.0;

        let season_adjustment = calculate_season_adjustment(
            opponent,
            &opponent_perf,
            &self.performance,
            self.teams,
            gw,
            is_home,
        );
        let form_adjustment = calculate_form_adjustment(opponent.id, self.fixtures, self.teams);
        // Playing at home eases the fixture for the evaluated side.
        let home_advantage = if is_home {
            -HOME_ADVANTAGE
        } else {
            HOME_ADVANTAGE
        };

        let shift = season_adjustment * weights.season
            + form_adjustment * weights.form
            + home_advantage * weights.home;
        let raw_attacking = attacking_base + shift;
        let raw_defensive = defensive_base + shift;
        let raw_overall = (raw_attacking + raw_defensive) / 2.0;

        let games = opponent_perf.games_played;
        let magnitude = season_adjustment.abs() + form_adjustment.abs();
        let overall_ci = calculate_confidence_interval(raw_overall, games, gw, magnitude);
        let attacking_ci = calculate_confidence_interval(raw_attacking, games, gw, magnitude);
        let defensive_ci = calculate_confidence_interval(raw_defensive, games, gw, magnitude);

        Ok(EnhancedFdrResult {
            overall: round_to(raw_overall.clamp(MIN_RATING, MAX_RATING), 2),
            attacking: round_to(raw_attacking.clamp(MIN_RATING, MAX_RATING), 2),
            defensive: round_to(raw_defensive.clamp(MIN_RATING, MAX_RATING), 2),
            confidence: calculate_confidence(games, gw),
            confidence_interval: FdrConfidenceIntervals {
                overall: overall_ci.interval,
                attacking: attacking_ci.interval,
                defensive: defensive_ci.interval,
                confidence_score: overall_ci.confidence_score,
            },
            adjustments: FdrAdjustments {
                season_form: round_to(season_adjustment, 3),
                recent_form: round_to(form_adjustment, 3),
                home_advantage: round_to(home_advantage, 3),
                strength_evolution: 0.0,
            },
            debug: FdrDebug {
                base_strength: round_to(overall_base, 2),
                season_adjustment: round_to(season_adjustment, 2),
                form_adjustment: round_to(form_adjustment, 2),
                home_advantage: round_to(home_advantage, 2),
                raw_score: round_to(raw_overall, 2),
                weights,
            },
        })
    }
}

/// One-off rating. Builds the league context for a single call; batch callers
/// should hold a [`LeagueContext`] instead.
pub fn calculate_dynamic_fdr(
    home: &Team,
    away: &Team,
    fixtures: &[Fixture],
    teams: &[Team],
    is_home: bool,
    current_gameweek: u32,
) -> Result<EnhancedFdrResult> {
    LeagueContext::new(teams, fixtures, current_gameweek).rate(home, away, is_home)
}

/// Opponent defence decides how hard it is to score.
fn attacking_difficulty(opponent: &Team, is_home: bool) -> f64 {
    let defence = if is_home {
        opponent.strength_defence_home
    } else {
        opponent.strength_defence_away
    };
    StrengthRange::EMPIRICAL.normalize(defence)
}

/// Opponent attack decides how hard it is to keep a clean sheet.
fn defensive_difficulty(opponent: &Team, is_home: bool) -> f64 {
    let attack = if is_home {
        opponent.strength_attack_home
    } else {
        opponent.strength_attack_away
    };
    StrengthRange::EMPIRICAL.normalize(attack)
}
