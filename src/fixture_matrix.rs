use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attractiveness::{AttractivenessResult, calculate_attractiveness_score};
use crate::compute_pool::with_compute_pool;
use crate::confidence::round_to;
use crate::dynamic_fdr::{EnhancedFdrResult, LeagueContext};
use crate::model::{DifficultyType, Fixture, Team};

pub const BLANK_OPPONENT: &str = "Blank";
const UNKNOWN_SHORT_NAME: &str = "?";
const UNKNOWN_OPPONENT: &str = "Unknown";

/// One fixture inside a grid cell, or the blank placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleFixture {
    pub label: String,
    pub difficulty: f64,
    pub opponent_name: String,
    pub opponent_short: String,
    pub opponent_id: u32,
    pub opponent_code: u32,
    pub is_home: bool,
    pub kickoff_time: Option<String>,
    pub gameweek_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attractiveness_score: Option<f64>,
}

impl SingleFixture {
    pub fn blank(gameweek_id: u32) -> Self {
        Self {
            label: "-".to_string(),
            difficulty: 0.0,
            opponent_name: BLANK_OPPONENT.to_string(),
            opponent_short: "-".to_string(),
            opponent_id: 0,
            opponent_code: 0,
            is_home: false,
            kickoff_time: None,
            gameweek_id,
            fixture_id: None,
            confidence_interval: None,
            confidence_score: None,
            attractiveness_score: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.difficulty == 0.0 && self.opponent_name == BLANK_OPPONENT
    }
}

pub type FixtureCell = Vec<SingleFixture>;
pub type FixtureMatrix = Vec<Vec<FixtureCell>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRequest {
    pub first_gameweek: u32,
    pub number_of_gameweeks: u32,
    /// Gameweek the dynamic ratings are evaluated at.
    pub current_gameweek: u32,
    pub difficulty_type: DifficultyType,
}

impl MatrixRequest {
    pub fn gameweeks(&self) -> Range<u32> {
        self.first_gameweek..self.first_gameweek.saturating_add(self.number_of_gameweeks)
    }

    fn contains(&self, gameweek: u32) -> bool {
        self.gameweeks().contains(&gameweek)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureMatrixResult {
    pub team_names: Vec<String>,
    pub fixture_matrix: FixtureMatrix,
    /// Mean difficulty over each team's non-blank fixtures in the window.
    pub averages: Vec<f64>,
    pub attractiveness: Vec<AttractivenessResult>,
    pub gameweek_attractiveness_matrix: Vec<Vec<f64>>,
    pub difficulty_type: DifficultyType,
    /// True when dynamic ratings failed and provider ratings were used instead.
    pub provider_fallback: bool,
}

impl FixtureMatrixResult {
    pub fn team_total_scores(&self) -> Vec<f64> {
        self.attractiveness.iter().map(|a| a.total_score).collect()
    }

    pub fn team_average_scores(&self) -> Vec<f64> {
        self.attractiveness.iter().map(|a| a.avg_score).collect()
    }
}

/// `(team_id, fixture_id, gameweek)`: one side of one fixture.
type RatingKey = (u32, u32, u32);

/// Ratings computed for a single generator call. Never outlives it.
struct RatingCache {
    ratings: HashMap<RatingKey, EnhancedFdrResult>,
}

impl RatingCache {
    fn get(&self, team_id: u32, fixture_id: u32, gameweek: u32) -> Option<&EnhancedFdrResult> {
        self.ratings.get(&(team_id, fixture_id, gameweek))
    }
}

#[derive(Debug, Clone, Copy)]
struct RatingJob<'a> {
    home: &'a Team,
    away: &'a Team,
    fixture_id: u32,
    gameweek: u32,
    is_home: bool,
}

impl RatingJob<'_> {
    fn key(&self) -> RatingKey {
        let team = if self.is_home { self.home } else { self.away };
        (team.id, self.fixture_id, self.gameweek)
    }
}

pub fn generate_fixture_matrix(
    teams: &[Team],
    fixtures: &[Fixture],
    request: MatrixRequest,
) -> FixtureMatrixResult {
    let team_map: HashMap<u32, &Team> = teams.iter().map(|t| (t.id, t)).collect();

    let cache = if request.difficulty_type.is_dynamic() {
        match compute_dynamic_ratings(teams, fixtures, &team_map, request) {
            Ok(cache) => Some(cache),
            Err(err) => {
                // Whole-request fallback; a per-fixture retry is possible but not wanted here.
                log::error!("dynamic FDR batch failed, using provider ratings: {err:#}");
                None
            }
        }
    } else {
        None
    };
    let provider_fallback = request.difficulty_type.is_dynamic() && cache.is_none();

    // (team, gameweek) -> fixtures in input order.
    let mut by_team_week: HashMap<(u32, u32), Vec<&Fixture>> = HashMap::new();
    for f in fixtures {
        let Some(gw) = f.event else { continue };
        if !request.contains(gw) {
            continue;
        }
        by_team_week.entry((f.team_h, gw)).or_default().push(f);
        if f.team_a != f.team_h {
            by_team_week.entry((f.team_a, gw)).or_default().push(f);
        }
    }

    let mut fixture_matrix = Vec::with_capacity(teams.len());
    let mut averages = Vec::with_capacity(teams.len());
    let mut attractiveness = Vec::with_capacity(teams.len());
    let mut gameweek_attractiveness_matrix = Vec::with_capacity(teams.len());

    for team in teams {
        let mut row: Vec<FixtureCell> = Vec::with_capacity(request.number_of_gameweeks as usize);
        let mut total_difficulty = 0.0;
        let mut fixture_count = 0usize;

        for gw in request.gameweeks() {
            let mut week: Vec<&Fixture> = by_team_week
                .get(&(team.id, gw))
                .cloned()
                .unwrap_or_default();
            if week.is_empty() {
                row.push(vec![SingleFixture::blank(gw)]);
                continue;
            }
            week.sort_by_key(|f| f.kickoff_millis());

            let cell: FixtureCell = week
                .into_iter()
                .map(|f| build_entry(team, f, gw, &team_map, cache.as_ref(), request))
                .collect();
            for entry in &cell {
                total_difficulty += entry.difficulty;
                fixture_count += 1;
            }
            row.push(cell);
        }

        let average = if fixture_count > 0 {
            total_difficulty / fixture_count as f64
        } else {
            0.0
        };
        averages.push(round_to(average, 2));

        let score = calculate_attractiveness_score(&row);
        for (cell, gw_score) in row.iter_mut().zip(&score.gameweek_breakdown) {
            for entry in cell.iter_mut().filter(|e| !e.is_blank()) {
                entry.attractiveness_score = Some(gw_score.total_score);
            }
        }
        gameweek_attractiveness_matrix.push(
            score
                .gameweek_breakdown
                .iter()
                .map(|gw| gw.total_score)
                .collect(),
        );
        attractiveness.push(score);
        fixture_matrix.push(row);
    }

    FixtureMatrixResult {
        team_names: teams.iter().map(|t| t.name.clone()).collect(),
        fixture_matrix,
        averages,
        attractiveness,
        gameweek_attractiveness_matrix,
        difficulty_type: request.difficulty_type,
        provider_fallback,
    }
}

/// First pass: rate both sides of every fixture in the window exactly once.
fn compute_dynamic_ratings<'a>(
    teams: &'a [Team],
    fixtures: &'a [Fixture],
    team_map: &HashMap<u32, &'a Team>,
    request: MatrixRequest,
) -> Result<RatingCache> {
    let started = Instant::now();
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();
    for f in fixtures {
        let Some(gw) = f.event else { continue };
        if !request.contains(gw) {
            continue;
        }
        if !seen.insert((f.team_h, f.team_a, gw, f.id)) {
            continue;
        }
        let (Some(&home), Some(&away)) = (team_map.get(&f.team_h), team_map.get(&f.team_a))
        else {
            log::warn!(
                "fixture {} references an unknown team ({} v {}), keeping provider rating",
                f.id,
                f.team_h,
                f.team_a
            );
            continue;
        };
        for is_home in [true, false] {
            jobs.push(RatingJob {
                home,
                away,
                fixture_id: f.id,
                gameweek: gw,
                is_home,
            });
        }
    }

    let context = LeagueContext::new(teams, fixtures, request.current_gameweek);
    let rated: Vec<(RatingKey, EnhancedFdrResult)> = with_compute_pool(|| {
        jobs.par_iter()
            .map(|job| {
                context
                    .rate(job.home, job.away, job.is_home)
                    .map(|result| (job.key(), result))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    log::debug!(
        "rated {} fixture sides for gameweeks {}..{} in {:?}",
        rated.len(),
        request.first_gameweek,
        request.first_gameweek.saturating_add(request.number_of_gameweeks),
        started.elapsed()
    );

    Ok(RatingCache {
        ratings: rated.into_iter().collect(),
    })
}

fn build_entry(
    team: &Team,
    fixture: &Fixture,
    gameweek: u32,
    team_map: &HashMap<u32, &Team>,
    cache: Option<&RatingCache>,
    request: MatrixRequest,
) -> SingleFixture {
    let is_home = fixture.team_h == team.id;
    let opponent_id = fixture.opponent_of(team.id);
    let opponent = team_map.get(&opponent_id);

    let opponent_short = opponent
        .map(|t| t.short_name.clone())
        .unwrap_or_else(|| UNKNOWN_SHORT_NAME.to_string());
    let opponent_name = opponent
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_OPPONENT.to_string());
    let label = format!("{opponent_short} ({})", if is_home { "H" } else { "A" });

    let provider = fixture.provider_difficulty(is_home) as f64;
    let (difficulty, confidence_interval, confidence_score) = match cache {
        None => (provider, None, None),
        Some(cache) => match cache.get(team.id, fixture.id, gameweek) {
            Some(rating) => {
                let (value, interval) = match request.difficulty_type {
                    DifficultyType::Attack => {
                        (rating.attacking, rating.confidence_interval.attacking)
                    }
                    DifficultyType::Defence => {
                        (rating.defensive, rating.confidence_interval.defensive)
                    }
                    DifficultyType::Overall | DifficultyType::Fpl => {
                        (rating.overall, rating.confidence_interval.overall)
                    }
                };
                (
                    value,
                    Some(interval),
                    Some(rating.confidence_interval.confidence_score),
                )
            }
            None => {
                log::warn!(
                    "no dynamic rating for team {} fixture {} gw {}, using provider difficulty",
                    team.id,
                    fixture.id,
                    gameweek
                );
                (provider, None, None)
            }
        },
    };

    SingleFixture {
        label,
        difficulty,
        opponent_name,
        opponent_short,
        opponent_id,
        opponent_code: opponent.map(|t| t.code).unwrap_or(0),
        is_home,
        kickoff_time: fixture.kickoff_time.clone(),
        gameweek_id: gameweek,
        fixture_id: Some(fixture.id),
        confidence_interval,
        confidence_score,
        attractiveness_score: None,
    }
}
