use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{Fixture, Team};
use crate::season_performance::{SeasonPerformance, calculate_season_performance};

const MIN_GAMES_FOR_ADJUSTMENT: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueSplit {
    pub ppg: f64,
    pub games: u32,
}

/// Per-team metrics normalised per game so clubs can be compared across the league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformanceData {
    pub team_id: u32,
    pub ppg: f64,
    pub games_played: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference_per_game: f64,
    pub home_record: VenueSplit,
    pub away_record: VenueSplit,
}

impl TeamPerformanceData {
    pub fn from_performance(team_id: u32, perf: &SeasonPerformance) -> Self {
        let goal_difference_per_game = if perf.games_played > 0 {
            perf.goal_difference() as f64 / perf.games_played as f64
        } else {
            0.0
        };
        Self {
            team_id,
            ppg: perf.ppg(),
            games_played: perf.games_played,
            goals_for: perf.goals_for,
            goals_against: perf.goals_against,
            goal_difference_per_game,
            home_record: VenueSplit {
                ppg: perf.home_record.ppg(),
                games: perf.home_record.games(),
            },
            away_record: VenueSplit {
                ppg: perf.away_record.ppg(),
                games: perf.away_record.games(),
            },
        }
    }
}

pub fn calculate_all_teams_performance(
    teams: &[Team],
    fixtures: &[Fixture],
    current_gameweek: u32,
) -> Vec<TeamPerformanceData> {
    teams
        .iter()
        .map(|team| {
            let perf = calculate_season_performance(team.id, fixtures, current_gameweek);
            TeamPerformanceData::from_performance(team.id, &perf)
        })
        .collect()
}

/// Expected points-per-game from the team's strength rank within `all_teams`.
///
/// Ranks by the mean of home/away overall strength (1 = strongest) and maps
/// the rank percentile onto a piecewise-linear top-flight PPG curve:
/// top 30% 2.2..1.8, next 30% 1.8..1.4, next 20% 1.4..1.1, bottom 20% 1.1..0.8.
/// A team missing from the list is treated as rank 0.
pub fn calculate_expected_ppg(team: &Team, all_teams: &[Team]) -> f64 {
    let mut ranked: Vec<(u32, f64)> = all_teams
        .iter()
        .map(|t| (t.id, t.average_overall_strength()))
        .collect();
    // Stable sort keeps input order among equal strengths.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let rank = ranked
        .iter()
        .position(|(id, _)| *id == team.id)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    if ranked.is_empty() {
        return expected_ppg_for_percentile(0.0);
    }
    expected_ppg_for_percentile(rank as f64 / ranked.len() as f64)
}

pub fn expected_ppg_for_percentile(percentile: f64) -> f64 {
    if percentile <= 0.3 {
        let pos = percentile / 0.3;
        return 2.2 - pos * 0.4;
    }
    if percentile <= 0.6 {
        let pos = (percentile - 0.3) / 0.3;
        return 1.8 - pos * 0.4;
    }
    if percentile <= 0.8 {
        let pos = (percentile - 0.6) / 0.2;
        return 1.4 - pos * 0.3;
    }
    let pos = (percentile - 0.8) / 0.2;
    1.1 - pos * 0.3
}

/// Season-form adjustment in [-1, 1] for `team` relative to the league.
/// Positive means the team is outperforming its strength rank.
pub fn calculate_season_adjustment(
    team: &Team,
    performance: &SeasonPerformance,
    all_teams_performance: &[TeamPerformanceData],
    all_teams: &[Team],
    current_gameweek: u32,
    is_home: bool,
) -> f64 {
    if performance.games_played < MIN_GAMES_FOR_ADJUSTMENT {
        return 0.0;
    }
    let Some(team_data) = all_teams_performance.iter().find(|t| t.team_id == team.id) else {
        return 0.0;
    };

    let expected_ppg = calculate_expected_ppg(team, all_teams);
    let ppg_adjustment = ((team_data.ppg - expected_ppg) * 0.4).clamp(-0.8, 0.8);

    let with_data: Vec<&TeamPerformanceData> = all_teams_performance
        .iter()
        .filter(|t| t.games_played >= MIN_GAMES_FOR_ADJUSTMENT)
        .collect();
    let league_avg_gd = if with_data.is_empty() {
        0.0
    } else {
        with_data
            .iter()
            .map(|t| t.goal_difference_per_game)
            .sum::<f64>()
            / with_data.len() as f64
    };
    let gd_adjustment =
        ((team_data.goal_difference_per_game - league_avg_gd) * 0.2).clamp(-0.4, 0.4);

    let venue = if is_home {
        team_data.home_record
    } else {
        team_data.away_record
    };
    let venue_adjustment = if venue.games >= MIN_GAMES_FOR_ADJUSTMENT {
        ((venue.ppg - team_data.ppg) * 0.3).clamp(-0.3, 0.3)
    } else {
        0.0
    };

    // Full trust at 8 games played and by gameweek 20.
    let sample_weight = (performance.games_played as f64 / 8.0).min(1.0);
    let season_weight = (current_gameweek as f64 / 20.0).min(1.0);
    let confidence_weight = (sample_weight + season_weight) / 2.0;

    ((ppg_adjustment + gd_adjustment + venue_adjustment) * confidence_weight).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: u32, overall: f64) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            code: id,
            strength: 3,
            strength_overall_home: overall,
            strength_overall_away: overall,
            strength_attack_home: overall,
            strength_attack_away: overall,
            strength_defence_home: overall,
            strength_defence_away: overall,
            form: None,
            pulse_id: id,
        }
    }

    fn result(id: u32, event: u32, home: u32, away: u32, hs: u32, aws: u32) -> Fixture {
        Fixture {
            id,
            event: Some(event),
            team_h: home,
            team_a: away,
            team_h_difficulty: 3,
            team_a_difficulty: 3,
            kickoff_time: None,
            started: true,
            finished: true,
            team_h_score: Some(hs),
            team_a_score: Some(aws),
        }
    }

    #[test]
    fn expected_ppg_curve_hits_tier_boundaries() {
        assert!((expected_ppg_for_percentile(0.0) - 2.2).abs() < 1e-9);
        assert!((expected_ppg_for_percentile(0.3) - 1.8).abs() < 1e-9);
        assert!((expected_ppg_for_percentile(0.6) - 1.4).abs() < 1e-9);
        assert!((expected_ppg_for_percentile(0.8) - 1.1).abs() < 1e-9);
        assert!((expected_ppg_for_percentile(1.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn expected_ppg_is_non_increasing_with_rank() {
        let teams: Vec<Team> = (1..=20).map(|i| team(i, 1400.0 - i as f64 * 15.0)).collect();
        let values: Vec<f64> = teams
            .iter()
            .map(|t| calculate_expected_ppg(t, &teams))
            .collect();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert!(values[0] > values[19]);
    }

    #[test]
    fn season_adjustment_needs_two_games() {
        let teams = vec![team(1, 1200.0), team(2, 1100.0)];
        let fixtures = vec![result(1, 1, 1, 2, 3, 0)];
        let all = calculate_all_teams_performance(&teams, &fixtures, 5);
        let perf = calculate_season_performance(1, &fixtures, 5);
        assert_eq!(
            calculate_season_adjustment(&teams[0], &perf, &all, &teams, 5, true),
            0.0
        );
    }

    #[test]
    fn overperforming_weak_team_gets_positive_adjustment() {
        let teams: Vec<Team> = (1..=10).map(|i| team(i, 1400.0 - i as f64 * 30.0)).collect();
        // Team 10 is the weakest but wins all four.
        let fixtures = vec![
            result(1, 1, 10, 1, 2, 0),
            result(2, 2, 2, 10, 0, 1),
            result(3, 3, 10, 3, 3, 1),
            result(4, 4, 4, 10, 1, 2),
            result(5, 1, 5, 6, 1, 1),
            result(6, 2, 6, 5, 0, 0),
        ];
        let all = calculate_all_teams_performance(&teams, &fixtures, 10);
        let perf = calculate_season_performance(10, &fixtures, 10);
        let adj = calculate_season_adjustment(&teams[9], &perf, &all, &teams, 10, true);
        assert!(adj > 0.0);
        assert!(adj <= 1.0);
    }

    #[test]
    fn season_adjustment_combines_all_three_terms() {
        let teams = vec![
            team(1, 1400.0),
            team(2, 1300.0),
            team(3, 1200.0),
            team(4, 1100.0),
        ];
        let fixtures = vec![
            result(1, 1, 4, 1, 2, 0),
            result(2, 2, 4, 2, 1, 1),
            result(3, 3, 3, 4, 1, 2),
            result(4, 1, 1, 2, 2, 1),
            result(5, 2, 3, 1, 0, 0),
            result(6, 3, 2, 3, 1, 0),
        ];
        let all = calculate_all_teams_performance(&teams, &fixtures, 10);
        let perf = calculate_season_performance(4, &fixtures, 10);
        assert_eq!(perf.games_played, 3);
        assert_eq!(perf.points, 7);

        // Weakest side expects 0.8 PPG; league GD per game averages to 0;
        // home PPG 2.0 against 7/3 overall.
        let ppg_term = (7.0 / 3.0 - 0.8) * 0.4;
        let gd_term = (1.0 - 0.0) * 0.2;
        let venue_term = (2.0 - 7.0 / 3.0) * 0.3;
        let confidence = (3.0 / 8.0 + 10.0 / 20.0) / 2.0;
        let expected: f64 = (ppg_term + gd_term + venue_term) * confidence;

        let adj = calculate_season_adjustment(&teams[3], &perf, &all, &teams, 10, true);
        assert!((expected - 0.3120833333).abs() < 1e-9);
        assert!((adj - expected).abs() < 1e-9, "adj = {adj}");

        // Away there is only one game, so the venue term drops out.
        let away = calculate_season_adjustment(&teams[3], &perf, &all, &teams, 10, false);
        assert!((away - (ppg_term + gd_term) * confidence).abs() < 1e-9);
    }
}
