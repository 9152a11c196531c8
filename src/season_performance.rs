use serde::{Deserialize, Serialize};

use crate::model::{Fixture, result_points};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub w: u32,
    pub d: u32,
    pub l: u32,
    pub gf: u32,
    pub ga: u32,
}

impl VenueRecord {
    pub fn games(&self) -> u32 {
        self.w + self.d + self.l
    }

    pub fn points(&self) -> u32 {
        self.w * 3 + self.d
    }

    pub fn ppg(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            0.0
        } else {
            self.points() as f64 / games as f64
        }
    }

    fn record(&mut self, goals_for: u32, goals_against: u32) {
        self.gf += goals_for;
        self.ga += goals_against;
        match result_points(goals_for, goals_against) {
            3 => self.w += 1,
            1 => self.d += 1,
            _ => self.l += 1,
        }
    }
}

/// A team's record to date, built only from completed fixtures before the
/// evaluation gameweek.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonPerformance {
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub home_record: VenueRecord,
    pub away_record: VenueRecord,
    pub x_points: f64,
    pub strength_trend: f64,
}

impl SeasonPerformance {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    pub fn ppg(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.points as f64 / self.games_played as f64
        }
    }
}

pub fn calculate_season_performance(
    team_id: u32,
    fixtures: &[Fixture],
    current_gameweek: u32,
) -> SeasonPerformance {
    let mut played: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| f.involves(team_id))
        .filter(|f| f.is_scored())
        .filter(|f| f.event_or_zero() < current_gameweek)
        .collect();
    played.sort_by_key(|f| f.event_or_zero());

    let mut out = SeasonPerformance::default();
    for f in played {
        let Some((gf, ga)) = f.goals_for_against(team_id) else {
            continue;
        };
        out.games_played += 1;
        out.goals_for += gf;
        out.goals_against += ga;

        let venue = if f.team_h == team_id {
            &mut out.home_record
        } else {
            &mut out.away_record
        };
        venue.record(gf, ga);

        match result_points(gf, ga) {
            3 => {
                out.points += 3;
                out.wins += 1;
            }
            1 => {
                out.points += 1;
                out.draws += 1;
            }
            _ => out.losses += 1,
        }
    }

    // Goal difference stands in for underlying chance quality.
    out.x_points = (out.points as f64 + out.goal_difference() as f64 * 0.1).max(0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(id: u32, event: u32, home: u32, away: u32, hs: u32, aws: u32) -> Fixture {
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
    fn counts_only_scored_fixtures_before_gameweek() {
        let mut unfinished = played(4, 2, 1, 4, 0, 0);
        unfinished.finished = false;
        let fixtures = vec![
            played(1, 1, 1, 2, 2, 0),
            played(2, 2, 3, 1, 1, 1),
            played(3, 3, 1, 3, 0, 1),
            unfinished,
        ];

        let perf = calculate_season_performance(1, &fixtures, 3);
        assert_eq!(perf.games_played, 2);
        assert_eq!(perf.points, 4);
        assert_eq!((perf.wins, perf.draws, perf.losses), (1, 1, 0));
        assert_eq!(perf.home_record.w, 1);
        assert_eq!(perf.away_record.d, 1);
        assert_eq!((perf.goals_for, perf.goals_against), (3, 1));
        assert!((perf.x_points - 4.2).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_zeroed() {
        let perf = calculate_season_performance(7, &[], 10);
        assert_eq!(perf, SeasonPerformance::default());
        assert_eq!(perf.ppg(), 0.0);
    }

    #[test]
    fn x_points_never_negative() {
        let fixtures = vec![played(1, 1, 1, 2, 0, 9)];
        let perf = calculate_season_performance(1, &fixtures, 5);
        assert_eq!(perf.x_points, 0.0);
    }
}
