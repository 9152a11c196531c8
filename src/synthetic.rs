use chrono::{Duration as ChronoDuration, NaiveDate, SecondsFormat};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Fixture, Gameweek, Team};
use crate::snapshot::Snapshot;

const CLUBS: [(&str, &str); 20] = [
    ("Arsenal", "ARS"),
    ("Aston Villa", "AVL"),
    ("Bournemouth", "BOU"),
    ("Brentford", "BRE"),
    ("Brighton", "BHA"),
    ("Chelsea", "CHE"),
    ("Crystal Palace", "CRY"),
    ("Everton", "EVE"),
    ("Fulham", "FUL"),
    ("Ipswich", "IPS"),
    ("Leicester", "LEI"),
    ("Liverpool", "LIV"),
    ("Man City", "MCI"),
    ("Man Utd", "MUN"),
    ("Newcastle", "NEW"),
    ("Nott'm Forest", "NFO"),
    ("Southampton", "SOU"),
    ("Spurs", "TOT"),
    ("West Ham", "WHU"),
    ("Wolves", "WOL"),
];

#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub teams: usize,
    pub gameweeks: u32,
    /// Gameweeks before this one are played and scored.
    pub played_through: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            teams: 20,
            gameweeks: 38,
            played_through: 10,
        }
    }
}

/// Deterministic round-robin league for demos and benchmarks. One fixture after
/// `played_through` is pushed back a week, giving its clubs a blank and a double.
pub fn generate_league(config: SyntheticConfig) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let n = config.teams.max(2);

    let teams: Vec<Team> = (0..n)
        .map(|idx| {
            let (name, short) = CLUBS
                .get(idx)
                .map(|(name, short)| (name.to_string(), short.to_string()))
                .unwrap_or_else(|| (format!("Club {}", idx + 1), format!("C{:02}", idx + 1)));
            let base: f64 = rng.gen_range(1040.0..1360.0);
            let mut jitter = || rng.gen_range(-40.0..40.0_f64);
            Team {
                id: idx as u32 + 1,
                name,
                short_name: short,
                code: idx as u32 + 1,
                strength: ((base - 1000.0) / 100.0).round().clamp(1.0, 5.0) as u32,
                strength_overall_home: base + 20.0,
                strength_overall_away: base - 20.0,
                strength_attack_home: base + jitter(),
                strength_attack_away: base + jitter(),
                strength_defence_home: base + jitter(),
                strength_defence_away: base + jitter(),
                form: None,
                pulse_id: idx as u32 + 1,
            }
        })
        .collect();

    let mut fixtures = Vec::new();
    let rounds = round_robin(n, config.gameweeks);
    let season_start = NaiveDate::from_ymd_opt(2024, 8, 17)
        .and_then(|d| d.and_hms_opt(14, 0, 0))
        .unwrap_or_default();

    for (round_idx, pairs) in rounds.into_iter().enumerate() {
        let gw = round_idx as u32 + 1;
        for (slot, (home_idx, away_idx)) in pairs.into_iter().enumerate() {
            let home = &teams[home_idx];
            let away = &teams[away_idx];
            let kickoff = season_start
                + ChronoDuration::days(7 * round_idx as i64)
                + ChronoDuration::hours((slot % 4) as i64 * 2);
            let played = gw < config.played_through;
            let (home_score, away_score) = if played {
                let edge = (home.average_overall_strength() - away.average_overall_strength())
                    / 150.0;
                let home_goals = (rng.gen_range(0.0..2.6_f64) + edge.max(0.0)).floor() as u32;
                let away_goals = (rng.gen_range(0.0..2.2_f64) - edge.min(0.0)).floor() as u32;
                (Some(home_goals), Some(away_goals))
            } else {
                (None, None)
            };
            fixtures.push(Fixture {
                id: fixtures.len() as u32 + 1,
                event: Some(gw),
                team_h: home.id,
                team_a: away.id,
                team_h_difficulty: provider_difficulty(away),
                team_a_difficulty: provider_difficulty(home),
                kickoff_time: Some(kickoff.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)),
                started: played,
                finished: played,
                team_h_score: home_score,
                team_a_score: away_score,
            });
        }
    }

    let moved_gw = config.played_through.max(1) + 2;
    if moved_gw < config.gameweeks {
        if let Some(f) = fixtures.iter_mut().find(|f| f.event == Some(moved_gw)) {
            f.event = Some(moved_gw + 1);
        }
    }

    let events = (1..=config.gameweeks)
        .map(|id| Gameweek {
            id,
            name: format!("Gameweek {id}"),
            deadline_time: None,
            is_current: id == config.played_through,
            is_next: id == config.played_through + 1,
            finished: id < config.played_through,
        })
        .collect();

    Snapshot {
        teams,
        fixtures,
        events,
    }
}

fn provider_difficulty(opponent: &Team) -> u8 {
    let scaled = (opponent.average_overall_strength() - 1000.0) / 400.0 * 4.0 + 1.0;
    scaled.round().clamp(1.0, 5.0) as u8
}

/// Circle-method pairings as team indices, alternating venues between rounds.
fn round_robin(n: usize, rounds: u32) -> Vec<Vec<(usize, usize)>> {
    // An odd league gets a bye slot that never plays.
    let slots = if n % 2 == 0 { n } else { n + 1 };
    let mut order: Vec<usize> = (0..slots).collect();
    let mut out = Vec::with_capacity(rounds as usize);
    for round in 0..rounds as usize {
        let mut pairs = Vec::with_capacity(slots / 2);
        for i in 0..slots / 2 {
            let (a, b) = (order[i], order[slots - 1 - i]);
            if a >= n || b >= n {
                continue;
            }
            if round % 2 == 0 {
                pairs.push((a, b));
            } else {
                pairs.push((b, a));
            }
        }
        out.push(pairs);
        order[1..].rotate_right(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_league() {
        let a = generate_league(SyntheticConfig::default());
        let b = generate_league(SyntheticConfig::default());
        assert_eq!(a.teams, b.teams);
        assert_eq!(a.fixtures, b.fixtures);
    }

    #[test]
    fn every_round_pairs_each_club_once() {
        let rounds = round_robin(6, 5);
        for pairs in rounds {
            let mut seen: Vec<usize> = pairs.iter().flat_map(|(h, a)| [*h, *a]).collect();
            seen.sort_unstable();
            assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn includes_a_blank_and_a_double() {
        let league = generate_league(SyntheticConfig::default());
        let moved = league
            .fixtures
            .iter()
            .find(|f| f.event == Some(13) && f.id <= 120)
            .expect("a fixture moved into gameweek 13");
        let doubles = league
            .fixtures
            .iter()
            .filter(|f| f.event == Some(13) && f.involves(moved.team_h))
            .count();
        assert_eq!(doubles, 2);
        assert_eq!(league.current_gameweek(), 10);
    }
}
