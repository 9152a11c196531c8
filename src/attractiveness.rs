use serde::{Deserialize, Serialize};

use crate::confidence::round_to;
use crate::fixture_matrix::SingleFixture;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameweekScore {
    pub number_of_fixtures: usize,
    pub avg_difficulty: f64,
    /// Inverted difficulty before any multi-fixture bonus.
    pub raw_score: f64,
    pub dgw_bonus: f64,
    pub total_score: f64,
}

impl GameweekScore {
    fn blank() -> Self {
        Self {
            number_of_fixtures: 0,
            avg_difficulty: 0.0,
            raw_score: 0.0,
            dgw_bonus: 0.0,
            total_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub blanks: usize,
    pub singles: usize,
    pub doubles: usize,
    pub triples: usize,
    /// 1-based index into the window, 0 if nothing scored.
    pub best_gameweek: usize,
    pub worst_gameweek: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttractivenessResult {
    pub total_score: f64,
    pub avg_score: f64,
    pub gameweek_breakdown: Vec<GameweekScore>,
    pub summary: RunSummary,
}

/// Score a team's run of gameweeks; easier fixtures and busier weeks score higher.
pub fn calculate_attractiveness_score(run: &[Vec<SingleFixture>]) -> AttractivenessResult {
    let mut breakdown = Vec::with_capacity(run.len());
    let mut summary = RunSummary::default();
    let mut total = 0.0;
    let mut best_score = 0.0;
    let mut worst_score = f64::INFINITY;

    for (idx, cell) in run.iter().enumerate() {
        let valid: Vec<f64> = cell
            .iter()
            .map(|f| f.difficulty)
            .filter(|d| *d > 0.0)
            .collect();

        if valid.is_empty() {
            breakdown.push(GameweekScore::blank());
            summary.blanks += 1;
            if 0.0 < worst_score {
                worst_score = 0.0;
                summary.worst_gameweek = idx + 1;
            }
            continue;
        }

        let avg = valid.iter().sum::<f64>() / valid.len() as f64;
        let raw = difficulty_score(avg);
        let bonus = multi_fixture_bonus(valid.len(), avg);
        let gw_total = raw + bonus;

        breakdown.push(GameweekScore {
            number_of_fixtures: valid.len(),
            avg_difficulty: round_to(avg, 2),
            raw_score: round_to(raw, 2),
            dgw_bonus: round_to(bonus, 2),
            total_score: round_to(gw_total, 2),
        });
        total += gw_total;

        if gw_total > best_score {
            best_score = gw_total;
            summary.best_gameweek = idx + 1;
        }
        if gw_total < worst_score {
            worst_score = gw_total;
            summary.worst_gameweek = idx + 1;
        }

        match valid.len() {
            1 => summary.singles += 1,
            2 => summary.doubles += 1,
            _ => summary.triples += 1,
        }
    }

    let avg_score = if run.is_empty() {
        0.0
    } else {
        total / run.len() as f64
    };

    AttractivenessResult {
        total_score: round_to(total, 2),
        avg_score: round_to(avg_score, 2),
        gameweek_breakdown: breakdown,
        summary,
    }
}

/// 1 becomes 5, 5 becomes 1.
pub fn difficulty_score(avg_difficulty: f64) -> f64 {
    6.0 - avg_difficulty
}

/// Extra credit for double and triple gameweeks; even a hard double beats a
/// single fixture.
pub fn multi_fixture_bonus(num_fixtures: usize, avg_difficulty: f64) -> f64 {
    match num_fixtures {
        0 | 1 => 0.0,
        2 => {
            if avg_difficulty <= 2.5 {
                3.0
            } else if avg_difficulty <= 3.5 {
                2.0
            } else if avg_difficulty <= 4.0 {
                1.0
            } else {
                0.5
            }
        }
        _ => {
            if avg_difficulty <= 3.0 {
                5.0
            } else if avg_difficulty <= 4.0 {
                3.5
            } else {
                2.0
            }
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    if count > 1 {
        format!("{count} {word}s")
    } else {
        format!("{count} {word}")
    }
}

pub fn fixture_run_summary(result: &AttractivenessResult) -> String {
    let s = &result.summary;
    let mut parts = Vec::new();
    if s.doubles > 0 {
        parts.push(plural(s.doubles, "DGW"));
    }
    if s.triples > 0 {
        parts.push(plural(s.triples, "TGW"));
    }
    if s.blanks > 0 {
        parts.push(plural(s.blanks, "blank"));
    }
    if parts.is_empty() {
        format!("Score: {} ({} fixtures)", result.total_score, s.singles)
    } else {
        format!("Score: {} ({})", result.total_score, parts.join(", "))
    }
}

pub fn compare_fixture_runs(
    first: &AttractivenessResult,
    first_name: &str,
    second: &AttractivenessResult,
    second_name: &str,
) -> String {
    let diff = first.total_score - second.total_score;
    if diff.abs() < 0.5 {
        return format!("{first_name} and {second_name} have similar fixture attractiveness");
    }
    let (better, worse) = if diff > 0.0 {
        (first_name, second_name)
    } else {
        (second_name, first_name)
    };
    format!("{better} has better fixtures than {worse} (+{:.1})", diff.abs())
}
