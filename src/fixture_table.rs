use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::fixture_matrix::{FixtureCell, FixtureMatrixResult};

const WINDOW_CANDIDATES: [u32; 8] = [4, 5, 6, 8, 10, 12, 15, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Team,
    Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Team,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Clicking the active column flips direction; a new column starts ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            let direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
            Self { key, direction }
        } else {
            Self {
                key,
                direction: SortDirection::Ascending,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub team: String,
    pub fixtures: Vec<FixtureCell>,
    pub score: f64,
    pub gameweek_scores: Vec<f64>,
}

/// Rows in team order, truncated to `window` gameweeks.
pub fn build_grid_rows(result: &FixtureMatrixResult, window: usize) -> Vec<GridRow> {
    result
        .team_names
        .iter()
        .enumerate()
        .map(|(idx, team)| {
            let fixtures: Vec<FixtureCell> = result
                .fixture_matrix
                .get(idx)
                .map(|row| row.iter().take(window).cloned().collect())
                .unwrap_or_default();
            let gameweek_scores: Vec<f64> = result
                .gameweek_attractiveness_matrix
                .get(idx)
                .map(|row| row.iter().take(window).copied().collect())
                .unwrap_or_default();
            GridRow {
                team: team.clone(),
                fixtures,
                score: gameweek_scores.iter().sum(),
                gameweek_scores,
            }
        })
        .collect()
}

/// Keep only the named teams; an empty selection keeps everything.
pub fn filter_rows(rows: Vec<GridRow>, selected: &[String]) -> Vec<GridRow> {
    if selected.is_empty() {
        return rows;
    }
    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    rows.into_iter()
        .filter(|row| wanted.contains(row.team.as_str()))
        .collect()
}

pub fn sort_rows(rows: &mut [GridRow], config: SortConfig) {
    rows.sort_by(|a, b| {
        let ord = match config.key {
            SortKey::Team => a.team.cmp(&b.team),
            SortKey::Score => a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal),
        };
        match config.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Clamp a requested window so it never runs past the last gameweek.
pub fn effective_window(first_gameweek: u32, requested: u32, max_gameweek: u32) -> u32 {
    let remaining = max_gameweek.saturating_add(1).saturating_sub(first_gameweek);
    requested.clamp(1, remaining.max(1))
}

/// Window sizes offered for `first_gameweek`, always including the current one.
pub fn gameweek_options(first_gameweek: u32, effective: u32, max_gameweek: u32) -> Vec<u32> {
    let remaining = max_gameweek.saturating_add(1).saturating_sub(first_gameweek);
    let mut options = BTreeSet::new();
    options.insert(effective);
    for value in WINDOW_CANDIDATES {
        if value <= remaining {
            options.insert(value);
        }
    }
    options.into_iter().collect()
}

pub fn team_average_by_name(rows: &[GridRow], window: u32) -> BTreeMap<String, f64> {
    let divisor = window.max(1) as f64;
    rows.iter()
        .map(|row| (row.team.clone(), row.score / divisor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team: &str, score: f64) -> GridRow {
        GridRow {
            team: team.to_string(),
            fixtures: Vec::new(),
            score,
            gameweek_scores: vec![score],
        }
    }

    #[test]
    fn toggle_flips_same_key() {
        let cfg = SortConfig::default().toggle(SortKey::Team);
        assert_eq!(cfg.direction, SortDirection::Descending);
        let cfg = cfg.toggle(SortKey::Score);
        assert_eq!(
            cfg,
            SortConfig {
                key: SortKey::Score,
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn sorts_by_score_descending() {
        let mut rows = vec![row("ARS", 4.0), row("CHE", 7.5), row("LIV", 5.0)];
        sort_rows(
            &mut rows,
            SortConfig {
                key: SortKey::Score,
                direction: SortDirection::Descending,
            },
        );
        let order: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["CHE", "LIV", "ARS"]);
    }

    #[test]
    fn filter_keeps_selected() {
        let rows = vec![row("ARS", 1.0), row("CHE", 2.0)];
        let kept = filter_rows(rows.clone(), &["CHE".to_string()]);
        assert_eq!(kept.len(), 1);
        assert_eq!(filter_rows(rows, &[]).len(), 2);
    }

    #[test]
    fn window_is_clamped_to_season_end() {
        assert_eq!(effective_window(35, 8, 38), 4);
        assert_eq!(effective_window(1, 0, 38), 1);
        assert_eq!(effective_window(40, 5, 38), 1);
        assert_eq!(gameweek_options(33, 6, 38), vec![4, 5, 6]);
        assert_eq!(gameweek_options(36, 3, 38), vec![3]);
    }

    #[test]
    fn window_helpers_survive_extreme_gameweeks() {
        assert_eq!(effective_window(1, 6, u32::MAX), 6);
        assert_eq!(effective_window(u32::MAX, 6, u32::MAX), 1);
        assert_eq!(gameweek_options(u32::MAX, 1, u32::MAX), vec![1]);
    }
}
