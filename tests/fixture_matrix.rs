use std::path::PathBuf;

use fdr_studio::fixture_matrix::{MatrixRequest, generate_fixture_matrix};
use fdr_studio::fixture_table::{SortConfig, SortDirection, SortKey, build_grid_rows, sort_rows};
use fdr_studio::model::DifficultyType;
use fdr_studio::snapshot::{Snapshot, load_snapshot};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn snapshot() -> Snapshot {
    load_snapshot(&fixture_path("bootstrap.json"), &fixture_path("fixtures.json"))
        .expect("fixture snapshot should load")
}

fn request(mode: DifficultyType) -> MatrixRequest {
    MatrixRequest {
        first_gameweek: 3,
        number_of_gameweeks: 2,
        current_gameweek: 3,
        difficulty_type: mode,
    }
}

#[test]
fn loads_snapshot_fixture() {
    let snap = snapshot();
    assert_eq!(snap.teams.len(), 4);
    assert_eq!(snap.fixtures.len(), 9);
    assert_eq!(snap.current_gameweek(), 3);
    assert_eq!(snap.max_gameweek(), 4);
}

#[test]
fn provider_grid_matches_published_ratings() {
    let snap = snapshot();
    let out = generate_fixture_matrix(&snap.teams, &snap.fixtures, request(DifficultyType::Fpl));

    assert_eq!(out.team_names, vec!["Arsenal", "Chelsea", "Liverpool", "Man City"]);
    assert_eq!(out.fixture_matrix.len(), 4);
    assert!(out.fixture_matrix.iter().all(|row| row.len() == 2));

    let ars = &out.fixture_matrix[0];
    assert_eq!(ars[0][0].label, "LIV (H)");
    assert_eq!(ars[0][0].difficulty, 5.0);
    // Double gameweek, earlier kickoff first even though it is listed second.
    let labels: Vec<&str> = ars[1].iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["CHE (A)", "MCI (H)"]);
    assert_eq!(ars[1][0].difficulty, 3.0);
    assert_eq!(ars[1][1].difficulty, 4.0);
    assert_eq!(out.averages[0], 4.0);

    let score = &out.attractiveness[0];
    assert_eq!(score.gameweek_breakdown[0].total_score, 1.0);
    assert_eq!(score.gameweek_breakdown[1].dgw_bonus, 2.0);
    assert_eq!(score.gameweek_breakdown[1].total_score, 4.5);
    assert_eq!(score.total_score, 5.5);
    assert_eq!(out.gameweek_attractiveness_matrix[0], vec![1.0, 4.5]);
    assert_eq!(ars[1][0].attractiveness_score, Some(4.5));
}

#[test]
fn blank_gameweek_serializes_as_placeholder() {
    let snap = snapshot();
    let out = generate_fixture_matrix(
        &snap.teams,
        &snap.fixtures,
        request(DifficultyType::Overall),
    );
    let liv = &out.fixture_matrix[2];
    assert_eq!(liv[1].len(), 1);
    assert!(liv[1][0].is_blank());
    assert_eq!(out.averages[2], liv[0][0].difficulty);

    let json = serde_json::to_value(&out).expect("result serializes");
    let blank = &json["fixtureMatrix"][2][1][0];
    assert_eq!(blank["difficulty"].as_f64(), Some(0.0));
    assert_eq!(blank["opponentName"], "Blank");
    assert_eq!(blank["gameweekId"], 4);
    assert!(blank.get("fixtureId").is_none());
    assert!(blank.get("attractivenessScore").is_none());
    assert_eq!(json["difficultyType"], "overall");
}

#[test]
fn unscheduled_fixtures_never_appear() {
    let snap = snapshot();
    let out = generate_fixture_matrix(
        &snap.teams,
        &snap.fixtures,
        MatrixRequest {
            first_gameweek: 1,
            number_of_gameweeks: 4,
            current_gameweek: 3,
            difficulty_type: DifficultyType::Fpl,
        },
    );
    let ids: Vec<u32> = out
        .fixture_matrix
        .iter()
        .flatten()
        .flatten()
        .filter_map(|e| e.fixture_id)
        .collect();
    assert!(!ids.contains(&9));
    assert!(ids.contains(&1));
}

#[test]
fn dynamic_grid_is_deterministic() {
    let snap = snapshot();
    for mode in [DifficultyType::Overall, DifficultyType::Attack, DifficultyType::Defence] {
        let first = generate_fixture_matrix(&snap.teams, &snap.fixtures, request(mode));
        let second = generate_fixture_matrix(&snap.teams, &snap.fixtures, request(mode));
        assert_eq!(first, second);
        assert!(!first.provider_fallback);
        for entry in first.fixture_matrix.iter().flatten().flatten() {
            if entry.is_blank() {
                continue;
            }
            assert!((1.0..=5.0).contains(&entry.difficulty));
            let (lo, hi) = entry.confidence_interval.expect("dynamic entries carry an interval");
            assert!(lo <= hi);
        }
    }
}

#[test]
fn grid_rows_rank_by_score() {
    let snap = snapshot();
    let out = generate_fixture_matrix(&snap.teams, &snap.fixtures, request(DifficultyType::Fpl));
    let mut rows = build_grid_rows(&out, 2);
    sort_rows(
        &mut rows,
        SortConfig {
            key: SortKey::Score,
            direction: SortDirection::Descending,
        },
    );
    assert_eq!(rows[0].team, "Arsenal");
    assert_eq!(rows.last().map(|r| r.team.as_str()), Some("Liverpool"));
}
