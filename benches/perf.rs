use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fdr_studio::attractiveness::calculate_attractiveness_score;
use fdr_studio::dynamic_fdr::LeagueContext;
use fdr_studio::fixture_matrix::{MatrixRequest, generate_fixture_matrix};
use fdr_studio::model::DifficultyType;
use fdr_studio::synthetic::{SyntheticConfig, generate_league};

fn request(mode: DifficultyType, current_gameweek: u32) -> MatrixRequest {
    MatrixRequest {
        first_gameweek: current_gameweek,
        number_of_gameweeks: 8,
        current_gameweek,
        difficulty_type: mode,
    }
}

fn bench_matrix_provider(c: &mut Criterion) {
    let league = generate_league(SyntheticConfig::default());
    let req = request(DifficultyType::Fpl, league.current_gameweek());
    c.bench_function("matrix_provider_8gw", |b| {
        b.iter(|| {
            let out = generate_fixture_matrix(
                black_box(&league.teams),
                black_box(&league.fixtures),
                req,
            );
            black_box(out.team_names.len());
        })
    });
}

fn bench_matrix_dynamic(c: &mut Criterion) {
    let league = generate_league(SyntheticConfig::default());
    let req = request(DifficultyType::Overall, league.current_gameweek());
    c.bench_function("matrix_dynamic_8gw", |b| {
        b.iter(|| {
            let out = generate_fixture_matrix(
                black_box(&league.teams),
                black_box(&league.fixtures),
                req,
            );
            black_box(out.provider_fallback);
        })
    });
}

fn bench_single_rating(c: &mut Criterion) {
    let league = generate_league(SyntheticConfig::default());
    let context = LeagueContext::new(&league.teams, &league.fixtures, league.current_gameweek());
    let (home, away) = (&league.teams[0], &league.teams[1]);
    c.bench_function("rate_one_side", |b| {
        b.iter(|| {
            let rating = context.rate(black_box(home), black_box(away), true).unwrap();
            black_box(rating.overall);
        })
    });
}

fn bench_attractiveness(c: &mut Criterion) {
    let league = generate_league(SyntheticConfig::default());
    let out = generate_fixture_matrix(
        &league.teams,
        &league.fixtures,
        request(DifficultyType::Fpl, league.current_gameweek()),
    );
    c.bench_function("attractiveness_all_teams", |b| {
        b.iter(|| {
            for row in black_box(&out.fixture_matrix) {
                black_box(calculate_attractiveness_score(row).total_score);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_matrix_provider,
    bench_matrix_dynamic,
    bench_single_rating,
    bench_attractiveness
);
criterion_main!(benches);
