//! Fixture difficulty ratings, fixture matrices and fixture-run attractiveness
//! for a fantasy football league.
//!
//! The usual entry point is [`fixture_matrix::generate_fixture_matrix`], which
//! rates every fixture in a gameweek window (in parallel on the compute pool)
//! and scores each team's run of fixtures.

pub mod attractiveness;
pub mod compute_pool;
pub mod confidence;
pub mod dynamic_fdr;
pub mod fixture_matrix;
pub mod fixture_table;
pub mod form;
pub mod league_comparator;
pub mod model;
pub mod season_performance;
pub mod snapshot;
pub mod synthetic;
pub mod weights;

pub use dynamic_fdr::{EnhancedFdrResult, LeagueContext, calculate_dynamic_fdr};
pub use fixture_matrix::{
    FixtureMatrixResult, MatrixRequest, SingleFixture, generate_fixture_matrix,
};
pub use model::{DifficultyType, Fixture, Gameweek, Team};
