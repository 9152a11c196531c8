use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use fdr_studio::attractiveness::fixture_run_summary;
use fdr_studio::fixture_matrix::{
    FixtureCell, FixtureMatrixResult, MatrixRequest, generate_fixture_matrix,
};
use fdr_studio::fixture_table::{
    GridRow, SortConfig, SortDirection, SortKey, build_grid_rows, effective_window, filter_rows,
    gameweek_options, sort_rows, team_average_by_name,
};
use fdr_studio::model::DifficultyType;
use fdr_studio::snapshot::{Snapshot, load_snapshot};
use fdr_studio::synthetic::{SyntheticConfig, generate_league};

const DEFAULT_WINDOW: u32 = 6;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    sensible_env_logger::init!();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let snapshot = load_input(&args)?;
    if snapshot.teams.is_empty() {
        bail!("snapshot has no teams");
    }

    let current_gameweek = match arg_value(&args, "--gw") {
        Some(raw) => raw.parse::<u32>().context("--gw must be a gameweek number")?,
        None => snapshot.current_gameweek(),
    };
    let first_gameweek = match arg_value(&args, "--first") {
        Some(raw) => raw.parse::<u32>().context("--first must be a gameweek number")?,
        None => current_gameweek,
    };
    let requested = match arg_value(&args, "--window") {
        Some(raw) => raw.parse::<u32>().context("--window must be a number")?,
        None => DEFAULT_WINDOW,
    };
    let max_gameweek = snapshot.max_gameweek();
    let window = effective_window(first_gameweek, requested, max_gameweek);
    log::debug!(
        "window options from GW{first_gameweek}: {:?}",
        gameweek_options(first_gameweek, window, max_gameweek)
    );
    let difficulty_type = arg_value(&args, "--mode")
        .map(|raw| parse_mode(&raw))
        .unwrap_or_default();

    let request = MatrixRequest {
        first_gameweek,
        number_of_gameweeks: window,
        current_gameweek,
        difficulty_type,
    };
    log::info!(
        "{} teams, {} fixtures, gameweeks {}..{} ({})",
        snapshot.teams.len(),
        snapshot.fixtures.len(),
        first_gameweek,
        first_gameweek.saturating_add(window),
        difficulty_type
    );
    let result = generate_fixture_matrix(&snapshot.teams, &snapshot.fixtures, request);

    if has_flag(&args, "--json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let selected = arg_value(&args, "--teams")
        .map(|raw| {
            raw.split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let mut sort = match arg_value(&args, "--sort").as_deref() {
        Some("team") => SortConfig::default(),
        _ => SortConfig {
            key: SortKey::Score,
            direction: SortDirection::Descending,
        },
    };
    if has_flag(&args, "--reverse") {
        sort = sort.toggle(sort.key);
    }
    let mut rows = filter_rows(build_grid_rows(&result, window as usize), &selected);
    sort_rows(&mut rows, sort);
    print_table(&result, &rows, request);
    Ok(())
}

fn parse_mode(raw: &str) -> DifficultyType {
    if raw.parse::<DifficultyType>().is_err() {
        let known: Vec<&str> = DifficultyType::ALL.iter().map(|mode| mode.as_str()).collect();
        log::warn!("unknown mode {raw:?} (expected one of {known:?}), using overall");
    }
    DifficultyType::parse_or_default(raw)
}

fn load_input(args: &[String]) -> Result<Snapshot> {
    let seed = synthetic_seed(args)?;
    let bootstrap = arg_value(args, "--bootstrap").map(PathBuf::from);
    let fixtures = arg_value(args, "--fixtures").map(PathBuf::from);
    let wants_synthetic = seed.is_some() || has_flag(args, "--synthetic");
    match (bootstrap, fixtures) {
        (Some(bootstrap), Some(fixtures)) if !wants_synthetic => {
            load_snapshot(&bootstrap, &fixtures)
        }
        (None, None) | (Some(_), Some(_)) => {
            let mut config = SyntheticConfig::default();
            if let Some(seed) = seed {
                config.seed = seed;
            }
            log::info!("using synthetic league (seed {})", config.seed);
            Ok(generate_league(config))
        }
        _ => bail!("--bootstrap and --fixtures must be given together"),
    }
}

fn synthetic_seed(args: &[String]) -> Result<Option<u64>> {
    for arg in args {
        if let Some(raw) = arg.strip_prefix("--synthetic=") {
            let seed = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid synthetic seed {raw:?}"))?;
            return Ok(Some(seed));
        }
    }
    Ok(None)
}

fn print_table(result: &FixtureMatrixResult, rows: &[GridRow], request: MatrixRequest) {
    let index: HashMap<&str, usize> = result
        .team_names
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    println!(
        "{} difficulty, GW{}-GW{}",
        request.difficulty_type.display_name(),
        request.first_gameweek,
        request
            .first_gameweek
            .saturating_add(request.number_of_gameweeks.saturating_sub(1))
    );
    if result.provider_fallback {
        println!("(dynamic ratings unavailable, showing provider ratings)");
    }
    let per_gameweek = team_average_by_name(rows, request.number_of_gameweeks);
    for (rank, row) in rows.iter().enumerate() {
        let Some(&idx) = index.get(row.team.as_str()) else {
            continue;
        };
        let cells = row
            .fixtures
            .iter()
            .map(format_cell)
            .collect::<Vec<_>>()
            .join(" | ");
        println!(
            "{:>2}. {:<16} fdr {:>4.2}  per gw {:>4.2}  {:<36} {}",
            rank + 1,
            row.team,
            result.averages.get(idx).copied().unwrap_or(0.0),
            per_gameweek.get(&row.team).copied().unwrap_or(0.0),
            result
                .attractiveness
                .get(idx)
                .map(fixture_run_summary)
                .unwrap_or_default(),
            cells
        );
    }

    let totals = result.team_total_scores();
    let averages = result.team_average_scores();
    if !totals.is_empty() {
        let teams = totals.len() as f64;
        println!(
            "League mean: {:.2} total, {:.2} per gameweek",
            totals.iter().sum::<f64>() / teams,
            averages.iter().sum::<f64>() / teams
        );
    }
}

fn format_cell(cell: &FixtureCell) -> String {
    cell.iter()
        .map(|entry| {
            if entry.is_blank() {
                entry.label.clone()
            } else {
                format!("{} {:.1}", entry.label, entry.difficulty)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
