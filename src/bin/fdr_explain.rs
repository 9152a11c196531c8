use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use fdr_studio::confidence::{confidence_message, volatility};
use fdr_studio::dynamic_fdr::LeagueContext;
use fdr_studio::form::form_summary;
use fdr_studio::model::{Fixture, Team};
use fdr_studio::synthetic::{SyntheticConfig, generate_league};

#[derive(Debug, serde::Deserialize)]
struct ExplainCase {
    /// Team id, short name or full name.
    home: String,
    away: String,
    teams: Vec<Team>,
    #[serde(default)]
    fixtures: Vec<Fixture>,
    #[serde(default = "default_is_home")]
    is_home: bool,
    #[serde(default)]
    current_gameweek: Option<u32>,
}

fn default_is_home() -> bool {
    true
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env");
    sensible_env_logger::init!();

    let case = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read case {}", path.display()))?;
            serde_json::from_str::<ExplainCase>(&raw).context("invalid case json")?
        }
        None => synthetic_case()?,
    };

    let gw = case.current_gameweek.unwrap_or_else(|| {
        case.fixtures
            .iter()
            .filter(|f| f.finished)
            .filter_map(|f| f.event)
            .max()
            .map_or(1, |last| last + 1)
    });

    let context = LeagueContext::new(&case.teams, &case.fixtures, gw);
    let home = find_team(context.teams(), &case.home)?;
    let away = find_team(context.teams(), &case.away)?;
    let fdr = context.rate(home, away, case.is_home)?;
    let (subject, opponent) = if case.is_home { (home, away) } else { (away, home) };

    println!("{} v {} (GW{})", home.name, away.name, context.current_gameweek());
    println!(
        "Rating {} facing {} {}",
        subject.short_name,
        opponent.short_name,
        if case.is_home { "at home" } else { "away" }
    );
    println!("Overall:   {:.2}", fdr.overall);
    println!("Attacking: {:.2}", fdr.attacking);
    println!("Defensive: {:.2}", fdr.defensive);
    println!(
        "Interval:  {:.2}-{:.2} ({:?} confidence)",
        fdr.confidence_interval.overall.0, fdr.confidence_interval.overall.1, fdr.confidence
    );
    println!(
        "           {}",
        confidence_message(
            fdr.confidence_interval.confidence_score,
            volatility(fdr.confidence_interval.overall)
        )
    );
    println!(
        "Weights:   base {:.2} season {:.2} form {:.2} home {:.2}",
        fdr.debug.weights.base,
        fdr.debug.weights.season,
        fdr.debug.weights.form,
        fdr.debug.weights.home
    );
    println!("Base:      {:.3}", fdr.debug.base_strength);
    println!("Season:    {:+.3}", fdr.adjustments.season_form);
    println!("Form:      {:+.3}", fdr.adjustments.recent_form);
    println!("Home adv:  {:+.3}", fdr.adjustments.home_advantage);
    if let Some(record) = context
        .performance()
        .iter()
        .find(|perf| perf.team_id == opponent.id)
    {
        println!(
            "{} season: {:.2} PPG over {} games (home {:.2}, away {:.2})",
            opponent.short_name,
            record.ppg,
            record.games_played,
            record.home_record.ppg,
            record.away_record.ppg
        );
    }
    println!(
        "{} form:  {}",
        opponent.short_name,
        form_summary(opponent.id, &case.fixtures)
    );

    Ok(())
}

fn find_team<'a>(teams: &'a [Team], key: &str) -> Result<&'a Team> {
    let key = key.trim();
    teams
        .iter()
        .find(|t| {
            t.id.to_string() == key
                || t.short_name.eq_ignore_ascii_case(key)
                || t.name.eq_ignore_ascii_case(key)
        })
        .with_context(|| format!("no team matches {key:?}"))
}

/// First unplayed fixture of the synthetic league.
fn synthetic_case() -> Result<ExplainCase> {
    let league = generate_league(SyntheticConfig::default());
    let gw = league.current_gameweek();
    let fixture = league
        .fixtures
        .iter()
        .find(|f| f.event == Some(gw))
        .context("synthetic league has no fixture in the current gameweek")?;
    Ok(ExplainCase {
        home: fixture.team_h.to_string(),
        away: fixture.team_a.to_string(),
        is_home: true,
        current_gameweek: Some(gw),
        teams: league.teams,
        fixtures: league.fixtures,
    })
}
