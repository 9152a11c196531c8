use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::model::{Fixture, Gameweek, Team};

/// The subset of the provider's bootstrap payload the engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bootstrap {
    pub teams: Vec<Team>,
    #[serde(default)]
    pub events: Vec<Gameweek>,
}

/// A trusted, complete input set for one request.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
    pub events: Vec<Gameweek>,
}

impl Snapshot {
    pub fn current_gameweek(&self) -> u32 {
        current_gameweek(&self.events)
    }

    pub fn max_gameweek(&self) -> u32 {
        let from_events = self.events.iter().map(|e| e.id).max();
        let from_fixtures = self.fixtures.iter().filter_map(|f| f.event).max();
        from_events.or(from_fixtures).unwrap_or(0)
    }
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap> {
    let trimmed = raw.trim();
    ensure!(!trimmed.is_empty(), "empty bootstrap payload");
    serde_json::from_str(trimmed).context("invalid bootstrap json")
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    ensure!(!trimmed.is_empty(), "empty fixtures payload");
    serde_json::from_str(trimmed).context("invalid fixtures json")
}

pub fn load_snapshot(bootstrap_path: &Path, fixtures_path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(bootstrap_path)
        .with_context(|| format!("read bootstrap {}", bootstrap_path.display()))?;
    let bootstrap = parse_bootstrap_json(&raw)?;
    let raw = fs::read_to_string(fixtures_path)
        .with_context(|| format!("read fixtures {}", fixtures_path.display()))?;
    let fixtures = parse_fixtures_json(&raw)?;

    Ok(Snapshot {
        teams: bootstrap.teams,
        fixtures,
        events: bootstrap.events,
    })
}

/// The gameweek in play: the flagged current one, else the next, else the one
/// after the last finished, else 1.
pub fn current_gameweek(events: &[Gameweek]) -> u32 {
    if let Some(gw) = events.iter().find(|e| e.is_current) {
        return gw.id;
    }
    if let Some(gw) = events.iter().find(|e| e.is_next) {
        return gw.id;
    }
    events
        .iter()
        .filter(|e| e.finished)
        .map(|e| e.id + 1)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_shapes() {
        let bootstrap = r#"{
            "teams": [{
                "id": 1, "name": "Arsenal", "short_name": "ARS", "code": 3, "strength": 4,
                "strength_overall_home": 1300, "strength_overall_away": 1320,
                "strength_attack_home": 1250, "strength_attack_away": 1290,
                "strength_defence_home": 1340, "strength_defence_away": 1350,
                "form": null, "pulse_id": 1, "played": 0
            }],
            "events": [
                {"id": 1, "name": "Gameweek 1", "finished": true, "is_current": false, "is_next": false},
                {"id": 2, "name": "Gameweek 2", "finished": false, "is_current": false, "is_next": true}
            ],
            "elements": []
        }"#;
        let parsed = parse_bootstrap_json(bootstrap).unwrap();
        assert_eq!(parsed.teams[0].short_name, "ARS");
        assert_eq!(parsed.teams[0].strength_defence_away, 1350.0);
        assert_eq!(current_gameweek(&parsed.events), 2);

        let fixtures = r#"[{
            "id": 7, "event": null, "team_h": 1, "team_a": 2,
            "team_h_difficulty": 3, "team_a_difficulty": 4,
            "kickoff_time": null, "started": false, "finished": false,
            "team_h_score": null, "team_a_score": null, "stats": []
        }]"#;
        let parsed = parse_fixtures_json(fixtures).unwrap();
        assert_eq!(parsed[0].event, None);
        assert_eq!(parsed[0].team_a_difficulty, 4);
    }

    #[test]
    fn current_gameweek_fallbacks() {
        let gw = |id, finished| Gameweek {
            id,
            name: String::new(),
            deadline_time: None,
            is_current: false,
            is_next: false,
            finished,
        };
        assert_eq!(current_gameweek(&[]), 1);
        assert_eq!(current_gameweek(&[gw(1, true), gw(2, true), gw(3, false)]), 3);
    }

    #[test]
    fn empty_payload_is_an_error() {
        assert!(parse_fixtures_json("  ").is_err());
    }
}
