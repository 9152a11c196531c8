use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A club as published in the provider's bootstrap payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub strength: u32,
    pub strength_overall_home: f64,
    pub strength_overall_away: f64,
    pub strength_attack_home: f64,
    pub strength_attack_away: f64,
    pub strength_defence_home: f64,
    pub strength_defence_away: f64,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub pulse_id: u32,
}

impl Team {
    pub fn average_overall_strength(&self) -> f64 {
        (self.strength_overall_home + self.strength_overall_away) / 2.0
    }

    pub fn strength_values(&self) -> [f64; 6] {
        [
            self.strength_overall_home,
            self.strength_overall_away,
            self.strength_attack_home,
            self.strength_attack_away,
            self.strength_defence_home,
            self.strength_defence_away,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
}

impl Fixture {
    pub fn involves(&self, team_id: u32) -> bool {
        self.team_h == team_id || self.team_a == team_id
    }

    pub fn opponent_of(&self, team_id: u32) -> u32 {
        if self.team_h == team_id {
            self.team_a
        } else {
            self.team_h
        }
    }

    /// Finished with both scores recorded.
    pub fn is_scored(&self) -> bool {
        self.finished && self.team_h_score.is_some() && self.team_a_score.is_some()
    }

    /// Goals (for, against) from `team_id`'s side, only once the result is in.
    pub fn goals_for_against(&self, team_id: u32) -> Option<(u32, u32)> {
        if !self.is_scored() {
            return None;
        }
        let home = self.team_h_score?;
        let away = self.team_a_score?;
        if self.team_h == team_id {
            Some((home, away))
        } else {
            Some((away, home))
        }
    }

    pub fn provider_difficulty(&self, is_home: bool) -> u8 {
        if is_home {
            self.team_h_difficulty
        } else {
            self.team_a_difficulty
        }
    }

    /// Gameweek number, with unscheduled fixtures treated as 0.
    pub fn event_or_zero(&self) -> u32 {
        self.event.unwrap_or(0)
    }

    /// Kickoff as epoch milliseconds. Missing or unparseable kickoffs map to 0.
    pub fn kickoff_millis(&self) -> i64 {
        self.kickoff_time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0)
    }
}

/// Points for a single result: 3 for a win, 1 for a draw.
pub fn result_points(goals_for: u32, goals_against: u32) -> u32 {
    if goals_for > goals_against {
        3
    } else if goals_for == goals_against {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gameweek {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default, alias = "is_finished")]
    pub finished: bool,
}

/// Which difficulty source the fixture grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyType {
    Fpl,
    #[default]
    Overall,
    Attack,
    Defence,
}

impl DifficultyType {
    pub const ALL: [DifficultyType; 4] = [
        DifficultyType::Fpl,
        DifficultyType::Overall,
        DifficultyType::Attack,
        DifficultyType::Defence,
    ];

    pub fn is_dynamic(self) -> bool {
        !matches!(self, DifficultyType::Fpl)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DifficultyType::Fpl => "FPL Difficulty",
            DifficultyType::Overall => "Studio Overall",
            DifficultyType::Attack => "Studio Attack",
            DifficultyType::Defence => "Studio Defence",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyType::Fpl => "fpl",
            DifficultyType::Overall => "overall",
            DifficultyType::Attack => "attack",
            DifficultyType::Defence => "defence",
        }
    }

    /// Lenient parse used for query strings and CLI flags; anything unknown is `Overall`.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for DifficultyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fpl" => Ok(DifficultyType::Fpl),
            "overall" => Ok(DifficultyType::Overall),
            "attack" => Ok(DifficultyType::Attack),
            "defence" | "defense" => Ok(DifficultyType::Defence),
            other => Err(anyhow::anyhow!("unknown difficulty type: {other}")),
        }
    }
}

impl fmt::Display for DifficultyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
