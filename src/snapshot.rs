use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// Season totals for one player, as delivered by the stats collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRow {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Club string as printed by the stats source; may be noisy.
    #[serde(default)]
    pub team: String,
    #[serde(alias = "element_type")]
    pub position: u8,
    #[serde(default)]
    pub appearances: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub own_goals: u32,
    #[serde(default)]
    pub goals_conceded: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "chance_of_playing_next_round")]
    pub chance_of_playing: Option<f64>,
}

/// One line of a player's career overview (one club in one season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewRow {
    pub player_id: u32,
    /// e.g. "2017/2018"; only the leading year is used.
    pub season: String,
    #[serde(default)]
    pub apps: u32,
    #[serde(default)]
    pub subs: u32,
    #[serde(default)]
    pub goals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRow {
    pub id: u32,
    #[serde(alias = "team_h")]
    pub home_team: u32,
    #[serde(alias = "team_a")]
    pub away_team: u32,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub finished: bool,
}

impl FixtureRow {
    /// Kickoff calendar date; `None` when the fixture is not yet scheduled.
    pub fn kickoff_date(&self) -> ForecastResult<Option<NaiveDate>> {
        let Some(raw) = self.kickoff_time.as_deref() else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let day = trimmed.split('T').next().unwrap_or(trimmed);
        day.parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| ForecastError::InvalidKickoff {
                fixture_id: self.id,
                raw: raw.to_string(),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRow {
    pub team_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub player_ids: Vec<u32>,
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    #[serde(default)]
    pub players: Vec<PlayerRow>,
    #[serde(default)]
    pub overview: Vec<OverviewRow>,
    #[serde(default)]
    pub fixtures: Vec<FixtureRow>,
    #[serde(default)]
    pub rosters: Vec<RosterRow>,
}

impl LeagueSnapshot {
    pub fn overview_by_player(&self) -> HashMap<u32, Vec<&OverviewRow>> {
        let mut out: HashMap<u32, Vec<&OverviewRow>> = HashMap::new();
        for row in &self.overview {
            out.entry(row.player_id).or_default().push(row);
        }
        out
    }

    /// Finished fixtures per team id.
    pub fn games_played_by_team(&self) -> HashMap<u32, u32> {
        let mut out: HashMap<u32, u32> = HashMap::new();
        for f in self.fixtures.iter().filter(|f| f.finished) {
            *out.entry(f.home_team).or_insert(0) += 1;
            *out.entry(f.away_team).or_insert(0) += 1;
        }
        out
    }
}

pub fn parse_snapshot_json(raw: &str) -> Result<LeagueSnapshot> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(LeagueSnapshot::default());
    }
    serde_json::from_str(trimmed).context("invalid league snapshot json")
}

pub fn load_snapshot(path: &Path) -> Result<LeagueSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read league snapshot {}", path.display()))?;
    parse_snapshot_json(&raw).with_context(|| format!("parse league snapshot {}", path.display()))
}

/// Leading four-digit year of a season label such as "2017/2018".
pub fn season_start_year(label: &str) -> Option<i32> {
    let head = label.trim().get(..4)?;
    if !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    head.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(kickoff: Option<&str>) -> FixtureRow {
        FixtureRow {
            id: 7,
            home_team: 1,
            away_team: 2,
            kickoff_time: kickoff.map(str::to_string),
            finished: false,
        }
    }

    #[test]
    fn kickoff_date_takes_calendar_day() {
        let f = fixture(Some("2018-08-10T19:00:00Z"));
        assert_eq!(
            f.kickoff_date().unwrap(),
            NaiveDate::from_ymd_opt(2018, 8, 10)
        );
    }

    #[test]
    fn kickoff_missing_is_unscheduled() {
        assert_eq!(fixture(None).kickoff_date().unwrap(), None);
        assert_eq!(fixture(Some("  ")).kickoff_date().unwrap(), None);
    }

    #[test]
    fn kickoff_garbage_is_an_error() {
        let err = fixture(Some("next tuesday")).kickoff_date().unwrap_err();
        assert!(matches!(err, ForecastError::InvalidKickoff { fixture_id: 7, .. }));
    }

    #[test]
    fn season_start_year_parses_leading_digits() {
        assert_eq!(season_start_year("2017/2018"), Some(2017));
        assert_eq!(season_start_year(" 2018/19 "), Some(2018));
        assert_eq!(season_start_year("Total"), None);
        assert_eq!(season_start_year("20"), None);
    }

    #[test]
    fn null_snapshot_is_empty() {
        let snap = parse_snapshot_json("null").unwrap();
        assert!(snap.players.is_empty());
        assert!(snap.fixtures.is_empty());
    }

    #[test]
    fn fpl_style_aliases_are_accepted() {
        let raw = r#"{
            "players": [{"id": 1, "element_type": 3, "chance_of_playing_next_round": 75}],
            "fixtures": [{"id": 9, "team_h": 1, "team_a": 2, "finished": true}]
        }"#;
        let snap = parse_snapshot_json(raw).unwrap();
        assert_eq!(snap.players[0].position, 3);
        assert_eq!(snap.players[0].chance_of_playing, Some(75.0));
        assert_eq!(snap.fixtures[0].away_team, 2);
        assert_eq!(snap.games_played_by_team().get(&2), Some(&1));
    }
}
