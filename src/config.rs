use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

const BUNDLED_OVERRIDES: &str = include_str!("../assets/team_overrides.json");

/// Knobs of the forecasting model that are chosen, not fitted.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub season_length: u32,
    /// Start year of the season being forecast (2018 for "2018/2019").
    pub current_season: i32,
    pub home_advantage: f64,
    pub away_disadvantage: f64,
    /// Bonus awarded to BPS ranks 1, 2 and 3.
    pub bonus_awards: [f64; 3],
    /// Reference date for injury return estimates.
    pub as_of: NaiveDate,
}

impl ModelConfig {
    pub fn defaults(as_of: NaiveDate) -> Self {
        Self {
            season_length: 38,
            current_season: 2018,
            home_advantage: 0.05,
            away_disadvantage: 0.05,
            bonus_awards: [4.0, 3.0, 2.0],
            as_of,
        }
    }

    /// Defaults overlaid with any `FORECAST_*` variables present in the environment.
    pub fn from_env() -> Self {
        let as_of = env::var("FORECAST_AS_OF")
            .ok()
            .and_then(|raw| raw.trim().parse::<NaiveDate>().ok())
            .unwrap_or_else(|| Local::now().date_naive());
        let mut cfg = Self::defaults(as_of);

        if let Some(v) = env_parse::<u32>("FORECAST_SEASON_LENGTH") {
            cfg.season_length = v.max(1);
        }
        if let Some(v) = env_parse::<i32>("FORECAST_SEASON") {
            cfg.current_season = v;
        }
        if let Some(v) = env_parse::<f64>("FORECAST_HOME_ADVANTAGE") {
            cfg.home_advantage = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_parse::<f64>("FORECAST_AWAY_DISADVANTAGE") {
            cfg.away_disadvantage = v.clamp(0.0, 1.0);
        }
        cfg
    }

    pub fn bonus_for_rank(&self, rank: usize) -> f64 {
        match rank {
            1..=3 => self.bonus_awards[rank - 1],
            _ => 0.0,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.trim().parse::<T>().ok())
}

/// Hand-set team rates for clubs whose current-season sample is too thin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamOverride {
    #[serde(default)]
    pub concede_rate: Option<f64>,
    #[serde(default)]
    pub goal_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationTable {
    #[serde(default)]
    pub teams: HashMap<String, TeamOverride>,
}

impl CalibrationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookup(&self, team_label: &str) -> Option<&TeamOverride> {
        let key = team_label.trim();
        self.teams
            .get(key)
            .or_else(|| {
                self.teams
                    .iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
                    .map(|(_, o)| o)
            })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(raw).context("parse calibration table")?;
        Ok(table.sanitized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read calibration table {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse calibration table {}", path.display()))
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_OVERRIDES)
    }

    /// `FORECAST_CALIBRATION_PATH` when set and present, otherwise the bundled table.
    pub fn resolve() -> Result<Self> {
        if let Some(path) = calibration_path_override()
            && path.exists()
        {
            return Self::load(&path);
        }
        Self::bundled()
    }

    // Negative or non-finite overrides would poison the league baseline.
    fn sanitized(mut self) -> Self {
        for o in self.teams.values_mut() {
            o.concede_rate = o.concede_rate.filter(|v| v.is_finite() && *v >= 0.0);
            o.goal_rate = o.goal_rate.filter(|v| v.is_finite() && *v >= 0.0);
        }
        self
    }
}

fn calibration_path_override() -> Option<PathBuf> {
    env::var("FORECAST_CALIBRATION_PATH")
        .ok()
        .map(|s| PathBuf::from(s.trim()))
}
