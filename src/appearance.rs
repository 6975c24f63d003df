use chrono::{Duration, NaiveDate};

use crate::snapshot::{season_start_year, OverviewRow};

/// News-derived availability: how likely the player is to feature before `return_date`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Availability {
    pub chance: f64,
    pub return_date: NaiveDate,
}

impl Availability {
    pub fn fit(as_of: NaiveDate) -> Self {
        Self {
            chance: 1.0,
            return_date: as_of,
        }
    }

    /// Status codes: i = injured, u = unavailable (loan/transfer), d = doubtful,
    /// n = long-term absence, s = suspended. Anything else counts as fit.
    pub fn from_news(status: Option<&str>, chance_pct: Option<f64>, as_of: NaiveDate) -> Self {
        let code = status.map(|s| s.trim().to_ascii_lowercase()).unwrap_or_default();
        let weeks = match code.as_str() {
            "i" => 4,
            "u" => 52,
            "d" => 2,
            "n" => 15,
            "s" => 3,
            _ => return Self::fit(as_of),
        };
        let chance = chance_pct
            .filter(|c| c.is_finite())
            .map(|c| (c / 100.0).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        Self {
            chance,
            return_date: as_of + Duration::weeks(weeks),
        }
    }

    /// Multiplier applied to a fixture; unscheduled fixtures are assumed past the return.
    pub fn factor_for(&self, kickoff: Option<NaiveDate>) -> f64 {
        match kickoff {
            Some(day) if day < self.return_date => self.chance,
            _ => 1.0,
        }
    }
}

/// Summed over the current and previous season.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeasonAggregate {
    pub apps: u32,
    pub subs: u32,
    pub missed: u32,
    pub goals: u32,
}

impl SeasonAggregate {
    /// Folds overview rows for the current and previous season. A season that would
    /// push the combined appearances past `season_length` is left out, which keeps
    /// double-counted rows from transferred or promoted players from inflating the rate.
    pub fn from_overview(
        rows: &[&OverviewRow],
        current_season: i32,
        season_length: u32,
        games_played: u32,
    ) -> Self {
        let mut out = Self::default();
        for offset in 0..=1 {
            let (mut apps, mut subs, mut goals) = (0u32, 0u32, 0u32);
            let mut seen = false;
            for row in rows {
                if season_start_year(&row.season) != Some(current_season - offset) {
                    continue;
                }
                seen = true;
                apps = apps.saturating_add(row.apps);
                subs = subs.saturating_add(row.subs);
                goals = goals.saturating_add(row.goals);
            }
            if !seen {
                continue;
            }
            if out.apps.saturating_add(apps) > season_length {
                continue;
            }
            let window = if offset == 0 { games_played } else { season_length };
            out.apps += apps;
            out.subs = out.subs.saturating_add(subs);
            out.goals = out.goals.saturating_add(goals);
            out.missed = out.missed.saturating_add(window.saturating_sub(apps));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AppearanceRates {
    pub app_rate: f64,
    pub start_rate: f64,
    pub sub_rate: f64,
}

impl AppearanceRates {
    pub fn from_aggregate(agg: &SeasonAggregate) -> Self {
        let total = f64::from(agg.apps) + f64::from(agg.missed);
        if total <= 0.0 {
            return Self::default();
        }
        let starts = agg.apps.saturating_sub(agg.subs) as f64;
        Self {
            app_rate: agg.apps as f64 / total,
            start_rate: starts / total,
            sub_rate: agg.subs as f64 / total,
        }
    }
}
