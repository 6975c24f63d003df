use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::CalibrationTable;
use crate::player::PlayerRecord;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Rate {
    Known(f64),
    Unknown,
}

impl Rate {
    // Zero, negative and non-finite values are all treated as no data.
    pub fn from_estimate(v: f64) -> Self {
        if v.is_finite() && v > 0.0 {
            Rate::Known(v)
        } else {
            Rate::Unknown
        }
    }

    pub fn known(self) -> Option<f64> {
        match self {
            Rate::Known(v) => Some(v),
            Rate::Unknown => None,
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Known(v) => write!(f, "{v:.3}"),
            Rate::Unknown => write!(f, "n/a"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Squad {
    pub team_id: u32,
    pub name: String,
    roster: Vec<Arc<PlayerRecord>>,
    by_position: BTreeMap<Position, Vec<Arc<PlayerRecord>>>,
    team_label: String,
    concede_rate: Rate,
    goal_rate: Rate,
}

impl Squad {
    pub fn new(
        team_id: u32,
        name: String,
        roster: Vec<Arc<PlayerRecord>>,
        calibration: &CalibrationTable,
    ) -> Self {
        let mut by_position: BTreeMap<Position, Vec<Arc<PlayerRecord>>> = BTreeMap::new();
        for p in &roster {
            by_position.entry(p.position).or_default().push(Arc::clone(p));
        }
        let team_label = majority_team_label(&roster).unwrap_or_else(|| name.clone());

        let mut concede_rate = estimate_concede_rate(&roster);
        let mut goal_rate = estimate_goal_rate(&roster);
        if let Some(o) = calibration.lookup(&team_label) {
            if let Some(v) = o.concede_rate {
                concede_rate = Rate::from_estimate(v);
            }
            if let Some(v) = o.goal_rate {
                goal_rate = Rate::from_estimate(v);
            }
        }

        Self {
            team_id,
            name,
            roster,
            by_position,
            team_label,
            concede_rate,
            goal_rate,
        }
    }

    pub fn roster(&self) -> &[Arc<PlayerRecord>] {
        &self.roster
    }

    pub fn players_at(&self, position: Position) -> &[Arc<PlayerRecord>] {
        self.by_position
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn team_label(&self) -> &str {
        &self.team_label
    }

    pub fn concede_rate(&self) -> Rate {
        self.concede_rate
    }

    pub fn goal_rate(&self) -> Rate {
        self.goal_rate
    }
}

// Ties go to whichever label appeared first.
fn majority_team_label(roster: &[Arc<PlayerRecord>]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for p in roster {
        let label = p.team.trim();
        if label.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((label, n));
        }
    }
    best.map(|(l, _)| l.to_string())
}

// Appearance-weighted mean of the back line's concede rates. Falls back to the plain
// mean of nonzero rates when weights are all zero or the weighted figure lands
// outside the observed range.
fn estimate_concede_rate(roster: &[Arc<PlayerRecord>]) -> Rate {
    let samples: Vec<(f64, f64)> = roster
        .iter()
        .filter_map(|p| p.concede_per_match().map(|r| (r, p.app_rate())))
        .collect();
    let nonzero: Vec<f64> = samples
        .iter()
        .map(|(r, _)| *r)
        .filter(|r| *r > 0.0)
        .collect();
    if nonzero.is_empty() {
        return Rate::Unknown;
    }
    let mean = nonzero.iter().sum::<f64>() / nonzero.len() as f64;
    let total_weight: f64 = samples.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return Rate::from_estimate(mean);
    }

    let estimate: f64 = samples.iter().map(|(r, w)| r * w / total_weight).sum();
    let lo = nonzero.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = nonzero.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if estimate < lo || estimate > hi {
        return Rate::from_estimate(mean);
    }
    Rate::from_estimate(estimate)
}

fn estimate_goal_rate(roster: &[Arc<PlayerRecord>]) -> Rate {
    let sum: f64 = roster
        .iter()
        .map(|p| p.goals_per_match() * p.app_rate())
        .sum();
    Rate::from_estimate(sum)
}
