use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CalibrationTable, ModelConfig};
use crate::error::ForecastResult;
use crate::match_sim::{simulate_fixture, LeagueBaseline, MatchOutcome};
use crate::player::PlayerRecord;
use crate::snapshot::{FixtureRow, LeagueSnapshot};
use crate::squad::{Rate, Squad};

/// Builds a record for every rostered player. Players without a roster entry have
/// no fixtures and are left out.
pub fn build_players(
    snapshot: &LeagueSnapshot,
    cfg: &ModelConfig,
) -> ForecastResult<HashMap<u32, Arc<PlayerRecord>>> {
    let team_of: HashMap<u32, u32> = snapshot
        .rosters
        .iter()
        .flat_map(|r| r.player_ids.iter().map(move |pid| (*pid, r.team_id)))
        .collect();
    let games_played = snapshot.games_played_by_team();
    let overview = snapshot.overview_by_player();

    let mut out = HashMap::with_capacity(snapshot.players.len());
    let mut unrostered = 0usize;
    for row in &snapshot.players {
        let Some(team_id) = team_of.get(&row.id) else {
            unrostered += 1;
            continue;
        };
        let played = games_played.get(team_id).copied().unwrap_or(0);
        let history = overview.get(&row.id).map(Vec::as_slice).unwrap_or(&[]);
        let record = PlayerRecord::from_row(row, history, played, cfg)?;
        out.insert(row.id, Arc::new(record));
    }
    if unrostered > 0 {
        debug!(unrostered, "players without a roster entry skipped");
    }
    Ok(out)
}

pub fn build_squads(
    snapshot: &LeagueSnapshot,
    players: &HashMap<u32, Arc<PlayerRecord>>,
    calibration: &CalibrationTable,
) -> BTreeMap<u32, Squad> {
    let mut squads = BTreeMap::new();
    for roster in &snapshot.rosters {
        let mut members = Vec::with_capacity(roster.player_ids.len());
        for pid in &roster.player_ids {
            match players.get(pid) {
                Some(p) => members.push(Arc::clone(p)),
                None => warn!(team_id = roster.team_id, player_id = *pid, "rostered player has no stats row"),
            }
        }
        let name = roster
            .name
            .clone()
            .unwrap_or_else(|| format!("team-{}", roster.team_id));
        let squad = Squad::new(roster.team_id, name, members, calibration);
        debug!(
            team_id = squad.team_id,
            team = squad.team_label(),
            concede = %squad.concede_rate(),
            goals = %squad.goal_rate(),
            "squad built"
        );
        squads.insert(roster.team_id, squad);
    }
    squads
}

/// Predicts every unfinished fixture in the snapshot.
pub fn run_forecast(
    snapshot: &LeagueSnapshot,
    cfg: &ModelConfig,
    calibration: &CalibrationTable,
) -> ForecastResult<Forecast> {
    let players = build_players(snapshot, cfg)?;
    let squads = build_squads(snapshot, &players, calibration);
    let baseline = LeagueBaseline::from_squads(squads.values())?;

    let mut pending: Vec<(&FixtureRow, Option<NaiveDate>)> = Vec::new();
    for fixture in snapshot.fixtures.iter().filter(|f| !f.finished) {
        if fixture.home_team == fixture.away_team {
            warn!(
                fixture_id = fixture.id,
                team = fixture.home_team,
                "fixture pits a team against itself; skipped"
            );
            continue;
        }
        if !squads.contains_key(&fixture.home_team) || !squads.contains_key(&fixture.away_team) {
            warn!(
                fixture_id = fixture.id,
                home = fixture.home_team,
                away = fixture.away_team,
                "fixture references a team without a roster; skipped"
            );
            continue;
        }
        let kickoff = fixture.kickoff_date()?;
        pending.push((fixture, kickoff));
    }
    pending.sort_by_key(|(f, _)| f.id);

    // Squads and the baseline are read-only from here, so fixtures are independent.
    let outcomes: Vec<MatchOutcome> = pending
        .par_iter()
        .filter_map(|(fixture, kickoff)| {
            let home = squads.get(&fixture.home_team)?;
            let away = squads.get(&fixture.away_team)?;
            Some(simulate_fixture(fixture.id, *kickoff, home, away, &baseline, cfg))
        })
        .collect();

    info!(
        players = players.len(),
        squads = squads.len(),
        fixtures = outcomes.len(),
        league_concede = baseline.average_concede_rate(),
        "forecast complete"
    );

    Ok(Forecast {
        baseline,
        squads: squads
            .values()
            .map(|s| SquadSummary {
                team_id: s.team_id,
                name: s.name.clone(),
                team_label: s.team_label().to_string(),
                concede_rate: s.concede_rate(),
                goal_rate: s.goal_rate(),
            })
            .collect(),
        players,
        outcomes,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SquadSummary {
    pub team_id: u32,
    pub name: String,
    pub team_label: String,
    pub concede_rate: Rate,
    pub goal_rate: Rate,
}

/// One exported prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PointsRow {
    pub fixture_id: u32,
    pub player_id: u32,
    pub player_name: String,
    pub team: String,
    pub position: &'static str,
    pub prob_appearance: f64,
    pub bps_rank: usize,
    pub final_points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerTotal {
    pub player_id: u32,
    pub player_name: String,
    pub position: &'static str,
    pub fixtures: usize,
    pub total_points: f64,
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub baseline: LeagueBaseline,
    pub squads: Vec<SquadSummary>,
    pub players: HashMap<u32, Arc<PlayerRecord>>,
    /// Ordered by fixture id.
    pub outcomes: Vec<MatchOutcome>,
}

impl Forecast {
    /// (fixture id, player id) → final points.
    pub fn points(&self) -> BTreeMap<(u32, u32), f64> {
        self.outcomes
            .iter()
            .flat_map(|o| {
                o.players
                    .iter()
                    .map(move |p| ((o.fixture_id, p.player_id), p.outlook.final_points()))
            })
            .collect()
    }

    pub fn final_points(&self, fixture_id: u32, player_id: u32) -> Option<f64> {
        self.outcome(fixture_id)?
            .players
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| p.outlook.final_points())
    }

    pub fn outcome(&self, fixture_id: u32) -> Option<&MatchOutcome> {
        self.outcomes
            .binary_search_by_key(&fixture_id, |o| o.fixture_id)
            .ok()
            .map(|idx| &self.outcomes[idx])
    }

    pub fn rows(&self) -> Vec<PointsRow> {
        let mut rows = Vec::new();
        for o in &self.outcomes {
            for pf in &o.players {
                let Some(player) = self.players.get(&pf.player_id) else {
                    continue;
                };
                rows.push(PointsRow {
                    fixture_id: o.fixture_id,
                    player_id: pf.player_id,
                    player_name: player.name.clone(),
                    team: player.team.clone(),
                    position: player.position.short(),
                    prob_appearance: pf.outlook.selection().prob_appearance(),
                    bps_rank: pf.outlook.bps_rank(),
                    final_points: pf.outlook.final_points(),
                });
            }
        }
        rows
    }

    /// Points summed over each player's remaining fixtures, best first.
    pub fn player_totals(&self) -> Vec<PlayerTotal> {
        let mut acc: BTreeMap<u32, (usize, f64)> = BTreeMap::new();
        for ((_, pid), pts) in self.points() {
            let slot = acc.entry(pid).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += pts;
        }
        let mut out: Vec<PlayerTotal> = acc
            .into_iter()
            .filter_map(|(pid, (n, total))| {
                let p = self.players.get(&pid)?;
                Some(PlayerTotal {
                    player_id: pid,
                    player_name: p.name.clone(),
                    position: p.position.short(),
                    fixtures: n,
                    total_points: total,
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.total_points
                .total_cmp(&a.total_points)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        out
    }
}
