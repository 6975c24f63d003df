//! Fixture simulator.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{ForecastError, ForecastResult};
use crate::outlook::{Exposed, Ranked, Rated, Scored, Selection};
use crate::player::PlayerRecord;
use crate::squad::{Rate, Squad};

// Team aggregates below this are treated as a sparse-data collapse.
const MIN_TEAM_GOAL_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueBaseline {
    average_concede_rate: f64,
    max_concede_rate: f64,
    teams_with_data: usize,
}

impl LeagueBaseline {
    pub fn from_squads<'a, I>(squads: I) -> ForecastResult<Self>
    where
        I: IntoIterator<Item = &'a Squad>,
    {
        let known: Vec<f64> = squads
            .into_iter()
            .filter_map(|s| s.concede_rate().known())
            .collect();
        if known.is_empty() {
            return Err(ForecastError::NoConcedeBaseline);
        }
        let average = known.iter().sum::<f64>() / known.len() as f64;
        let max = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            average_concede_rate: average,
            max_concede_rate: max,
            teams_with_data: known.len(),
        })
    }

    pub fn average_concede_rate(&self) -> f64 {
        self.average_concede_rate
    }

    pub fn max_concede_rate(&self) -> f64 {
        self.max_concede_rate
    }

    pub fn teams_with_data(&self) -> usize {
        self.teams_with_data
    }

    // An opponent with no concede data is assumed to be the league's leakiest.
    fn concede_or_worst(&self, rate: Rate) -> f64 {
        rate.known().unwrap_or(self.max_concede_rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone)]
struct Entry<'a, S> {
    side: Side,
    player: &'a PlayerRecord,
    stage: S,
}

#[derive(Debug, Clone)]
pub struct Match<'a, S> {
    fixture_id: u32,
    home: &'a Squad,
    away: &'a Squad,
    baseline: &'a LeagueBaseline,
    cfg: &'a ModelConfig,
    lineup: Vec<Entry<'a, S>>,
    team_h_goal_rate: f64,
    team_a_goal_rate: f64,
}

impl<'a, S> Match<'a, S> {
    pub fn fixture_id(&self) -> u32 {
        self.fixture_id
    }

    pub fn home(&self) -> &'a Squad {
        self.home
    }

    pub fn away(&self) -> &'a Squad {
        self.away
    }

    pub fn stages(&self) -> impl Iterator<Item = (Side, &'a PlayerRecord, &S)> + '_ {
        self.lineup.iter().map(|e| (e.side, e.player, &e.stage))
    }

    fn advance<T>(self, mut step: impl FnMut(Side, &'a PlayerRecord, S) -> T) -> Match<'a, T> {
        let lineup = self
            .lineup
            .into_iter()
            .map(|e| Entry {
                side: e.side,
                player: e.player,
                stage: step(e.side, e.player, e.stage),
            })
            .collect();
        Match {
            fixture_id: self.fixture_id,
            home: self.home,
            away: self.away,
            baseline: self.baseline,
            cfg: self.cfg,
            lineup,
            team_h_goal_rate: self.team_h_goal_rate,
            team_a_goal_rate: self.team_a_goal_rate,
        }
    }
}

impl<'a> Match<'a, Selection> {
    pub fn new(
        fixture_id: u32,
        kickoff: Option<NaiveDate>,
        home: &'a Squad,
        away: &'a Squad,
        baseline: &'a LeagueBaseline,
        cfg: &'a ModelConfig,
    ) -> Self {
        let sides: [(Side, &'a Squad); 2] = [(Side::Home, home), (Side::Away, away)];
        let lineup = sides
            .into_iter()
            .flat_map(|(side, squad)| {
                squad.roster().iter().map(move |p| Entry {
                    side,
                    player: p.as_ref(),
                    stage: p.selection(kickoff),
                })
            })
            .collect();
        Self {
            fixture_id,
            home,
            away,
            baseline,
            cfg,
            lineup,
            team_h_goal_rate: 0.0,
            team_a_goal_rate: 0.0,
        }
    }

    /// Scales each player's scoring rates by venue and the opponent's defensive
    /// strength relative to the league, then totals each side's expected goals.
    pub fn simulate_player_goals(self) -> Match<'a, Rated> {
        let avg = self.baseline.average_concede_rate();
        let c_home = self.baseline.concede_or_worst(self.home.concede_rate());
        let c_away = self.baseline.concede_or_worst(self.away.concede_rate());
        let home_mult = (1.0 + self.cfg.home_advantage) * c_away / avg;
        let away_mult = (1.0 - self.cfg.away_disadvantage) * c_home / avg;

        let mut rated = self.advance(|side, player, sel| {
            let mult = match side {
                Side::Home => home_mult,
                Side::Away => away_mult,
            };
            sel.with_rates(
                player.goals_per_match() * mult,
                player.assists_per_match() * mult,
            )
        });

        let (mut team_h, mut team_a) = (0.0, 0.0);
        for e in &rated.lineup {
            let xg = e.stage.goal_rate() * e.stage.selection().prob_appearance();
            match e.side {
                Side::Home => team_h += xg,
                Side::Away => team_a += xg,
            }
        }
        rated.team_h_goal_rate = floor_team_rate(rated.fixture_id, rated.home, team_h);
        rated.team_a_goal_rate = floor_team_rate(rated.fixture_id, rated.away, team_a);
        rated
    }
}

fn floor_team_rate(fixture_id: u32, squad: &Squad, aggregate: f64) -> f64 {
    if aggregate >= MIN_TEAM_GOAL_RATE {
        return aggregate;
    }
    match squad.goal_rate() {
        Rate::Known(v) => {
            debug!(
                fixture_id,
                team = squad.team_label(),
                aggregate,
                replacement = v,
                "team goal rate below floor; using squad estimate"
            );
            v
        }
        Rate::Unknown => aggregate,
    }
}

impl<'a> Match<'a, Rated> {
    pub fn team_goal_rates(&self) -> (f64, f64) {
        (self.team_h_goal_rate, self.team_a_goal_rate)
    }

    pub fn simulate_conceded(self) -> Match<'a, Exposed> {
        let (team_h, team_a) = (self.team_h_goal_rate, self.team_a_goal_rate);
        self.advance(|side, _, rated| match side {
            Side::Home => rated.with_concede(team_a),
            Side::Away => rated.with_concede(team_h),
        })
    }
}

impl<'a> Match<'a, Exposed> {
    pub fn team_goal_rates(&self) -> (f64, f64) {
        (self.team_h_goal_rate, self.team_a_goal_rate)
    }

    pub fn score_players(self) -> Match<'a, Scored> {
        self.advance(|_, player, exposed| player.score(exposed))
    }
}

impl<'a> Match<'a, Scored> {
    /// Ranks both squads together by BPS score (ties: lower player id first) and
    /// settles each player's final points.
    pub fn resolve_bps(self) -> MatchOutcome {
        let mut order: Vec<usize> = (0..self.lineup.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.lineup[a], &self.lineup[b]);
            eb.stage
                .bonus_points()
                .total_cmp(&ea.stage.bonus_points())
                .then_with(|| ea.player.id.cmp(&eb.player.id))
        });

        let players = order
            .into_iter()
            .enumerate()
            .map(|(i, idx)| {
                let e = &self.lineup[idx];
                let rank = i + 1;
                PlayerFixture {
                    player_id: e.player.id,
                    side: e.side,
                    outlook: e.player.resolve_bps(e.stage, rank, self.cfg),
                }
            })
            .collect();

        MatchOutcome {
            fixture_id: self.fixture_id,
            home_team: self.home.team_id,
            away_team: self.away.team_id,
            team_h_goal_rate: self.team_h_goal_rate,
            team_a_goal_rate: self.team_a_goal_rate,
            players,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerFixture {
    pub player_id: u32,
    pub side: Side,
    pub outlook: Ranked,
}

/// Settled fixture; `players` is in BPS rank order.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub fixture_id: u32,
    pub home_team: u32,
    pub away_team: u32,
    pub team_h_goal_rate: f64,
    pub team_a_goal_rate: f64,
    pub players: Vec<PlayerFixture>,
}

pub fn simulate_fixture(
    fixture_id: u32,
    kickoff: Option<NaiveDate>,
    home: &Squad,
    away: &Squad,
    baseline: &LeagueBaseline,
    cfg: &ModelConfig,
) -> MatchOutcome {
    Match::new(fixture_id, kickoff, home, away, baseline, cfg)
        .simulate_player_goals()
        .simulate_conceded()
        .score_players()
        .resolve_bps()
}
