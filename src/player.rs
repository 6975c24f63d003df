use chrono::NaiveDate;

use crate::appearance::{AppearanceRates, Availability, SeasonAggregate};
use crate::config::ModelConfig;
use crate::error::ForecastResult;
use crate::outlook::{Exposed, Ranked, Scored, Selection};
use crate::poisson::{expected_goals_truncated, poisson, Tail};
use crate::position::{
    Position, ASSIST_POINTS, OWN_GOAL_POINTS, RED_POINTS, STARTER_POINTS, SUB_POINTS,
    YELLOW_POINTS,
};
use crate::snapshot::{OverviewRow, PlayerRow};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeasonTotals {
    pub appearances: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub own_goals: u32,
    pub goals_conceded: u32,
}

/// One player's historical profile. Immutable once built; per-fixture state lives in
/// the [`crate::outlook`] stages produced by a match simulation.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub position: Position,
    pub totals: SeasonTotals,
    pub availability: Availability,
    pub appearance: AppearanceRates,
    goals_per_match: f64,
    assists_per_match: f64,
    concede_per_match: Option<f64>,
    p_yellow: f64,
    p_red: f64,
    p_own_goal: f64,
}

impl PlayerRecord {
    pub fn from_row(
        row: &PlayerRow,
        overview: &[&OverviewRow],
        games_played: u32,
        cfg: &ModelConfig,
    ) -> ForecastResult<Self> {
        let position = Position::from_code(row.id, row.position)?;
        let totals = SeasonTotals {
            appearances: row.appearances,
            goals: row.goals,
            assists: row.assists,
            yellow_cards: row.yellow_cards,
            red_cards: row.red_cards,
            own_goals: row.own_goals,
            goals_conceded: row.goals_conceded,
        };
        let aggregate = SeasonAggregate::from_overview(
            overview,
            cfg.current_season,
            cfg.season_length,
            games_played,
        );
        let availability =
            Availability::from_news(row.status.as_deref(), row.chance_of_playing, cfg.as_of);
        Ok(Self::new(
            row.id,
            row.name.clone(),
            row.team.clone(),
            position,
            totals,
            availability,
            AppearanceRates::from_aggregate(&aggregate),
        ))
    }

    pub fn new(
        id: u32,
        name: String,
        team: String,
        position: Position,
        totals: SeasonTotals,
        availability: Availability,
        appearance: AppearanceRates,
    ) -> Self {
        let per_match = |n: u32| per_appearance(n, totals.appearances);
        let card_rate = per_match(totals.yellow_cards.saturating_add(totals.red_cards));
        Self {
            id,
            name,
            team,
            position,
            goals_per_match: per_match(totals.goals),
            assists_per_match: per_match(totals.assists),
            concede_per_match: position
                .is_defensive()
                .then(|| per_match(totals.goals_conceded)),
            // Yellows and reds pooled into one process; two cards stand in for a red.
            p_yellow: poisson(card_rate, 1, Tail::Exact),
            p_red: poisson(card_rate, 2, Tail::Exact),
            p_own_goal: per_match(totals.own_goals),
            totals,
            availability,
            appearance,
        }
    }

    pub fn goals_per_match(&self) -> f64 {
        self.goals_per_match
    }

    pub fn assists_per_match(&self) -> f64 {
        self.assists_per_match
    }

    /// `None` for midfielders and forwards.
    pub fn concede_per_match(&self) -> Option<f64> {
        self.concede_per_match
    }

    pub fn app_rate(&self) -> f64 {
        self.appearance.app_rate
    }

    pub fn p_yellow(&self) -> f64 {
        self.p_yellow
    }

    pub fn p_red(&self) -> f64 {
        self.p_red
    }

    pub fn p_own_goal(&self) -> f64 {
        self.p_own_goal
    }

    /// Appearance, start and substitute probabilities for a fixture on `kickoff`.
    pub fn selection(&self, kickoff: Option<NaiveDate>) -> Selection {
        let factor = self.availability.factor_for(kickoff);
        Selection::new(
            factor * self.appearance.app_rate,
            factor * self.appearance.start_rate,
            factor * self.appearance.sub_rate,
        )
    }

    /// Expected points before bonus.
    pub fn resolve(&self, exposed: &Exposed) -> f64 {
        let table = self.position.scoring();
        let mut points = self.time_played(exposed)
            + self.goal_assists(exposed)
            + self.card_points()
            + self.own_goal_points()
            + table.goal * expected_goals_truncated(exposed.rated().goal_rate());
        if let Some(clean) = table.clean_sheet {
            points += clean * clean_sheet_prob(exposed);
        }
        if let Some(conceded) = table.conceded {
            points += conceded * poisson(exposed.prob_concede(), 2, Tail::AtLeast);
        }
        points * exposed.selection().prob_appearance()
    }

    /// BPS-weighted subset used only to rank players within a fixture.
    pub fn calculate_bps(&self, exposed: &Exposed) -> f64 {
        let table = self.position.scoring();
        let mut points = table.bps_goal * expected_goals_truncated(exposed.rated().goal_rate());
        if let Some(clean) = table.bps_clean_sheet {
            points += clean * clean_sheet_prob(exposed);
        }
        points * exposed.selection().prob_appearance()
    }

    pub fn score(&self, exposed: Exposed) -> Scored {
        let initial = self.resolve(&exposed);
        let bonus = self.calculate_bps(&exposed);
        exposed.with_points(initial, bonus)
    }

    /// Adds the rank's bonus award, scaled by the chance of appearing at all.
    pub fn resolve_bps(&self, scored: Scored, rank: usize, cfg: &ModelConfig) -> Ranked {
        let award = cfg.bonus_for_rank(rank) * scored.exposed().selection().prob_appearance();
        let total = scored.initial_points() + award;
        scored.with_rank(rank, total)
    }

    fn time_played(&self, exposed: &Exposed) -> f64 {
        let sel = exposed.selection();
        sel.prob_start() * STARTER_POINTS + sel.prob_sub() * SUB_POINTS
    }

    fn goal_assists(&self, exposed: &Exposed) -> f64 {
        exposed.rated().assist_rate() * ASSIST_POINTS
    }

    fn card_points(&self) -> f64 {
        self.p_red * RED_POINTS + self.p_yellow * YELLOW_POINTS
    }

    fn own_goal_points(&self) -> f64 {
        self.p_own_goal * OWN_GOAL_POINTS
    }
}

fn clean_sheet_prob(exposed: &Exposed) -> f64 {
    poisson(exposed.prob_concede(), 0, Tail::Exact)
}

fn per_appearance(count: u32, appearances: u32) -> f64 {
    if appearances == 0 {
        0.0
    } else {
        count as f64 / appearances as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 10, 1).unwrap()
    }

    fn player(position: Position, totals: SeasonTotals) -> PlayerRecord {
        PlayerRecord::new(
            1,
            "Test".to_string(),
            "Test FC".to_string(),
            position,
            totals,
            Availability::fit(day()),
            AppearanceRates {
                app_rate: 1.0,
                start_rate: 1.0,
                sub_rate: 0.0,
            },
        )
    }

    fn exposed(p_app: f64, goal_rate: f64, assist_rate: f64, concede: f64) -> Exposed {
        Selection::new(p_app, p_app, 0.0)
            .with_rates(goal_rate, assist_rate)
            .with_concede(concede)
    }

    #[test]
    fn zero_appearances_give_zero_rates() {
        let totals = SeasonTotals {
            goals: 3,
            assists: 2,
            goals_conceded: 10,
            yellow_cards: 4,
            own_goals: 1,
            ..SeasonTotals::default()
        };
        for pos in [
            Position::GoalKeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Forward,
        ] {
            let p = player(pos, totals);
            assert_eq!(p.goals_per_match(), 0.0);
            assert_eq!(p.assists_per_match(), 0.0);
            assert_eq!(p.concede_per_match().unwrap_or(0.0), 0.0);
            assert_eq!(p.p_yellow(), 0.0);
            assert_eq!(p.p_own_goal(), 0.0);
        }
    }

    #[test]
    fn concede_rate_only_for_back_line() {
        let totals = SeasonTotals {
            appearances: 10,
            goals_conceded: 12,
            ..SeasonTotals::default()
        };
        assert_eq!(player(Position::Defender, totals).concede_per_match(), Some(1.2));
        assert_eq!(player(Position::Midfielder, totals).concede_per_match(), None);
    }

    #[test]
    fn extreme_card_counts_do_not_overflow() {
        let totals = SeasonTotals {
            appearances: 10,
            yellow_cards: u32::MAX,
            red_cards: 1,
            ..SeasonTotals::default()
        };
        let p = player(Position::Defender, totals);
        assert!(p.p_yellow().is_finite());
        assert!(p.p_red().is_finite());
        assert!(p.p_yellow() >= 0.0 && p.p_yellow() < 1e-12);
    }

    #[test]
    fn cards_pool_into_one_poisson_process() {
        let totals = SeasonTotals {
            appearances: 20,
            yellow_cards: 4,
            red_cards: 1,
            own_goals: 1,
            ..SeasonTotals::default()
        };
        let p = player(Position::Midfielder, totals);
        let l = 0.25_f64;
        assert!((p.p_yellow() - (-l).exp() * l).abs() < 1e-12);
        assert!((p.p_red() - (-l).exp() * l * l / 2.0).abs() < 1e-12);
        assert!((p.p_own_goal() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn forward_bps_is_weighted_goal_expectation() {
        let totals = SeasonTotals {
            appearances: 10,
            goals: 5,
            ..SeasonTotals::default()
        };
        let fwd = player(Position::Forward, totals);
        assert_eq!(fwd.goals_per_match(), 0.5);

        let e = exposed(1.0, 0.6, 0.0, 1.3);
        let direct: f64 = (1..=5)
            .map(|x| {
                let mut fact = 1.0;
                for i in 1..=x {
                    fact *= i as f64;
                }
                x as f64 * (-0.6_f64).exp() * 0.6_f64.powi(x) / fact
            })
            .sum();
        assert!((fwd.calculate_bps(&e) - 24.0 * direct).abs() < 1e-12);
    }

    #[test]
    fn defender_points_include_clean_sheet_and_concede_penalty() {
        let def = player(Position::Defender, SeasonTotals::default());
        let e = exposed(1.0, 0.0, 0.0, 1.0);
        let clean = (-1.0_f64).exp();
        let two_plus = 1.0 - clean - clean;
        let expected = 2.0 + 4.0 * clean - two_plus;
        assert!((def.resolve(&e) - expected).abs() < 1e-12);
        assert!((def.calculate_bps(&e) - 12.0 * clean).abs() < 1e-12);
    }

    #[test]
    fn midfielder_clean_sheet_is_worth_one_and_no_bps_clean() {
        let mid = player(Position::Midfielder, SeasonTotals::default());
        let e = exposed(1.0, 0.0, 0.0, 0.0);
        assert!((mid.resolve(&e) - 3.0).abs() < 1e-12);
        assert_eq!(mid.calculate_bps(&e), 0.0);
    }

    #[test]
    fn everything_scales_with_appearance_probability() {
        let fwd = player(Position::Forward, SeasonTotals::default());
        let full = fwd.resolve(&exposed(1.0, 0.4, 0.2, 1.0));
        let half = Selection::new(0.5, 1.0, 0.0)
            .with_rates(0.4, 0.2)
            .with_concede(1.0);
        assert!((fwd.resolve(&half) - full / 2.0).abs() < 1e-12);
        assert_eq!(fwd.resolve(&exposed(0.0, 0.4, 0.2, 1.0)), 0.0);
    }

    #[test]
    fn bonus_award_added_for_top_three_only() {
        let cfg = ModelConfig::defaults(day());
        let fwd = player(Position::Forward, SeasonTotals::default());
        let e = Selection::new(0.5, 0.5, 0.0).with_rates(0.3, 0.0).with_concede(1.0);
        let scored = fwd.score(e);

        let first = fwd.resolve_bps(scored, 1, &cfg);
        assert_eq!(first.bps_rank(), 1);
        assert!((first.final_points() - (scored.initial_points() + 2.0)).abs() < 1e-12);

        let fourth = fwd.resolve_bps(scored, 4, &cfg);
        assert_eq!(fourth.final_points(), scored.initial_points());
    }

    #[test]
    fn selection_applies_news_factor() {
        let mut p = player(Position::Forward, SeasonTotals::default());
        p.appearance = AppearanceRates {
            app_rate: 0.8,
            start_rate: 0.6,
            sub_rate: 0.2,
        };
        p.availability = Availability::from_news(Some("d"), Some(50.0), day());
        let soon = p.selection(NaiveDate::from_ymd_opt(2018, 10, 6));
        assert!((soon.prob_appearance() - 0.4).abs() < 1e-12);
        assert!((soon.prob_start() - 0.3).abs() < 1e-12);
        assert!((soon.prob_sub() - 0.1).abs() < 1e-12);
        let later = p.selection(NaiveDate::from_ymd_opt(2018, 12, 1));
        assert!((later.prob_appearance() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn unknown_position_code_fails_construction() {
        let row = PlayerRow {
            id: 9,
            name: "X".to_string(),
            team: "T".to_string(),
            position: 7,
            appearances: 0,
            goals: 0,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
            own_goals: 0,
            goals_conceded: 0,
            status: None,
            chance_of_playing: None,
        };
        let cfg = ModelConfig::defaults(day());
        assert!(PlayerRecord::from_row(&row, &[], 0, &cfg).is_err());
    }
}
