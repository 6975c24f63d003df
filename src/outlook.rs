//! Per-(player, fixture) forecast, built one stage at a time.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Selection {
    prob_appearance: f64,
    prob_start: f64,
    prob_sub: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rated {
    selection: Selection,
    goal_rate: f64,
    assist_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Exposed {
    rated: Rated,
    prob_concede: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scored {
    exposed: Exposed,
    initial_points: f64,
    bonus_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    scored: Scored,
    bps_rank: usize,
    final_points: f64,
}

impl Selection {
    pub fn new(prob_appearance: f64, prob_start: f64, prob_sub: f64) -> Self {
        Self {
            prob_appearance,
            prob_start,
            prob_sub,
        }
    }

    pub fn prob_appearance(&self) -> f64 {
        self.prob_appearance
    }

    pub fn prob_start(&self) -> f64 {
        self.prob_start
    }

    pub fn prob_sub(&self) -> f64 {
        self.prob_sub
    }

    pub fn with_rates(self, goal_rate: f64, assist_rate: f64) -> Rated {
        Rated {
            selection: self,
            goal_rate,
            assist_rate,
        }
    }
}

impl Rated {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn goal_rate(&self) -> f64 {
        self.goal_rate
    }

    pub fn assist_rate(&self) -> f64 {
        self.assist_rate
    }

    pub fn with_concede(self, prob_concede: f64) -> Exposed {
        Exposed {
            rated: self,
            prob_concede,
        }
    }
}

impl Exposed {
    pub fn rated(&self) -> &Rated {
        &self.rated
    }

    pub fn selection(&self) -> &Selection {
        &self.rated.selection
    }

    pub fn prob_concede(&self) -> f64 {
        self.prob_concede
    }

    pub(crate) fn with_points(self, initial_points: f64, bonus_points: f64) -> Scored {
        Scored {
            exposed: self,
            initial_points,
            bonus_points,
        }
    }
}

impl Scored {
    pub fn exposed(&self) -> &Exposed {
        &self.exposed
    }

    pub fn initial_points(&self) -> f64 {
        self.initial_points
    }

    pub fn bonus_points(&self) -> f64 {
        self.bonus_points
    }

    pub(crate) fn with_rank(self, bps_rank: usize, final_points: f64) -> Ranked {
        Ranked {
            scored: self,
            bps_rank,
            final_points,
        }
    }
}

impl Ranked {
    pub fn scored(&self) -> &Scored {
        &self.scored
    }

    pub fn selection(&self) -> &Selection {
        self.scored.exposed.selection()
    }

    pub fn goal_rate(&self) -> f64 {
        self.scored.exposed.rated.goal_rate
    }

    pub fn prob_concede(&self) -> f64 {
        self.scored.exposed.prob_concede
    }

    pub fn bps_rank(&self) -> usize {
        self.bps_rank
    }

    pub fn final_points(&self) -> f64 {
        self.final_points
    }
}
