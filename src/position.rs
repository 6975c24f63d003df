use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    GoalKeeper,
    Defender,
    Midfielder,
    Forward,
}

/// Point weights for one position. `None` means the term does not apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringTable {
    pub goal: f64,
    pub clean_sheet: Option<f64>,
    /// Charged once when two or more goals are conceded.
    pub conceded: Option<f64>,
    pub bps_goal: f64,
    pub bps_clean_sheet: Option<f64>,
}

/// Terms every position scores the same way.
pub const ASSIST_POINTS: f64 = 3.0;
pub const YELLOW_POINTS: f64 = -1.0;
pub const RED_POINTS: f64 = -3.0;
pub const OWN_GOAL_POINTS: f64 = -2.0;
pub const STARTER_POINTS: f64 = 2.0;
pub const SUB_POINTS: f64 = 1.0;

const GOALKEEPER: ScoringTable = ScoringTable {
    goal: 6.0,
    clean_sheet: Some(4.0),
    conceded: Some(-1.0),
    bps_goal: 12.0,
    bps_clean_sheet: Some(12.0),
};

const DEFENDER: ScoringTable = ScoringTable {
    goal: 6.0,
    clean_sheet: Some(4.0),
    conceded: Some(-1.0),
    bps_goal: 12.0,
    bps_clean_sheet: Some(12.0),
};

const MIDFIELDER: ScoringTable = ScoringTable {
    goal: 5.0,
    clean_sheet: Some(1.0),
    conceded: None,
    bps_goal: 18.0,
    bps_clean_sheet: None,
};

const FORWARD: ScoringTable = ScoringTable {
    goal: 4.0,
    clean_sheet: None,
    conceded: None,
    bps_goal: 24.0,
    bps_clean_sheet: None,
};

impl Position {
    /// Maps the league's numeric element type (1 = GK .. 4 = FWD).
    pub fn from_code(player_id: u32, code: u8) -> ForecastResult<Self> {
        match code {
            1 => Ok(Position::GoalKeeper),
            2 => Ok(Position::Defender),
            3 => Ok(Position::Midfielder),
            4 => Ok(Position::Forward),
            _ => Err(ForecastError::UnknownPosition { player_id, code }),
        }
    }

    pub fn scoring(self) -> &'static ScoringTable {
        match self {
            Position::GoalKeeper => &GOALKEEPER,
            Position::Defender => &DEFENDER,
            Position::Midfielder => &MIDFIELDER,
            Position::Forward => &FORWARD,
        }
    }

    /// Positions whose concede record feeds the squad's defensive estimate.
    pub fn is_defensive(self) -> bool {
        matches!(self, Position::GoalKeeper | Position::Defender)
    }

    pub fn short(self) -> &'static str {
        match self {
            Position::GoalKeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_positions() {
        assert_eq!(Position::from_code(1, 1).unwrap(), Position::GoalKeeper);
        assert_eq!(Position::from_code(1, 4).unwrap(), Position::Forward);
    }

    #[test]
    fn unknown_code_is_fatal() {
        let err = Position::from_code(42, 5).unwrap_err();
        assert_eq!(err, ForecastError::UnknownPosition { player_id: 42, code: 5 });
        assert!(Position::from_code(42, 0).is_err());
    }

    #[test]
    fn only_back_line_takes_concede_penalty() {
        for pos in [Position::GoalKeeper, Position::Defender] {
            assert_eq!(pos.scoring().conceded, Some(-1.0));
            assert!(pos.is_defensive());
        }
        for pos in [Position::Midfielder, Position::Forward] {
            assert_eq!(pos.scoring().conceded, None);
            assert!(!pos.is_defensive());
        }
        assert_eq!(Position::Midfielder.scoring().clean_sheet, Some(1.0));
        assert_eq!(Position::Forward.scoring().clean_sheet, None);
        assert_eq!(Position::Forward.scoring().bps_goal, 24.0);
    }
}
