use thiserror::Error;

/// Failures the forecasting core refuses to paper over.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    /// No scoring table exists for the code, so the player cannot be modelled.
    #[error("player {player_id}: unknown position code {code}")]
    UnknownPosition { player_id: u32, code: u8 },

    /// Every squad reported an unknown concede rate.
    #[error("no squad in the league has a known concede rate; league baseline is undefined")]
    NoConcedeBaseline,

    #[error("fixture {fixture_id}: unparseable kickoff time {raw:?}")]
    InvalidKickoff { fixture_id: u32, raw: String },
}

pub type ForecastResult<T> = Result<T, ForecastError>;
