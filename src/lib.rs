pub mod appearance;
pub mod config;
pub mod engine;
pub mod error;
pub mod fake_league;
pub mod match_sim;
pub mod outlook;
pub mod player;
pub mod poisson;
pub mod position;
pub mod snapshot;
pub mod squad;

pub use config::{CalibrationTable, ModelConfig};
pub use engine::{run_forecast, Forecast, PlayerTotal, PointsRow};
pub use error::{ForecastError, ForecastResult};
pub use snapshot::{load_snapshot, parse_snapshot_json, LeagueSnapshot};
