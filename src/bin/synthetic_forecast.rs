use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use fpl_forecast::config::{CalibrationTable, ModelConfig};
use fpl_forecast::engine::run_forecast;
use fpl_forecast::fake_league::generate_league;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let seed = parse_flag("--seed")?.unwrap_or(42);
    let rounds = parse_flag("--rounds")?.unwrap_or(10) as usize;
    let dump = std::env::args().any(|a| a == "--dump");

    let league = generate_league(seed, rounds);
    if dump {
        println!("{}", serde_json::to_string_pretty(&league)?);
        return Ok(());
    }

    // Synthetic rounds start 2018-08-11, one per week.
    let as_of = NaiveDate::from_ymd_opt(2018, 8, 11)
        .and_then(|d| d.checked_add_days(chrono::Days::new(7 * rounds as u64)))
        .context("as-of date out of range")?;
    let cfg = ModelConfig::defaults(as_of);
    let forecast = run_forecast(&league, &cfg, &CalibrationTable::bundled()?)?;

    println!("Synthetic league seed {seed}, {rounds} rounds played, as of {as_of}");
    for row in forecast.player_totals().iter().take(15) {
        println!(
            "{:<6} {:<24} {:<4} {:>4} {:>8.2}",
            row.player_id, row.player_name, row.position, row.fixtures, row.total_points
        );
    }
    Ok(())
}

fn parse_flag(name: &str) -> Result<Option<u64>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(val) = arg.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')) {
            return val.trim().parse().map(Some).with_context(|| format!("{name} expects a number"));
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            return next.trim().parse().map(Some).with_context(|| format!("{name} expects a number"));
        }
    }
    Ok(None)
}
