use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use fpl_forecast::config::{CalibrationTable, ModelConfig};
use fpl_forecast::engine::run_forecast;
use fpl_forecast::snapshot::load_snapshot;

struct Args {
    snapshot: PathBuf,
    calibration: Option<PathBuf>,
    top: usize,
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    init_tracing();

    let args = parse_args()?;
    let snapshot = load_snapshot(&args.snapshot)?;
    let cfg = ModelConfig::from_env();
    let calibration = match &args.calibration {
        Some(path) => CalibrationTable::load(path)?,
        None => CalibrationTable::resolve()?,
    };

    let forecast = run_forecast(&snapshot, &cfg, &calibration)
        .with_context(|| format!("forecast {}", args.snapshot.display()))?;

    if args.json {
        let out = serde_json::to_string_pretty(&forecast.rows())?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "As of {} | {} fixtures | league concede {:.3} (max {:.3})",
        cfg.as_of,
        forecast.outcomes.len(),
        forecast.baseline.average_concede_rate(),
        forecast.baseline.max_concede_rate()
    );
    println!("{:<6} {:<28} {:<4} {:>4} {:>8}", "ID", "Player", "Pos", "Fx", "Points");
    for row in forecast.player_totals().iter().take(args.top) {
        println!(
            "{:<6} {:<28} {:<4} {:>4} {:>8.2}",
            row.player_id, row.player_name, row.position, row.fixtures, row.total_points
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> Result<Args> {
    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    let mut snapshot = None;
    let mut calibration = None;
    let mut top = 20usize;
    let mut json = false;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        if arg == "--json" {
            json = true;
        } else if let Some(val) = arg.strip_prefix("--top=") {
            top = val.trim().parse().context("--top expects a number")?;
        } else if arg == "--top" {
            let val = iter.next().context("--top expects a number")?;
            top = val.trim().parse().context("--top expects a number")?;
        } else if let Some(val) = arg.strip_prefix("--calibration=") {
            calibration = Some(PathBuf::from(val.trim()));
        } else if arg == "--calibration" {
            let val = iter.next().context("--calibration expects a path")?;
            calibration = Some(PathBuf::from(val));
        } else if arg.starts_with("--") {
            bail!("unknown flag {arg}");
        } else if snapshot.is_none() {
            snapshot = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument {arg}");
        }
    }

    let snapshot = snapshot
        .or_else(|| std::env::var("FORECAST_SNAPSHOT_PATH").ok().map(PathBuf::from))
        .context("usage: fpl_forecast <snapshot.json> [--top N] [--json] [--calibration PATH]")?;
    Ok(Args {
        snapshot,
        calibration,
        top,
        json,
    })
}
