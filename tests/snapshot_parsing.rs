use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use fpl_forecast::snapshot::{load_snapshot, parse_snapshot_json};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn parses_small_league_fixture() {
    let snapshot = parse_snapshot_json(&read_fixture("league_small.json")).expect("fixture should parse");
    assert_eq!(snapshot.players.len(), 6);
    assert_eq!(snapshot.overview.len(), 10);
    assert_eq!(snapshot.fixtures.len(), 5);
    assert_eq!(snapshot.rosters.len(), 2);

    let keeper = &snapshot.players[0];
    assert_eq!(keeper.position, 1);
    assert_eq!(keeper.goals_conceded, 10);
    assert_eq!(keeper.assists, 0);
    assert_eq!(keeper.status, None);

    let crocked = &snapshot.players[2];
    assert_eq!(crocked.status.as_deref(), Some("i"));
    assert_eq!(crocked.chance_of_playing, None);
}

#[test]
fn fixture_aliases_and_kickoffs() {
    let snapshot = load_snapshot(&fixture_path("league_small.json")).expect("fixture should load");
    let f = &snapshot.fixtures[1];
    assert_eq!((f.home_team, f.away_team), (1, 2));
    assert!(!f.finished);
    assert_eq!(
        f.kickoff_date().unwrap(),
        NaiveDate::from_ymd_opt(2018, 10, 6)
    );
    assert_eq!(snapshot.fixtures[4].kickoff_date().unwrap(), None);
}

#[test]
fn games_played_counts_finished_fixtures_only() {
    let snapshot = parse_snapshot_json(&read_fixture("league_small.json")).unwrap();
    let played = snapshot.games_played_by_team();
    assert_eq!(played.get(&1), Some(&1));
    assert_eq!(played.get(&2), Some(&1));
    assert_eq!(played.get(&9), None);
}

#[test]
fn empty_payloads_yield_empty_snapshot() {
    assert!(parse_snapshot_json("").unwrap().players.is_empty());
    assert!(parse_snapshot_json("null").unwrap().fixtures.is_empty());
    assert!(parse_snapshot_json("{}").unwrap().rosters.is_empty());
}

#[test]
fn malformed_json_is_reported() {
    let err = parse_snapshot_json("{\"players\": [").unwrap_err();
    assert!(err.to_string().contains("league snapshot"));
}

#[test]
fn missing_file_names_the_path() {
    let err = load_snapshot(&fixture_path("does_not_exist.json")).unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.json"));
}
