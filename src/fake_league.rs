use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::snapshot::{FixtureRow, LeagueSnapshot, OverviewRow, PlayerRow, RosterRow};

const TEAM_NAMES: [&str; 20] = [
    "Arsenal",
    "Bournemouth",
    "Brighton and Hove Albion",
    "Burnley",
    "Cardiff City",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Huddersfield Town",
    "Leicester City",
    "Liverpool",
    "Manchester City",
    "Manchester United",
    "Newcastle United",
    "Southampton",
    "Tottenham Hotspur",
    "Watford",
    "West Ham United",
    "Wolverhampton Wanderers",
];

// (position code, players per squad)
const SQUAD_SHAPE: [(u8, u32); 4] = [(1, 3), (2, 8), (3, 8), (4, 6)];

/// Deterministic synthetic league: same seed, same snapshot.
pub fn generate_league(seed: u64, played_rounds: usize) -> LeagueSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let season_start = NaiveDate::from_ymd_opt(2018, 8, 11).unwrap_or_default();

    let mut snapshot = LeagueSnapshot::default();
    let mut next_player_id = 1u32;

    for (idx, name) in TEAM_NAMES.iter().enumerate() {
        let team_id = idx as u32 + 1;
        let mut player_ids = Vec::new();
        for (code, count) in SQUAD_SHAPE {
            for _ in 0..count {
                let id = next_player_id;
                next_player_id += 1;
                let (row, overview) = fake_player(&mut rng, id, name, code, played_rounds);
                snapshot.players.push(row);
                snapshot.overview.extend(overview);
                player_ids.push(id);
            }
        }
        snapshot.rosters.push(RosterRow {
            team_id,
            name: Some(name.to_string()),
            player_ids,
        });
    }

    snapshot.fixtures = double_round_robin(TEAM_NAMES.len() as u32, season_start, played_rounds);
    snapshot
}

fn fake_player(
    rng: &mut StdRng,
    id: u32,
    team: &str,
    code: u8,
    played_rounds: usize,
) -> (PlayerRow, Vec<OverviewRow>) {
    let regular = rng.gen_bool(0.6);
    let appearances = if regular {
        rng.gen_range(20..=120)
    } else {
        rng.gen_range(0..=25)
    };
    let goal_rate = match code {
        1 => 0.0,
        2 => 0.04,
        3 => 0.15,
        _ => 0.40,
    };
    let goals = scaled(rng, appearances, goal_rate);
    let assists = scaled(rng, appearances, goal_rate * 0.7 + 0.03);
    let goals_conceded = if code <= 2 {
        scaled(rng, appearances, 1.3)
    } else {
        0
    };

    let (status, chance) = match rng.gen_range(0..20) {
        0 => (Some("i".to_string()), Some(0.0)),
        1 => (Some("d".to_string()), Some(f64::from(rng.gen_range(1..=3u32) * 25))),
        2 => (Some("s".to_string()), Some(0.0)),
        _ => (Some("a".to_string()), None),
    };

    let row = PlayerRow {
        id,
        name: format!("{} {}", team.split(' ').next().unwrap_or(team), id),
        team: team.to_string(),
        position: code,
        appearances,
        goals,
        assists,
        yellow_cards: scaled(rng, appearances, 0.12),
        red_cards: scaled(rng, appearances, 0.005),
        own_goals: scaled(rng, appearances, 0.004),
        goals_conceded,
        status,
        chance_of_playing: chance,
    };

    let played = played_rounds as u32;
    let current_apps = if regular {
        rng.gen_range(played / 2..=played)
    } else {
        rng.gen_range(0..=played / 3)
    };
    let last_apps = if regular {
        rng.gen_range(22..=38)
    } else {
        rng.gen_range(0..=15)
    };
    let overview = vec![
        OverviewRow {
            player_id: id,
            season: "2018/2019".to_string(),
            apps: current_apps,
            subs: rng.gen_range(0..=current_apps / 3),
            goals: scaled(rng, current_apps, goal_rate),
        },
        OverviewRow {
            player_id: id,
            season: "2017/2018".to_string(),
            apps: last_apps,
            subs: rng.gen_range(0..=last_apps / 3),
            goals: scaled(rng, last_apps, goal_rate),
        },
    ];
    (row, overview)
}

// Roughly n·rate events with some spread.
fn scaled(rng: &mut StdRng, n: u32, rate: f64) -> u32 {
    if n == 0 || rate <= 0.0 {
        return 0;
    }
    let jitter = rng.gen_range(0.6..1.4);
    (n as f64 * rate * jitter).round() as u32
}

/// Circle-method schedule: every pair meets twice, one round per week.
fn double_round_robin(teams: u32, start: NaiveDate, played_rounds: usize) -> Vec<FixtureRow> {
    let mut ring: Vec<u32> = (1..=teams).collect();
    let half = ring.len() / 2;
    let mut rounds: Vec<Vec<(u32, u32)>> = Vec::new();
    for r in 0..ring.len() - 1 {
        let mut pairs = Vec::with_capacity(half);
        for i in 0..half {
            let (a, b) = (ring[i], ring[ring.len() - 1 - i]);
            pairs.push(if (r + i) % 2 == 0 { (a, b) } else { (b, a) });
        }
        rounds.push(pairs);
        let last = ring.pop().unwrap_or_default();
        ring.insert(1, last);
    }
    let reverse: Vec<Vec<(u32, u32)>> = rounds
        .iter()
        .map(|pairs| pairs.iter().map(|(h, a)| (*a, *h)).collect())
        .collect();
    rounds.extend(reverse);

    let mut fixtures = Vec::new();
    let mut id = 1u32;
    for (round, pairs) in rounds.into_iter().enumerate() {
        let day = start + Duration::weeks(round as i64);
        for (home, away) in pairs {
            fixtures.push(FixtureRow {
                id,
                home_team: home,
                away_team: away,
                kickoff_time: Some(format!("{day}T15:00:00Z")),
                finished: round < played_rounds,
            });
            id += 1;
        }
    }
    fixtures
}
