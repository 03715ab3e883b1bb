#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use fpl_pipeline::assembler::NamedSnapshot;

pub const TEAMS: [(u32, &str, u32); 4] = [
    (1, "Arsenal", 4),
    (2, "Burnley", 2),
    (3, "Chelsea", 4),
    (4, "Everton", 3),
];

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn named(name: &str, payload: Value) -> NamedSnapshot {
    NamedSnapshot {
        name: name.to_string(),
        payload,
    }
}

/// Club code of a team; deliberately distinct from the season-scoped id.
pub fn club_code(team_id: u32) -> u32 {
    team_id + 100
}

/// `count` gameweeks; the first half has deadlines in `start_year`, the
/// rest in the following year.
pub fn events(start_year: i32, count: u32, current: Option<u32>) -> Value {
    let rows: Vec<Value> = (1..=count)
        .map(|id| {
            let year = if id <= count / 2 { start_year } else { start_year + 1 };
            let month = if id <= count / 2 { 9 } else { 3 };
            json!({
                "id": id,
                "deadline_time": format!("{year}-{month:02}-15T10:30:00Z"),
                "is_current": current == Some(id),
                "finished": current.is_some_and(|c| id <= c),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn positions() -> Value {
    json!([
        {"id": 1, "singular_name_short": "GKP", "plural_name": "Goalkeepers"},
        {"id": 2, "singular_name_short": "DEF", "plural_name": "Defenders"},
        {"id": 3, "singular_name_short": "MID", "plural_name": "Midfielders"},
        {"id": 4, "singular_name_short": "FWD", "plural_name": "Forwards"}
    ])
}

/// A player on `team` scoring `points` in the snapshot's previous gameweek.
pub fn player(code: u32, team: u32, element_type: u32, points: i32, cost: u32) -> Value {
    json!({
        "id": code % 1000,
        "web_name": format!("Player{code}"),
        "team_code": club_code(team),
        "status": "a",
        "code": code,
        "now_cost": cost,
        "chance_of_playing_next_round": null,
        "cost_change_event": 0,
        "selected_by_percent": "12.3",
        "transfers_out_event": 100,
        "transfers_in_event": 250,
        "ep_next": "4.5",
        "influence": "30.2",
        "creativity": "11.0",
        "threat": "25.0",
        "ict_index": "6.6",
        "event_points": points,
        "minutes": 90,
        "element_type": element_type,
        "team": team,
        "total_points": 40
    })
}

fn v2_teams() -> Value {
    let rows: Vec<Value> = TEAMS
        .iter()
        .map(|(id, name, strength)| {
            json!({
                "id": id,
                "name": name,
                "code": club_code(*id),
                "strength": strength,
                "short_name": &name[..3],
            })
        })
        .collect();
    Value::Array(rows)
}

/// Current-API bootstrap.
pub fn bootstrap_v2(start_year: i32, current: Option<u32>, players: Vec<Value>) -> Value {
    json!({
        "events": events(start_year, 38, current),
        "teams": v2_teams(),
        "element_types": positions(),
        "elements": players,
        "total_players": 8000000
    })
}

/// Pre-2020 bootstrap: `current-event` marker and fixtures embedded in
/// teams (1 v 2 and 3 v 4, first team at home).
pub fn bootstrap_v1(
    start_year: i32,
    event_count: u32,
    current: Option<u32>,
    players: Vec<Value>,
) -> Value {
    let teams: Vec<Value> = TEAMS
        .iter()
        .map(|(id, name, strength)| {
            let opponent = if id % 2 == 1 { id + 1 } else { id - 1 };
            json!({
                "id": id,
                "name": name,
                "code": club_code(*id),
                "strength": strength,
                "next_event_fixture": [
                    {"is_home": id % 2 == 1, "opponent": opponent, "event": current.map_or(1, |c| c + 1)}
                ]
            })
        })
        .collect();
    json!({
        "current-event": current,
        "next-event": current.map_or(1, |c| c + 1),
        "events": events(start_year, event_count, current),
        "teams": teams,
        "element_types": positions(),
        "elements": players
    })
}

/// Season fixture list: every gameweek plays 1 v 2 and 3 v 4; gameweeks up
/// to `started_upto` are flagged started.
pub fn fixture_snapshot(start_year: i32, started_upto: Option<u32>) -> Value {
    let mut rows = Vec::new();
    for gw in 1..=38u32 {
        let year = if gw <= 19 { start_year } else { start_year + 1 };
        let month = if gw <= 19 { 9 } else { 3 };
        let started = started_upto.is_some_and(|s| gw <= s);
        for (home, away) in [(1, 2), (3, 4)] {
            let (h, a) = if gw % 2 == 0 { (away, home) } else { (home, away) };
            rows.push(json!({
                "id": gw * 10 + home,
                "event": gw,
                "team_h": h,
                "team_a": a,
                "kickoff_time": format!("{year}-{month:02}-20T15:00:00Z"),
                "started": started,
                "finished": started,
            }));
        }
    }
    Value::Array(rows)
}
