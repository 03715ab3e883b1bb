mod common;

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use common::read_fixture;
use fpl_pipeline::error::InfeasibleError;
use fpl_pipeline::manager::ManagerTeam;
use fpl_pipeline::optimizer::{SQUAD_SIZE, SelectionRequest, SquadRole, SquadSelection, select_squad};
use fpl_pipeline::scored::{Position, ScoredPlayer, read_scored_csv};

const CLUBS: [&str; 6] = ["Arsenal", "Burnley", "Chelsea", "Everton", "Fulham", "Leeds"];

fn pool() -> Vec<ScoredPlayer> {
    let mut out = Vec::new();
    let mut id = 0u32;
    for (position, count) in [
        (Position::Goalkeeper, 4),
        (Position::Defender, 8),
        (Position::Midfielder, 8),
        (Position::Forward, 6),
    ] {
        for _ in 0..count {
            id += 1;
            out.push(ScoredPlayer {
                player_id: 1000 + id,
                player_id_season: Some(id),
                player_name: Some(format!("P{id}")),
                player_cost: 40.0 + ((id * 7) % 30) as f64,
                predict: 1.0 + ((id * 13) % 17) as f64 / 2.0,
                player_position: position,
                team_name: CLUBS[(id % 6) as usize].to_string(),
            });
        }
    }
    out
}

fn request(budget: f64) -> SelectionRequest {
    SelectionRequest {
        budget,
        timeout: Duration::from_secs(60),
        ..Default::default()
    }
}

fn assert_valid(selection: &SquadSelection, budget: f64) {
    assert_eq!(selection.players.len(), SQUAD_SIZE);
    for position in Position::ALL {
        assert_eq!(selection.count_position(position), position.quota(), "{position}");
    }
    let mut per_club: BTreeMap<&str, usize> = BTreeMap::new();
    for p in &selection.players {
        *per_club.entry(p.club.as_str()).or_default() += 1;
    }
    assert!(per_club.values().all(|n| *n <= 3), "{per_club:?}");
    let captains = selection
        .players
        .iter()
        .filter(|p| p.role == SquadRole::Captain)
        .count();
    assert_eq!(captains, 1);
    let ids: HashSet<u32> = selection.players.iter().map(|p| p.player_id).collect();
    assert_eq!(ids.len(), SQUAD_SIZE);
    assert!(selection.total_cost() <= budget + 1e-6);
}

#[test]
fn feasible_pool_yields_a_valid_squad() {
    let players = pool();
    let selection = select_squad(&players, &request(1000.0)).unwrap();
    assert_valid(&selection, 1000.0);

    let captain = selection.captain().unwrap();
    let base = captain.predicted_score / 2.0;
    assert!(selection
        .players
        .iter()
        .filter(|p| p.role != SquadRole::Captain)
        .all(|p| p.predicted_score <= base + 1e-9));

    let summed: f64 = selection.players.iter().map(|p| p.predicted_score).sum();
    assert!((selection.objective - summed).abs() < 1e-9);

    // Goalkeepers first, then defenders, midfielders, forwards.
    let order: Vec<Position> = selection.players.iter().map(|p| p.position).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn tight_budget_is_respected() {
    let players = pool();
    let roomy = select_squad(&players, &request(1000.0)).unwrap();
    let budget = 800.0;
    let tight = select_squad(&players, &request(budget)).unwrap();
    assert_valid(&tight, budget);
    assert!(tight.objective <= roomy.objective + 1e-9);
}

#[test]
fn club_cap_limits_a_dominant_club() {
    let mut players = pool();
    let favourites = players
        .iter_mut()
        .filter(|p| p.player_position == Position::Midfielder)
        .take(5);
    for p in favourites {
        p.team_name = "Stars".to_string();
        p.predict += 20.0;
    }
    let selection = select_squad(&players, &request(1000.0)).unwrap();
    assert_valid(&selection, 1000.0);
    let stars = selection.players.iter().filter(|p| p.club == "Stars").count();
    assert_eq!(stars, 3);
}

#[test]
fn zero_budget_is_infeasible() {
    let err = select_squad(&pool(), &request(0.0)).unwrap_err();
    assert!(matches!(err, InfeasibleError::BudgetTooLow { .. }), "{err}");
}

#[test]
fn single_club_pool_is_infeasible() {
    let mut players = pool();
    for p in &mut players {
        p.team_name = "Arsenal".to_string();
    }
    let err = select_squad(&players, &request(1000.0)).unwrap_err();
    assert!(
        matches!(err, InfeasibleError::Infeasible { .. } | InfeasibleError::Solver(_)),
        "{err}"
    );
}

#[test]
fn solver_deadline_surfaces_as_timeout() {
    let err = select_squad(
        &pool(),
        &SelectionRequest {
            timeout: Duration::ZERO,
            ..request(1000.0)
        },
    )
    .unwrap_err();
    assert!(matches!(err, InfeasibleError::Timeout { secs: 0 }), "{err}");
}

#[test]
fn too_few_forwards_is_named() {
    let players: Vec<ScoredPlayer> = pool()
        .into_iter()
        .filter(|p| p.player_position != Position::Forward || p.player_id % 3 == 0)
        .collect();
    let err = select_squad(&players, &request(1000.0)).unwrap_err();
    assert!(matches!(
        err,
        InfeasibleError::InsufficientCandidates {
            position: Position::Forward,
            required: 3,
            ..
        }
    ));
}

#[test]
fn no_free_transfers_keeps_the_existing_team() {
    let players = pool();
    let first = select_squad(&players, &request(1000.0)).unwrap();
    let existing: Vec<u32> = first.players.iter().map(|p| p.player_id).collect();

    let mut boosted = players.clone();
    for p in boosted.iter_mut().filter(|p| !existing.contains(&p.player_id)) {
        p.predict += 5.0;
    }
    let kept = select_squad(
        &boosted,
        &SelectionRequest {
            free_transfers: 0,
            existing_team: existing.clone(),
            ..request(1000.0)
        },
    )
    .unwrap();
    let mut kept_ids: Vec<u32> = kept.players.iter().map(|p| p.player_id).collect();
    let mut expected = existing.clone();
    kept_ids.sort();
    expected.sort();
    assert_eq!(kept_ids, expected);

    let one_move = select_squad(
        &boosted,
        &SelectionRequest {
            free_transfers: 1,
            existing_team: existing.clone(),
            ..request(1000.0)
        },
    )
    .unwrap();
    assert_valid(&one_move, 1000.0);
    let still_owned = one_move
        .players
        .iter()
        .filter(|p| existing.contains(&p.player_id))
        .count();
    assert!(still_owned >= SQUAD_SIZE - 1);
    assert!(one_move.objective >= kept.objective - 1e-9);
}

#[test]
fn unreachable_transfer_limit_is_named() {
    let players = pool();
    let err = select_squad(
        &players,
        &SelectionRequest {
            free_transfers: 1,
            existing_team: vec![1001, 1002, 1003],
            ..request(1000.0)
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        InfeasibleError::TransfersUnreachable { owned: 3, needed: 14 }
    ));
}

#[test]
fn manager_picks_feed_the_request() {
    let payload = serde_json::from_str(&read_fixture("manager_team.json")).unwrap();
    let team = ManagerTeam::from_value(&payload).unwrap();
    assert_eq!(team.picks.len(), 4);
    assert_eq!(team.picks[1].role, SquadRole::Captain);
    assert_eq!(team.picks[2].role, SquadRole::ViceCaptain);
    assert_eq!(team.picks[3].role, SquadRole::Bench);
    assert!((team.money_bank - 23.0).abs() < 1e-9);
    assert!((team.money_total - 300.0).abs() < 1e-9);
    assert_eq!(team.free_transfers, 2);

    let scored = read_scored_csv(
        "player_id,player_id_season,player_name,player_cost,predict,player_position,team_name\n\
         223340,22,Saka,66,4.1,MID,Arsenal\n\
         118748,233,Salah,126,8.3,MID,Liverpool\n"
            .as_bytes(),
    )
    .unwrap();
    let request = team.selection_request(&scored, false, Duration::from_secs(5));
    assert_eq!(request.existing_team, vec![223340, 118748]);
    assert_eq!(request.free_transfers, 2);
    assert!((request.budget - 300.0).abs() < 1e-9);

    let unlimited = team.selection_request(&scored, true, Duration::from_secs(5));
    assert_eq!(unlimited.free_transfers, 15);
}
