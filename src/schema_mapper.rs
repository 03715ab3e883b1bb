use std::collections::HashMap;

use tracing::debug;

use crate::canonical::CanonicalPlayerWeek;
use crate::error::SnapshotError;
use crate::fixtures::{FixtureRecord, FixtureSlot, MAX_GAMES_PER_GAMEWEEK, resolve_fixtures};
use crate::gameweek::GameweekReference;
use crate::raw::{RawBootstrap, RawFixture, RawPlayer, RawPosition, RawTeam, RawTeamV1, RawTeams};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub player_id_season: u32,
    pub player_name: String,
    pub team_id: u32,
    pub player_status: Option<String>,
    pub player_id: u32,
    pub player_cost: u32,
    pub player_chance_play: Option<u32>,
    pub fpl_cost_change: Option<i32>,
    pub fpl_selected_by: Option<f64>,
    pub fpl_transfers_out: Option<u64>,
    pub fpl_transfers_in: Option<u64>,
    pub fpl_expected_points: Option<f64>,
    pub fpl_influence: Option<f64>,
    pub fpl_creativity: Option<f64>,
    pub fpl_threat: Option<f64>,
    pub fpl_ict_index: Option<f64>,
    pub result_points_prev: Option<i32>,
    pub stat_minutes_total_season: Option<u32>,
    pub position_id: u32,
    pub team_id_season: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRow {
    pub position_id: u32,
    pub player_position: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextGame {
    pub is_home: bool,
    pub opponent_name: Option<String>,
    pub opponent_strength: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub team_name: String,
    pub team_id: u32,
    pub team_id_season: u32,
    pub team_strength: Option<u32>,
    pub game_nb: u8,
    pub game_1: Option<NextGame>,
    pub game_2: Option<NextGame>,
}

pub fn map_players(players: &[RawPlayer]) -> Vec<PlayerRow> {
    players
        .iter()
        .map(|p| PlayerRow {
            player_id_season: p.id,
            player_name: p.web_name.clone(),
            team_id: p.team_code,
            player_status: p.status.clone(),
            player_id: p.code,
            player_cost: p.now_cost,
            player_chance_play: p.chance_of_playing_next_round,
            fpl_cost_change: p.cost_change_event,
            fpl_selected_by: p.selected_by_percent,
            fpl_transfers_out: p.transfers_out_event,
            fpl_transfers_in: p.transfers_in_event,
            fpl_expected_points: p.ep_next,
            fpl_influence: p.influence,
            fpl_creativity: p.creativity,
            fpl_threat: p.threat,
            fpl_ict_index: p.ict_index,
            result_points_prev: p.event_points,
            stat_minutes_total_season: p.minutes,
            position_id: p.element_type,
            team_id_season: p.team,
        })
        .collect()
}

pub fn map_positions(positions: &[RawPosition]) -> Vec<PositionRow> {
    positions
        .iter()
        .map(|p| PositionRow {
            position_id: p.id,
            player_position: p.singular_name_short.clone(),
        })
        .collect()
}

pub fn map_teams(
    raw: &RawBootstrap,
    reference: &GameweekReference,
    fixtures: Option<&[RawFixture]>,
) -> Result<Vec<TeamRow>, SnapshotError> {
    let target_gw = reference.next.or(reference.previous);
    match &raw.teams {
        RawTeams::V1(teams) => map_teams_v1(teams, target_gw.unwrap_or(0)),
        RawTeams::V2(teams) => {
            let fixtures = fixtures.ok_or_else(|| SnapshotError::MissingFixtureSnapshot {
                season: reference.season.name(),
            })?;
            let records = match target_gw {
                Some(gw) => resolve_fixtures(fixtures, gw)?,
                None => Vec::new(),
            };
            Ok(map_teams_v2(teams, &records))
        }
    }
}

pub fn map_teams_v1(teams: &[RawTeamV1], gameweek: u32) -> Result<Vec<TeamRow>, SnapshotError> {
    let lookup = opponent_lookup(teams.iter().map(|t| &t.team));
    let mut out = Vec::with_capacity(teams.len());
    for t in teams {
        if t.next_event_fixture.len() > MAX_GAMES_PER_GAMEWEEK {
            return Err(SnapshotError::AmbiguousFixtureData {
                team_id_season: t.team.id,
                gameweek,
                games: t.next_event_fixture.len(),
            });
        }
        let slots: Vec<FixtureSlot> = t
            .next_event_fixture
            .iter()
            .map(|f| FixtureSlot {
                is_home: f.is_home,
                opponent_team_id_season: f.opponent,
            })
            .collect();
        out.push(team_row(&t.team, &slots, &lookup));
    }
    Ok(out)
}

pub fn map_teams_v2(teams: &[RawTeam], records: &[FixtureRecord]) -> Vec<TeamRow> {
    let lookup = opponent_lookup(teams.iter());
    let by_team: HashMap<u32, &FixtureRecord> =
        records.iter().map(|r| (r.team_id_season, r)).collect();
    teams
        .iter()
        .map(|t| {
            let slots = by_team
                .get(&t.id)
                .map(|r| r.games.as_slice())
                .unwrap_or(&[]);
            team_row(t, slots, &lookup)
        })
        .collect()
}

fn opponent_lookup<'a>(
    teams: impl Iterator<Item = &'a RawTeam>,
) -> HashMap<u32, (String, Option<u32>)> {
    teams
        .map(|t| (t.id, (t.name.clone(), t.strength)))
        .collect()
}

fn team_row(
    team: &RawTeam,
    slots: &[FixtureSlot],
    lookup: &HashMap<u32, (String, Option<u32>)>,
) -> TeamRow {
    let resolve = |slot: &FixtureSlot| {
        let opponent = lookup.get(&slot.opponent_team_id_season);
        NextGame {
            is_home: slot.is_home,
            opponent_name: opponent.map(|(name, _)| name.clone()),
            opponent_strength: opponent.and_then(|(_, strength)| *strength),
        }
    };
    TeamRow {
        team_name: team.name.clone(),
        team_id: team.code,
        team_id_season: team.id,
        team_strength: team.strength,
        game_nb: slots.len() as u8,
        game_1: slots.first().map(resolve),
        game_2: slots.get(1).map(resolve),
    }
}

pub fn map_week(
    raw: &RawBootstrap,
    reference: &GameweekReference,
    fixtures: Option<&[RawFixture]>,
) -> Result<Vec<CanonicalPlayerWeek>, SnapshotError> {
    let players = map_players(&raw.players);
    let teams = map_teams(raw, reference, fixtures)?;
    let positions = map_positions(&raw.positions);

    let teams_by_code: HashMap<u32, &TeamRow> = teams.iter().map(|t| (t.team_id, t)).collect();
    let positions_by_id: HashMap<u32, &PositionRow> =
        positions.iter().map(|p| (p.position_id, p)).collect();

    let season_name = reference.season.name();
    let season_id = reference.season.id();
    let mut out = Vec::with_capacity(players.len());
    for p in players {
        let (Some(team), Some(position)) = (
            teams_by_code.get(&p.team_id),
            positions_by_id.get(&p.position_id),
        ) else {
            continue;
        };
        out.push(CanonicalPlayerWeek {
            player_id_season: p.player_id_season,
            player_name: p.player_name,
            team_id: p.team_id,
            player_status: p.player_status,
            player_id: p.player_id,
            player_cost: p.player_cost,
            player_chance_play: p.player_chance_play,
            fpl_cost_change: p.fpl_cost_change,
            fpl_selected_by: p.fpl_selected_by,
            fpl_transfers_out: p.fpl_transfers_out,
            fpl_transfers_in: p.fpl_transfers_in,
            fpl_expected_points: p.fpl_expected_points,
            fpl_influence: p.fpl_influence,
            fpl_creativity: p.fpl_creativity,
            fpl_threat: p.fpl_threat,
            fpl_ict_index: p.fpl_ict_index,
            result_points_prev: p.result_points_prev,
            stat_minutes_total_season: p.stat_minutes_total_season,
            position_id: p.position_id,
            team_id_season: p.team_id_season,
            team_name: team.team_name.clone(),
            team_strength: team.team_strength,
            game_nb: team.game_nb,
            game_1_home: team.game_1.as_ref().map(|g| g.is_home),
            game_1_team_name: team.game_1.as_ref().and_then(|g| g.opponent_name.clone()),
            game_1_team_strength: team.game_1.as_ref().and_then(|g| g.opponent_strength),
            game_2_home: team.game_2.as_ref().map(|g| g.is_home),
            game_2_team_name: team.game_2.as_ref().and_then(|g| g.opponent_name.clone()),
            game_2_team_strength: team.game_2.as_ref().and_then(|g| g.opponent_strength),
            player_position: position.player_position.clone(),
            gameweek_prev: reference.previous,
            gameweek: reference.next,
            season_name: season_name.clone(),
            season_id,
            result_points: None,
        });
    }
    debug!(
        season = %season_name,
        previous = ?reference.previous,
        players = raw.players.len(),
        rows = out.len(),
        "mapped snapshot week"
    );
    Ok(out)
}
