use std::collections::BTreeSet;

use crate::error::SnapshotError;
use crate::raw::RawFixture;

pub const MAX_GAMES_PER_GAMEWEEK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureSlot {
    pub is_home: bool,
    pub opponent_team_id_season: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRecord {
    pub team_id_season: u32,
    pub games: Vec<FixtureSlot>,
}

impl FixtureRecord {
    pub fn game_nb(&self) -> u8 {
        self.games.len() as u8
    }

    pub fn slot(&self, idx: usize) -> Option<&FixtureSlot> {
        self.games.get(idx)
    }
}

/// Per-team fixtures of `gameweek`, ordered by team id.
///
/// Within a team, home games come first and away games second, each in the
/// order they appear in `fixtures`. Teams without a game are left out.
pub fn resolve_fixtures(
    fixtures: &[RawFixture],
    gameweek: u32,
) -> Result<Vec<FixtureRecord>, SnapshotError> {
    let in_gw: Vec<&RawFixture> = fixtures
        .iter()
        .filter(|f| f.event == Some(gameweek))
        .collect();

    let teams: BTreeSet<u32> = in_gw
        .iter()
        .flat_map(|f| [f.team_h, f.team_a])
        .collect();

    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        let home = in_gw.iter().filter(|f| f.team_h == team).map(|f| FixtureSlot {
            is_home: true,
            opponent_team_id_season: f.team_a,
        });
        let away = in_gw.iter().filter(|f| f.team_a == team).map(|f| FixtureSlot {
            is_home: false,
            opponent_team_id_season: f.team_h,
        });
        let games: Vec<FixtureSlot> = home.chain(away).collect();
        if games.len() > MAX_GAMES_PER_GAMEWEEK {
            return Err(SnapshotError::AmbiguousFixtureData {
                team_id_season: team,
                gameweek,
                games: games.len(),
            });
        }
        out.push(FixtureRecord {
            team_id_season: team,
            games,
        });
    }
    Ok(out)
}
