use std::path::PathBuf;

use thiserror::Error;

use crate::scored::Position;

/// Failure to turn one raw snapshot into canonical rows.
///
/// These are always scoped to a single file: the assembler records them and
/// moves on to the next snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("section `{section}` is missing required fields: {missing:?}")]
    SchemaValidation {
        section: &'static str,
        missing: Vec<String>,
    },

    #[error("section `{section}` is absent or not a list")]
    MissingSection { section: &'static str },

    #[error("section `{section}` record {index}: {message}")]
    InvalidRecord {
        section: &'static str,
        index: usize,
        message: String,
    },

    #[error("team {team_id_season} has {games} games in gameweek {gameweek}")]
    AmbiguousFixtureData {
        team_id_season: u32,
        gameweek: u32,
        games: usize,
    },

    #[error("no fixture snapshot available for season {season}")]
    MissingFixtureSnapshot { season: String },

    #[error("event list is empty")]
    EmptyEvents,

    #[error("unreadable timestamp `{0}`")]
    BadTimestamp(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum InfeasibleError {
    #[error("only {available} {position} candidates, {required} required")]
    InsufficientCandidates {
        position: Position,
        available: usize,
        required: usize,
    },

    #[error("cheapest valid squad costs {cheapest}, budget is {budget}")]
    BudgetTooLow { cheapest: f64, budget: f64 },

    #[error("transfer limit needs {needed} players kept from the existing team, only {owned} are available")]
    TransfersUnreachable { owned: usize, needed: usize },

    #[error("no squad satisfies the constraints: {reason}")]
    Infeasible { reason: String },

    #[error("solver gave up after {secs}s")]
    Timeout { secs: u64 },

    #[error("solver failure: {0}")]
    Solver(String),
}
