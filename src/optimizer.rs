//! 0/1 squad selection.
//!
//! Every candidate appears twice: once as a normal pick and once as the
//! captain, whose score counts double. One binary variable per row lets the
//! program choose the captain without a separate multiplier term; a
//! per-player constraint keeps the two copies mutually exclusive.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    microlp, variable,
};
use tracing::{debug, info};

use crate::config::{DEFAULT_BUDGET, DEFAULT_FREE_TRANSFERS};
use crate::error::InfeasibleError;
use crate::scored::{Position, ScoredPlayer};

pub const SQUAD_SIZE: usize = 15;
pub const MAX_PER_CLUB: usize = 3;
const CAPTAIN_MULTIPLIER: f64 = 2.0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquadRole {
    Bench,
    Normal,
    Captain,
    ViceCaptain,
}

impl fmt::Display for SquadRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SquadRole::Bench => "BENCH",
            SquadRole::Normal => "NORMAL",
            SquadRole::Captain => "CAPTAIN",
            SquadRole::ViceCaptain => "VICE_CAPTAIN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub budget: f64,
    pub free_transfers: u32,
    pub existing_team: Vec<u32>,
    pub timeout: Duration,
}

impl Default for SelectionRequest {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET as f64,
            free_transfers: DEFAULT_FREE_TRANSFERS,
            existing_team: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlayer {
    pub player_id: u32,
    pub player_name: Option<String>,
    pub cost: f64,
    /// Score as counted in the objective (doubled for the captain).
    pub predicted_score: f64,
    pub position: Position,
    pub club: String,
    pub role: SquadRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquadSelection {
    pub objective: f64,
    pub players: Vec<SelectedPlayer>,
}

impl SquadSelection {
    pub fn total_cost(&self) -> f64 {
        self.players.iter().map(|p| p.cost).sum()
    }

    pub fn captain(&self) -> Option<&SelectedPlayer> {
        self.players.iter().find(|p| p.role == SquadRole::Captain)
    }

    pub fn count_position(&self, position: Position) -> usize {
        self.players.iter().filter(|p| p.position == position).count()
    }
}

#[derive(Debug, Clone)]
struct CandidateRow {
    player_idx: usize,
    captain: bool,
    score: f64,
}

pub fn select_squad(
    players: &[ScoredPlayer],
    request: &SelectionRequest,
) -> Result<SquadSelection, InfeasibleError> {
    let candidates = distinct_candidates(players);
    precheck(&candidates, request)?;

    let rows = candidate_rows(&candidates);
    let owned: HashSet<u32> = request.existing_team.iter().copied().collect();
    let problem = Problem {
        candidates: candidates.clone(),
        rows: rows.clone(),
        owned,
        budget: request.budget,
        free_transfers: request.free_transfers,
    };

    let started = Instant::now();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(problem.solve());
    });
    let chosen = match rx.recv_timeout(request.timeout) {
        Ok(result) => result?,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            return Err(InfeasibleError::Timeout {
                secs: request.timeout.as_secs(),
            });
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(InfeasibleError::Solver(
                "solver thread exited without a result".to_string(),
            ));
        }
    };
    debug!(rows = rows.len(), elapsed_ms = started.elapsed().as_millis() as u64, "solved");

    let selection = decode(&candidates, &rows, &chosen);
    info!(
        objective = selection.objective,
        cost = selection.total_cost(),
        budget = request.budget,
        "squad selected"
    );
    Ok(selection)
}

fn distinct_candidates(players: &[ScoredPlayer]) -> Vec<ScoredPlayer> {
    let mut seen = HashSet::new();
    players
        .iter()
        .filter(|p| p.predict.is_finite() && p.player_cost.is_finite())
        .filter(|p| seen.insert(p.player_id))
        .cloned()
        .collect()
}

fn candidate_rows(candidates: &[ScoredPlayer]) -> Vec<CandidateRow> {
    let mut rows = Vec::with_capacity(candidates.len() * 2);
    for (idx, p) in candidates.iter().enumerate() {
        rows.push(CandidateRow {
            player_idx: idx,
            captain: false,
            score: p.predict,
        });
        rows.push(CandidateRow {
            player_idx: idx,
            captain: true,
            score: p.predict * CAPTAIN_MULTIPLIER,
        });
    }
    rows
}

fn precheck(candidates: &[ScoredPlayer], request: &SelectionRequest) -> Result<(), InfeasibleError> {
    let mut by_position: BTreeMap<Position, Vec<f64>> = BTreeMap::new();
    for p in candidates {
        by_position
            .entry(p.player_position)
            .or_default()
            .push(p.player_cost);
    }

    let mut cheapest = 0.0;
    for position in Position::ALL {
        let mut costs = by_position.remove(&position).unwrap_or_default();
        if costs.len() < position.quota() {
            return Err(InfeasibleError::InsufficientCandidates {
                position,
                available: costs.len(),
                required: position.quota(),
            });
        }
        costs.sort_by(f64::total_cmp);
        cheapest += costs.iter().take(position.quota()).sum::<f64>();
    }
    if cheapest > request.budget {
        return Err(InfeasibleError::BudgetTooLow {
            cheapest,
            budget: request.budget,
        });
    }

    let needed = SQUAD_SIZE.saturating_sub(request.free_transfers as usize);
    if needed > 0 {
        let existing: HashSet<u32> = request.existing_team.iter().copied().collect();
        let owned = candidates
            .iter()
            .filter(|p| existing.contains(&p.player_id))
            .count();
        if owned < needed {
            return Err(InfeasibleError::TransfersUnreachable { owned, needed });
        }
    }
    Ok(())
}

struct Problem {
    candidates: Vec<ScoredPlayer>,
    rows: Vec<CandidateRow>,
    owned: HashSet<u32>,
    budget: f64,
    free_transfers: u32,
}

impl Problem {
    fn solve(&self) -> Result<Vec<usize>, InfeasibleError> {
        let mut vars = ProblemVariables::new();
        let x: Vec<Variable> = self
            .rows
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let n = self.rows.len();
        let mut objective = Expression::with_capacity(n);
        let mut total = Expression::with_capacity(n);
        let mut cost = Expression::with_capacity(n);
        let mut kept = Expression::with_capacity(n);
        let mut captains = Expression::with_capacity(n / 2);
        let mut per_position: BTreeMap<Position, Expression> = Position::ALL
            .iter()
            .map(|&p| (p, Expression::with_capacity(n / 4)))
            .collect();
        let mut per_club: BTreeMap<&str, Expression> = BTreeMap::new();
        let mut per_player: Vec<Expression> =
            (0..self.candidates.len()).map(|_| Expression::with_capacity(2)).collect();

        for (row, &var) in self.rows.iter().zip(&x) {
            let player = &self.candidates[row.player_idx];
            objective.add_mul(row.score, var);
            total += var;
            cost.add_mul(player.player_cost, var);
            if self.owned.contains(&player.player_id) {
                kept += var;
            }
            if row.captain {
                captains += var;
            }
            if let Some(expr) = per_position.get_mut(&player.player_position) {
                *expr += var;
            }
            *per_club
                .entry(player.team_name.as_str())
                .or_insert_with(|| Expression::with_capacity(8)) += var;
            per_player[row.player_idx] += var;
        }

        let squad = SQUAD_SIZE as f64;
        let budget = self.budget;
        let transfers_floor = squad - self.free_transfers as f64;
        let club_cap = MAX_PER_CLUB as f64;
        let mut model = vars
            .maximise(objective)
            .using(microlp)
            .with(constraint!(total == squad))
            .with(constraint!(cost <= budget))
            .with(constraint!(kept >= transfers_floor))
            .with(constraint!(captains == 1.0));
        for (position, expr) in per_position {
            let quota = position.quota() as f64;
            model = model.with(constraint!(expr == quota));
        }
        for (_, expr) in per_club {
            model = model.with(constraint!(expr <= club_cap));
        }
        for expr in per_player {
            model = model.with(constraint!(expr <= 1.0));
        }

        let solution = model.solve().map_err(|err| match err {
            ResolutionError::Infeasible => InfeasibleError::Infeasible {
                reason: "club cap, position quotas, budget and transfer limit cannot all hold"
                    .to_string(),
            },
            other => InfeasibleError::Solver(other.to_string()),
        })?;

        Ok(x.iter()
            .enumerate()
            .filter(|(_, var)| solution.value(**var) > 0.5)
            .map(|(idx, _)| idx)
            .collect())
    }
}

fn decode(candidates: &[ScoredPlayer], rows: &[CandidateRow], chosen: &[usize]) -> SquadSelection {
    let mut players: Vec<SelectedPlayer> = chosen
        .iter()
        .map(|&idx| {
            let row = &rows[idx];
            let p = &candidates[row.player_idx];
            SelectedPlayer {
                player_id: p.player_id,
                player_name: p.player_name.clone(),
                cost: p.player_cost,
                predicted_score: row.score,
                position: p.player_position,
                club: p.team_name.clone(),
                role: if row.captain {
                    SquadRole::Captain
                } else {
                    SquadRole::Normal
                },
            }
        })
        .collect();
    players.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(b.predicted_score.total_cmp(&a.predicted_score))
            .then(a.player_id.cmp(&b.player_id))
    });
    let objective = players.iter().map(|p| p.predicted_score).sum();
    SquadSelection { objective, players }
}
