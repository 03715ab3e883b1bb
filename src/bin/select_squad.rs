use anyhow::{Context, Result};

use fpl_pipeline::config::{self, PipelineConfig};
use fpl_pipeline::logging;
use fpl_pipeline::manager::ManagerTeam;
use fpl_pipeline::optimizer::{self, SelectionRequest};
use fpl_pipeline::scored;

fn main() -> Result<()> {
    logging::init_logging();
    let cfg = PipelineConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let scored_path =
        config::parse_path_flag(&args, "scored").context("missing --scored <csv path>")?;
    let players = scored::load_scored_csv(&scored_path)?;

    let mut request = match config::parse_path_flag(&args, "picks") {
        Some(path) => {
            let team = ManagerTeam::load(&path)?;
            let unlimited = args.iter().any(|a| a == "--unlimited-transfers");
            team.selection_request(&players, unlimited, cfg.solver_timeout)
        }
        None => SelectionRequest {
            budget: cfg.budget as f64,
            free_transfers: cfg.free_transfers,
            existing_team: Vec::new(),
            timeout: cfg.solver_timeout,
        },
    };
    if let Some(budget) = config::parse_u32_flag(&args, "budget") {
        request.budget = budget as f64;
    }
    if let Some(free) = config::parse_u32_flag(&args, "free-transfers") {
        request.free_transfers = free;
    }

    let selection = optimizer::select_squad(&players, &request)
        .with_context(|| format!("select squad from {}", scored_path.display()))?;

    println!("Squad selection complete");
    println!("Candidates: {}", players.len());
    println!(
        "Budget: {} (spent {})",
        request.budget,
        selection.total_cost()
    );
    println!("Objective: {:.2}", selection.objective);
    println!(
        "{:<4} {:>9} {:<22} {:<18} {:>6} {:>7} {}",
        "pos", "player", "name", "club", "cost", "score", "role"
    );
    for p in &selection.players {
        println!(
            "{:<4} {:>9} {:<22} {:<18} {:>6.1} {:>7.2} {}",
            p.position.code(),
            p.player_id,
            p.player_name.as_deref().unwrap_or("-"),
            p.club,
            p.cost,
            p.predicted_score,
            p.role
        );
    }

    Ok(())
}
