use anyhow::{Context, Result};

use fpl_pipeline::canonical;
use fpl_pipeline::config::{self, PipelineConfig};
use fpl_pipeline::features;
use fpl_pipeline::historical;
use fpl_pipeline::logging;

fn main() -> Result<()> {
    logging::init_logging();
    let mut cfg = PipelineConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(dir) = config::parse_path_flag(&args, "data-dir") {
        cfg.data_dir = dir;
    }
    let canonical_path =
        config::parse_path_flag(&args, "canonical").unwrap_or_else(|| cfg.canonical_csv());
    let history_dir =
        config::parse_path_flag(&args, "history-dir").unwrap_or_else(|| cfg.player_details_dir());
    let out_path = config::parse_path_flag(&args, "out").unwrap_or_else(|| cfg.features_csv());

    let rows = canonical::load_csv(&canonical_path)?;
    let (history, summary) = historical::load_history_dir(&history_dir)
        .context("load player history archive")?;
    let features = features::build_features(rows, &history);
    let matched = features
        .iter()
        .filter(|r| r.stat_points_avg_season_prev.is_some())
        .count();
    features::save_features_csv(&out_path, &features)
        .with_context(|| format!("write features to {}", out_path.display()))?;

    println!("Feature build complete");
    println!("Output: {}", out_path.display());
    println!(
        "History: {} files, {} lines, {} season averages",
        summary.files, summary.lines, summary.entries
    );
    println!(
        "Rows: {} ({} with a prior-season average)",
        features.len(),
        matched
    );
    if summary.skipped_lines > 0 {
        println!("Skipped history lines: {}", summary.skipped_lines);
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
