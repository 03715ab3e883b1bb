use anyhow::{Context, Result};

use fpl_pipeline::assembler;
use fpl_pipeline::canonical;
use fpl_pipeline::config::{self, PipelineConfig};
use fpl_pipeline::logging;

fn main() -> Result<()> {
    logging::init_logging();
    let mut cfg = PipelineConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(dir) = config::parse_path_flag(&args, "data-dir") {
        cfg.data_dir = dir;
    }
    let bootstrap_dir =
        config::parse_path_flag(&args, "bootstrap-dir").unwrap_or_else(|| cfg.bootstrap_dir());
    let fixture_dir =
        config::parse_path_flag(&args, "fixtures-dir").unwrap_or_else(|| cfg.fixture_dir());
    let out_path = config::parse_path_flag(&args, "out").unwrap_or_else(|| cfg.canonical_csv());

    let output = assembler::assemble_from_dirs(&bootstrap_dir, &fixture_dir);
    canonical::save_csv(&out_path, &output.rows)
        .with_context(|| format!("write canonical table to {}", out_path.display()))?;

    let summary = &output.summary;
    println!("Bootstrap preprocessing complete");
    println!("Output: {}", out_path.display());
    println!(
        "Snapshots: {} bootstrap / {} fixtures",
        summary.bootstrap_files, summary.fixture_files
    );
    println!(
        "Weeks used: {} (superseded: {})",
        summary.bootstrap_used, summary.superseded
    );
    println!("Rows written: {}", summary.rows);
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
