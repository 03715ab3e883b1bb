use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::gameweek::season_id;

const GAMEWEEKS_PER_SEASON: f64 = 38.0;

#[derive(Debug, Clone, Deserialize)]
struct PlayerHistoryLine {
    #[serde(default)]
    history_past: Vec<PastSeason>,
}

#[derive(Debug, Clone, Deserialize)]
struct PastSeason {
    season_name: String,
    element_code: u32,
    #[serde(default)]
    total_points: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorSeasonAverage {
    pub player_id: u32,
    pub season_id: u32,
    pub stat_points_avg_season_prev: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HistorySummary {
    pub files: usize,
    pub lines: usize,
    pub skipped_lines: usize,
    pub entries: usize,
    pub errors: Vec<String>,
}

pub type HistoryIndex = BTreeMap<(u32, u32), f64>;

pub fn parse_history_line(line: &str) -> Result<Vec<PriorSeasonAverage>> {
    let parsed: PlayerHistoryLine =
        serde_json::from_str(line.trim()).context("invalid player history json")?;
    let mut out = Vec::with_capacity(parsed.history_past.len());
    for past in parsed.history_past {
        let Some(id) = season_id(&past.season_name) else {
            debug!(season = %past.season_name, "unparseable season name");
            continue;
        };
        let Some(total) = past.total_points else {
            continue;
        };
        out.push(PriorSeasonAverage {
            player_id: past.element_code,
            season_id: id + 1,
            stat_points_avg_season_prev: round2(total as f64 / GAMEWEEKS_PER_SEASON),
        });
    }
    Ok(out)
}

pub fn index_history(rows: impl IntoIterator<Item = PriorSeasonAverage>) -> HistoryIndex {
    rows.into_iter()
        .map(|r| ((r.player_id, r.season_id), r.stat_points_avg_season_prev))
        .collect()
}

pub fn load_history_dir(dir: &Path) -> Result<(HistoryIndex, HistorySummary)> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read history dir {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut summary = HistorySummary {
        files: paths.len(),
        ..Default::default()
    };
    let mut rows = Vec::new();
    for path in &paths {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            summary.lines += 1;
            match parse_history_line(line) {
                Ok(mut parsed) => rows.append(&mut parsed),
                Err(err) => {
                    summary.skipped_lines += 1;
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                    let msg = format!("{}:{}: {err:#}", name.unwrap_or_default(), idx + 1);
                    warn!("{msg}");
                    summary.errors.push(msg);
                }
            }
        }
    }
    let index = index_history(rows);
    summary.entries = index.len();
    Ok((index, summary))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
