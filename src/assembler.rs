use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::canonical::CanonicalPlayerWeek;
use crate::error::SnapshotError;
use crate::gameweek::{DISRUPTED_SEASON, GameweekReference};
use crate::raw::{RawBootstrap, RawFixture, SchemaVersion, parse_fixtures};
use crate::schema_mapper::map_week;

const DISRUPTED_PLACEHOLDER_GWS: std::ops::RangeInclusive<u32> = 30..=38;
const DEFAULT_CHANCE_PLAY: u32 = 100;

#[derive(Debug, Clone)]
pub struct NamedSnapshot {
    pub name: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Default)]
pub struct AssembleSummary {
    pub bootstrap_files: usize,
    pub fixture_files: usize,
    pub bootstrap_used: usize,
    pub superseded: usize,
    pub rows: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssembleOutput {
    pub rows: Vec<CanonicalPlayerWeek>,
    pub summary: AssembleSummary,
}

pub fn assemble(bootstraps: &[NamedSnapshot], fixtures: &[NamedSnapshot]) -> AssembleOutput {
    let mut summary = AssembleSummary {
        bootstrap_files: bootstraps.len(),
        fixture_files: fixtures.len(),
        ..Default::default()
    };

    let fixtures_by_season = latest_fixtures_per_season(fixtures, &mut summary.errors);

    let mut ordered: Vec<&NamedSnapshot> = bootstraps.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    // Later files of the same season/gameweek replace earlier ones.
    let mut latest: BTreeMap<String, (&NamedSnapshot, RawBootstrap, GameweekReference)> =
        BTreeMap::new();
    for snapshot in ordered {
        let parsed = RawBootstrap::parse(&snapshot.payload).and_then(|raw| {
            let reference = GameweekReference::from_events(&raw.events)?;
            Ok((raw, reference))
        });
        match parsed {
            Ok((raw, reference)) => {
                let key = reference.dedup_key();
                debug!(file = %snapshot.name, key = %key, "screened bootstrap");
                if let Some((previous, _, _)) = latest.insert(key, (snapshot, raw, reference)) {
                    debug!(file = %previous.name, "superseded by a later snapshot");
                    summary.superseded += 1;
                }
            }
            Err(err) => record_error(&mut summary.errors, &snapshot.name, &err),
        }
    }

    let mut weeks = Vec::new();
    for (snapshot, raw, reference) in latest.values() {
        let season_fixtures = match raw.version {
            SchemaVersion::V1 => None,
            SchemaVersion::V2 => fixtures_by_season
                .get(&reference.season.name())
                .map(|(_, rows)| rows.as_slice()),
        };
        match map_week(raw, reference, season_fixtures) {
            Ok(rows) => {
                info!(
                    file = %snapshot.name,
                    version = ?raw.version,
                    season = %reference.season,
                    previous = ?reference.previous,
                    rows = rows.len(),
                    "preprocessed bootstrap"
                );
                summary.bootstrap_used += 1;
                weeks.extend(rows);
            }
            Err(err) => record_error(&mut summary.errors, &snapshot.name, &err),
        }
    }

    let rows = clean(attach_results(drop_exact_duplicates(weeks)));
    summary.rows = rows.len();
    AssembleOutput { rows, summary }
}

pub fn assemble_from_dirs(bootstrap_dir: &Path, fixture_dir: &Path) -> AssembleOutput {
    let mut errors = Vec::new();
    let bootstraps = load_snapshot_dir(bootstrap_dir, &mut errors);
    let fixtures = load_snapshot_dir(fixture_dir, &mut errors);
    let mut out = assemble(&bootstraps, &fixtures);
    errors.append(&mut out.summary.errors);
    out.summary.errors = errors;
    out
}

pub fn load_snapshot_dir(dir: &Path, errors: &mut Vec<String>) -> Vec<NamedSnapshot> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            errors.push(format!("{}: {err}", dir.display()));
            return Vec::new();
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let loaded: Vec<(String, Result<Value, SnapshotError>)> = paths
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, read_json(path))
        })
        .collect();

    let mut out = Vec::with_capacity(loaded.len());
    for (name, result) in loaded {
        match result {
            Ok(payload) => out.push(NamedSnapshot { name, payload }),
            Err(err) => record_error(errors, &name, &err),
        }
    }
    out
}

fn read_json(path: &Path) -> Result<Value, SnapshotError> {
    let raw = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(raw.trim())?)
}

fn record_error(errors: &mut Vec<String>, name: &str, err: &SnapshotError) {
    warn!(file = %name, error = %err, "skipping snapshot");
    errors.push(format!("{name}: {err}"));
}

/// Season name → (previous gameweek, fixtures) of its most advanced snapshot.
/// On equal progress the later file wins.
fn latest_fixtures_per_season(
    fixtures: &[NamedSnapshot],
    errors: &mut Vec<String>,
) -> HashMap<String, (Option<u32>, Vec<RawFixture>)> {
    let mut ordered: Vec<&NamedSnapshot> = fixtures.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut by_season: HashMap<String, (Option<u32>, Vec<RawFixture>)> = HashMap::new();
    for snapshot in ordered {
        let parsed = parse_fixtures(&snapshot.payload).and_then(|rows| {
            let reference = GameweekReference::from_fixtures(&rows)?;
            Ok((rows, reference))
        });
        let (rows, reference) = match parsed {
            Ok(v) => v,
            Err(err) => {
                record_error(errors, &snapshot.name, &err);
                continue;
            }
        };
        let season = reference.season.name();
        let replace = by_season
            .get(&season)
            .is_none_or(|(prev_gw, _)| reference.previous >= *prev_gw);
        if replace {
            debug!(file = %snapshot.name, season = %season, previous = ?reference.previous, "fixture snapshot selected");
            by_season.insert(season, (reference.previous, rows));
        }
    }
    by_season
}

pub fn drop_exact_duplicates(rows: Vec<CanonicalPlayerWeek>) -> Vec<CanonicalPlayerWeek> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.fingerprint()))
        .collect()
}

/// Left-join each row with the realized score of its own gameweek, which
/// is the `result_points_prev` of the snapshot whose previous gameweek it is.
pub fn attach_results(mut rows: Vec<CanonicalPlayerWeek>) -> Vec<CanonicalPlayerWeek> {
    let mut realized: HashMap<(u32, u32, u32), Option<i32>> = HashMap::with_capacity(rows.len());
    for row in &rows {
        let Some(gw) = row.gameweek_prev else {
            continue;
        };
        realized
            .entry((row.season_id, gw, row.player_id))
            .or_insert(row.result_points_prev);
    }
    for row in &mut rows {
        row.result_points = row
            .gameweek
            .and_then(|gw| realized.get(&(row.season_id, gw, row.player_id)).copied())
            .flatten();
    }
    rows
}

pub fn clean(rows: Vec<CanonicalPlayerWeek>) -> Vec<CanonicalPlayerWeek> {
    let mut out: Vec<CanonicalPlayerWeek> = rows
        .into_iter()
        .filter(|r| r.gameweek.is_some())
        .filter(|r| {
            !(r.season_name == DISRUPTED_SEASON
                && r.gameweek_prev
                    .is_some_and(|gw| DISRUPTED_PLACEHOLDER_GWS.contains(&gw)))
        })
        .map(|mut r| {
            r.player_chance_play.get_or_insert(DEFAULT_CHANCE_PLAY);
            if r.gameweek == Some(1) {
                r.result_points_prev = None;
                r.stat_minutes_total_season = None;
            }
            r
        })
        .collect();
    out.sort_by(|a, b| {
        (a.season_id, a.gameweek, a.player_id, a.player_id_season)
            .cmp(&(b.season_id, b.gameweek, b.player_id, b.player_id_season))
    });
    out
}
