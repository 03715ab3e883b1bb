use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const COLUMNS: [&str; 35] = [
    "player_id_season",
    "player_name",
    "team_id",
    "player_status",
    "player_id",
    "player_cost",
    "player_chance_play",
    "fpl_cost_change",
    "fpl_selected_by",
    "fpl_transfers_out",
    "fpl_transfers_in",
    "fpl_expected_points",
    "fpl_influence",
    "fpl_creativity",
    "fpl_threat",
    "fpl_ict_index",
    "result_points_prev",
    "stat_minutes_total_season",
    "position_id",
    "team_id_season",
    "team_name",
    "team_strength",
    "game_nb",
    "game_1_home",
    "game_1_team_name",
    "game_1_team_strength",
    "game_2_home",
    "game_2_team_name",
    "game_2_team_strength",
    "player_position",
    "gameweek_prev",
    "gameweek",
    "season_name",
    "season",
    "result_points",
];

/// One row per (season, gameweek, player).
///
/// `result_points_prev` is what the player scored in `gameweek_prev`;
/// `result_points` is the realized score of `gameweek`, recovered from the
/// next snapshot once it exists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanonicalPlayerWeek {
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
    pub team_name: String,
    pub team_strength: Option<u32>,
    pub game_nb: u8,
    pub game_1_home: Option<bool>,
    pub game_1_team_name: Option<String>,
    pub game_1_team_strength: Option<u32>,
    pub game_2_home: Option<bool>,
    pub game_2_team_name: Option<String>,
    pub game_2_team_strength: Option<u32>,
    pub player_position: String,
    pub gameweek_prev: Option<u32>,
    pub gameweek: Option<u32>,
    pub season_name: String,
    #[serde(rename = "season")]
    pub season_id: u32,
    pub result_points: Option<i32>,
}

impl CanonicalPlayerWeek {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.player_id_season.to_string(),
            self.player_name.clone(),
            self.team_id.to_string(),
            opt(&self.player_status),
            self.player_id.to_string(),
            self.player_cost.to_string(),
            opt(&self.player_chance_play),
            opt(&self.fpl_cost_change),
            opt(&self.fpl_selected_by),
            opt(&self.fpl_transfers_out),
            opt(&self.fpl_transfers_in),
            opt(&self.fpl_expected_points),
            opt(&self.fpl_influence),
            opt(&self.fpl_creativity),
            opt(&self.fpl_threat),
            opt(&self.fpl_ict_index),
            opt(&self.result_points_prev),
            opt(&self.stat_minutes_total_season),
            self.position_id.to_string(),
            self.team_id_season.to_string(),
            self.team_name.clone(),
            opt(&self.team_strength),
            self.game_nb.to_string(),
            opt(&self.game_1_home),
            opt(&self.game_1_team_name),
            opt(&self.game_1_team_strength),
            opt(&self.game_2_home),
            opt(&self.game_2_team_name),
            opt(&self.game_2_team_strength),
            self.player_position.clone(),
            opt(&self.gameweek_prev),
            opt(&self.gameweek),
            self.season_name.clone(),
            self.season_id.to_string(),
            opt(&self.result_points),
        ]
    }

    pub fn fingerprint(&self) -> String {
        self.to_record().join("\u{1f}")
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

pub fn write_csv<W: Write>(out: W, rows: &[CanonicalPlayerWeek]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(COLUMNS).context("write canonical header")?;
    for row in rows {
        wtr.write_record(row.to_record())
            .context("write canonical row")?;
    }
    wtr.flush().context("flush canonical csv")?;
    Ok(())
}

pub fn read_csv<R: Read>(input: R) -> Result<Vec<CanonicalPlayerWeek>> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<CanonicalPlayerWeek>().enumerate() {
        out.push(row.with_context(|| format!("decode canonical row {}", idx + 1))?);
    }
    Ok(out)
}

pub(crate) fn save_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(fs::File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("csv.tmp");
    let file = fs::File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    write(file)?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn save_csv(path: &Path, rows: &[CanonicalPlayerWeek]) -> Result<()> {
    save_atomic(path, |file| write_csv(file, rows))
}

pub fn load_csv(path: &Path) -> Result<Vec<CanonicalPlayerWeek>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv(file)
}
