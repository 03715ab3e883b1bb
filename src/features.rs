use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::canonical::{COLUMNS, CanonicalPlayerWeek, save_atomic};
use crate::historical::HistoryIndex;

pub const PRIOR_AVERAGE_COLUMN: &str = "stat_points_avg_season_prev";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub week: CanonicalPlayerWeek,
    pub stat_points_avg_season_prev: Option<f64>,
}

pub fn build_features(rows: Vec<CanonicalPlayerWeek>, history: &HistoryIndex) -> Vec<FeatureRow> {
    rows.into_iter()
        .map(|week| {
            let avg = history.get(&(week.player_id, week.season_id)).copied();
            FeatureRow {
                week,
                stat_points_avg_season_prev: avg,
            }
        })
        .collect()
}

pub fn write_features_csv<W: Write>(out: W, rows: &[FeatureRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let header = COLUMNS.iter().copied().chain(std::iter::once(PRIOR_AVERAGE_COLUMN));
    wtr.write_record(header).context("write features header")?;
    for row in rows {
        let mut record = row.week.to_record();
        record.push(
            row.stat_points_avg_season_prev
                .map(|v| v.to_string())
                .unwrap_or_default(),
        );
        wtr.write_record(&record).context("write features row")?;
    }
    wtr.flush().context("flush features csv")?;
    Ok(())
}

pub fn save_features_csv(path: &Path, rows: &[FeatureRow]) -> Result<()> {
    save_atomic(path, |file| write_features_csv(file, rows))
}
