mod common;

use std::path::PathBuf;

use common::read_fixture;
use fpl_pipeline::features::{PRIOR_AVERAGE_COLUMN, build_features, write_features_csv};
use fpl_pipeline::gameweek::GameweekReference;
use fpl_pipeline::historical::load_history_dir;
use fpl_pipeline::raw::{RawBootstrap, parse_fixtures};
use fpl_pipeline::schema_mapper::map_week;

fn history_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("player-details");
    path
}

#[test]
fn archive_lines_become_next_season_averages() {
    let (index, summary) = load_history_dir(&history_dir()).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.lines, 4);
    assert_eq!(summary.skipped_lines, 1);
    assert_eq!(summary.entries, 3);

    assert_eq!(index.get(&(118748, 14)), Some(&6.82));
    assert_eq!(index.get(&(118748, 15)), Some(&6.13));
    assert_eq!(index.get(&(223340, 16)), Some(&3.0));
    assert_eq!(index.get(&(118748, 13)), None);
}

#[test]
fn features_left_join_the_prior_season() {
    let payload = serde_json::from_str(&read_fixture("bootstrap_v2_sample.json")).unwrap();
    let raw = RawBootstrap::parse(&payload).unwrap();
    let reference = GameweekReference::from_events(&raw.events).unwrap();
    let fixtures = parse_fixtures(&serde_json::from_str(&read_fixture("fixtures_sample.json")).unwrap())
        .unwrap();
    let rows = map_week(&raw, &reference, Some(fixtures.as_slice())).unwrap();

    let (index, _) = load_history_dir(&history_dir()).unwrap();
    let features = build_features(rows, &index);
    assert_eq!(features.len(), 2);

    let saka = features.iter().find(|f| f.week.player_id == 223340).unwrap();
    assert_eq!(saka.stat_points_avg_season_prev, Some(3.0));
    let salah = features.iter().find(|f| f.week.player_id == 118748).unwrap();
    assert_eq!(salah.stat_points_avg_season_prev, None);

    let mut buf = Vec::new();
    write_features_csv(&mut buf, &features).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.ends_with(&format!(",result_points,{PRIOR_AVERAGE_COLUMN}")));
    let values: Vec<&str> = lines.map(|l| l.rsplit(',').next().unwrap()).collect();
    assert!(values.contains(&"3"));
    assert!(values.contains(&""));
}

#[test]
fn missing_archive_directory_is_an_error() {
    assert!(load_history_dir(&history_dir().join("absent")).is_err());
}
