use std::collections::BTreeSet;

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::error::SnapshotError;

pub const PLAYER_COLUMNS: [&str; 20] = [
    "id",
    "web_name",
    "team_code",
    "status",
    "code",
    "now_cost",
    "chance_of_playing_next_round",
    "cost_change_event",
    "selected_by_percent",
    "transfers_out_event",
    "transfers_in_event",
    "ep_next",
    "influence",
    "creativity",
    "threat",
    "ict_index",
    "event_points",
    "minutes",
    "element_type",
    "team",
];
pub const POSITION_COLUMNS: [&str; 2] = ["id", "singular_name_short"];
pub const TEAM_COLUMNS: [&str; 4] = ["id", "name", "code", "strength"];
pub const TEAM_V1_COLUMNS: [&str; 5] = ["id", "name", "code", "strength", "next_event_fixture"];
pub const EVENT_COLUMNS: [&str; 3] = ["id", "deadline_time", "is_current"];
pub const FIXTURE_COLUMNS: [&str; 5] = ["event", "team_h", "team_a", "kickoff_time", "started"];

const V1_MARKER: &str = "current-event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    pub fn detect(payload: &Value) -> Self {
        if payload.get(V1_MARKER).is_some() {
            SchemaVersion::V1
        } else {
            SchemaVersion::V2
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: u32,
    pub web_name: String,
    pub team_code: u32,
    #[serde(default)]
    pub status: Option<String>,
    pub code: u32,
    pub now_cost: u32,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u32>,
    #[serde(default)]
    pub cost_change_event: Option<i32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub selected_by_percent: Option<f64>,
    #[serde(default)]
    pub transfers_out_event: Option<u64>,
    #[serde(default)]
    pub transfers_in_event: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ep_next: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub influence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub creativity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub threat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ict_index: Option<f64>,
    #[serde(default)]
    pub event_points: Option<i32>,
    #[serde(default)]
    pub minutes: Option<u32>,
    pub element_type: u32,
    pub team: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    pub id: u32,
    pub singular_name_short: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
    pub code: u32,
    #[serde(default)]
    pub strength: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamV1 {
    #[serde(flatten)]
    pub team: RawTeam,
    #[serde(default)]
    pub next_event_fixture: Vec<RawEmbeddedFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEmbeddedFixture {
    pub is_home: bool,
    pub opponent: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: u32,
    #[serde(default)]
    pub deadline_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_current: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFixture {
    #[serde(default)]
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub started: bool,
}

#[derive(Debug, Clone)]
pub enum RawTeams {
    V1(Vec<RawTeamV1>),
    V2(Vec<RawTeam>),
}

#[derive(Debug, Clone)]
pub struct RawBootstrap {
    pub version: SchemaVersion,
    pub players: Vec<RawPlayer>,
    pub positions: Vec<RawPosition>,
    pub teams: RawTeams,
    pub events: Vec<RawEvent>,
}

impl RawBootstrap {
    pub fn parse(payload: &Value) -> Result<Self, SnapshotError> {
        let version = SchemaVersion::detect(payload);
        let players = decode_section(payload, "elements", &PLAYER_COLUMNS)?;
        let positions = decode_section(payload, "element_types", &POSITION_COLUMNS)?;
        let teams = match version {
            SchemaVersion::V1 => RawTeams::V1(decode_section(payload, "teams", &TEAM_V1_COLUMNS)?),
            SchemaVersion::V2 => RawTeams::V2(decode_section(payload, "teams", &TEAM_COLUMNS)?),
        };
        let events: Vec<RawEvent> = decode_section(payload, "events", &EVENT_COLUMNS)?;
        if events.is_empty() {
            return Err(SnapshotError::EmptyEvents);
        }
        Ok(Self {
            version,
            players,
            positions,
            teams,
            events,
        })
    }
}

pub fn parse_fixtures(payload: &Value) -> Result<Vec<RawFixture>, SnapshotError> {
    let records = payload
        .as_array()
        .ok_or(SnapshotError::MissingSection { section: "fixtures" })?;
    decode_records("fixtures", records, &FIXTURE_COLUMNS)
}

fn decode_section<T: DeserializeOwned>(
    payload: &Value,
    section: &'static str,
    expected: &[&str],
) -> Result<Vec<T>, SnapshotError> {
    let records = payload
        .get(section)
        .and_then(|v| v.as_array())
        .ok_or(SnapshotError::MissingSection { section })?;
    decode_records(section, records, expected)
}

fn decode_records<T: DeserializeOwned>(
    section: &'static str,
    records: &[Value],
    expected: &[&str],
) -> Result<Vec<T>, SnapshotError> {
    require_columns(section, records, expected)?;
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            T::deserialize(record).map_err(|err| SnapshotError::InvalidRecord {
                section,
                index,
                message: err.to_string(),
            })
        })
        .collect()
}

pub fn require_columns(
    section: &'static str,
    records: &[Value],
    expected: &[&str],
) -> Result<(), SnapshotError> {
    let actual: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.as_object())
        .flat_map(|obj| obj.keys().map(|k| k.as_str()))
        .collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|col| !actual.contains(*col))
        .map(|col| col.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SnapshotError::SchemaValidation { section, missing })
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_f64_any))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "True" | "1"),
        _ => false,
    })
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}
