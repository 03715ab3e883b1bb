use std::fmt;

use chrono::{DateTime, Datelike};

use crate::error::SnapshotError;
use crate::raw::{RawEvent, RawFixture};

/// Season whose calendar was suspended after gameweek 29 and resumed as 39..=47.
pub const DISRUPTED_SEASON: &str = "2019/20";
const DISRUPTED_RESUME_GW: u32 = 39;
const DISRUPTED_LAST_GW: u32 = 47;
const LAST_GW: u32 = 38;

const SEASON_EPOCH_YEAR: i32 = 2006;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season {
    pub start_year: i32,
    pub end_year: i32,
}

impl Season {
    pub fn id(&self) -> u32 {
        (self.start_year - SEASON_EPOCH_YEAR + 1).max(0) as u32
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn parse(name: &str) -> Option<Self> {
        let (start, end) = name.trim().split_once('/')?;
        let start_year = start.parse::<i32>().ok()?;
        let end_short = end.parse::<i32>().ok()?;
        let century = start_year - start_year.rem_euclid(100);
        let mut end_year = century + end_short;
        if end_year < start_year {
            end_year += 100;
        }
        Some(Self {
            start_year,
            end_year,
        })
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.start_year, self.end_year.rem_euclid(100))
    }
}

pub fn season_id(season_name: &str) -> Option<u32> {
    Season::parse(season_name).map(|s| s.id())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameweekReference {
    pub season: Season,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

impl GameweekReference {
    pub fn from_events(events: &[RawEvent]) -> Result<Self, SnapshotError> {
        let season = extract_season(events)?;
        let previous = extract_previous_gameweek(events);
        let next = next_gameweek(previous, &season.name());
        Ok(Self {
            season,
            previous,
            next,
        })
    }

    pub fn from_fixtures(fixtures: &[RawFixture]) -> Result<Self, SnapshotError> {
        let season = fixture_season(fixtures)?;
        let previous = fixture_previous_gameweek(fixtures);
        let next = next_gameweek(previous, &season.name());
        Ok(Self {
            season,
            previous,
            next,
        })
    }

    pub fn dedup_key(&self) -> String {
        match self.previous {
            Some(gw) => format!("{}_{gw}", self.season),
            None => format!("{}_None", self.season),
        }
    }
}

pub fn extract_season(events: &[RawEvent]) -> Result<Season, SnapshotError> {
    let first = events.first().ok_or(SnapshotError::EmptyEvents)?;
    let last = events.last().ok_or(SnapshotError::EmptyEvents)?;
    Ok(Season {
        start_year: deadline_year(first)?,
        end_year: deadline_year(last)?,
    })
}

pub fn extract_season_name(events: &[RawEvent]) -> Result<String, SnapshotError> {
    extract_season(events).map(|s| s.name())
}

pub fn extract_previous_gameweek(events: &[RawEvent]) -> Option<u32> {
    events.iter().find(|e| e.is_current).map(|e| e.id)
}

pub fn next_gameweek(previous: Option<u32>, season_name: &str) -> Option<u32> {
    let Some(gw) = previous else {
        return Some(1);
    };
    if season_name == DISRUPTED_SEASON {
        return match gw {
            29..=38 => Some(DISRUPTED_RESUME_GW),
            DISRUPTED_LAST_GW => None,
            _ => Some(gw + 1),
        };
    }
    if gw == LAST_GW { None } else { Some(gw + 1) }
}

pub fn fixture_previous_gameweek(fixtures: &[RawFixture]) -> Option<u32> {
    fixtures
        .iter()
        .filter(|f| f.started)
        .filter_map(|f| f.event)
        .max()
}

pub fn fixture_season(fixtures: &[RawFixture]) -> Result<Season, SnapshotError> {
    let mut years = Vec::with_capacity(fixtures.len());
    for kickoff in fixtures.iter().filter_map(|f| f.kickoff_time.as_deref()) {
        years.push(timestamp_year(kickoff)?);
    }
    let (Some(start_year), Some(end_year)) =
        (years.iter().copied().min(), years.iter().copied().max())
    else {
        return Err(SnapshotError::EmptyEvents);
    };
    Ok(Season {
        start_year,
        end_year,
    })
}

fn deadline_year(event: &RawEvent) -> Result<i32, SnapshotError> {
    let raw = event
        .deadline_time
        .as_deref()
        .ok_or_else(|| SnapshotError::BadTimestamp(format!("event {} has no deadline", event.id)))?;
    timestamp_year(raw)
}

fn timestamp_year(raw: &str) -> Result<i32, SnapshotError> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.year());
    }
    // Older payloads occasionally omit the offset; the year prefix is enough.
    trimmed
        .get(..4)
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(|| SnapshotError::BadTimestamp(raw.to_string()))
}
