use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum Position {
    #[serde(rename = "GKP", alias = "GK", alias = "GKR")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn quota(self) -> usize {
        match self {
            Position::Goalkeeper => 2,
            Position::Defender => 5,
            Position::Midfielder => 5,
            Position::Forward => 3,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "GKP" | "GK" | "GKR" => Some(Position::Goalkeeper),
            "DEF" => Some(Position::Defender),
            "MID" => Some(Position::Midfielder),
            "FWD" => Some(Position::Forward),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPlayer {
    pub player_id: u32,
    #[serde(default)]
    pub player_id_season: Option<u32>,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(alias = "cost")]
    pub player_cost: f64,
    #[serde(alias = "predicted_score")]
    pub predict: f64,
    #[serde(alias = "position")]
    pub player_position: Position,
    #[serde(alias = "club")]
    pub team_name: String,
}

pub fn read_scored_csv<R: Read>(input: R) -> Result<Vec<ScoredPlayer>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<ScoredPlayer>().enumerate() {
        out.push(row.with_context(|| format!("decode scored row {}", idx + 1))?);
    }
    Ok(out)
}

pub fn load_scored_csv(path: &Path) -> Result<Vec<ScoredPlayer>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_scored_csv(file).with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_and_extra_columns_are_accepted() {
        let csv = "player_id,cost,predicted_score,position,club,season\n\
                   101,45,3.2,GKP,Arsenal,14\n\
                   102,130,7.9,FWD,Spurs,14\n";
        let rows = read_scored_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_position, Position::Goalkeeper);
        assert_eq!(rows[1].team_name, "Spurs");
        assert!((rows[1].player_cost - 130.0).abs() < f64::EPSILON);
        assert_eq!(rows[1].player_id_season, None);
    }

    #[test]
    fn unknown_position_is_an_error() {
        let csv = "player_id,player_cost,predict,player_position,team_name\n1,40,1.0,COACH,Leeds\n";
        assert!(read_scored_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn position_codes_round_trip() {
        for p in Position::ALL {
            assert_eq!(Position::from_code(p.code()), Some(p));
        }
        assert_eq!(Position::Midfielder.to_string(), "MID");
    }
}
