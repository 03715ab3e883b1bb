use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::optimizer::{SQUAD_SIZE, SelectionRequest, SquadRole};
use crate::scored::ScoredPlayer;

const STARTING_SLOTS: u32 = 11;

#[derive(Debug, Clone, Deserialize)]
struct RawPick {
    element: u32,
    position: u32,
    #[serde(default)]
    is_captain: bool,
    #[serde(default)]
    is_vice_captain: bool,
    purchase_price: f64,
    selling_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawTransfersState {
    free: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct RawHelper {
    bank: f64,
    transfers_state: RawTransfersState,
}

#[derive(Debug, Clone, Deserialize)]
struct RawManagerTeam {
    picks: Vec<RawPick>,
    helper: RawHelper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerPick {
    pub player_id_season: u32,
    pub role: SquadRole,
    pub purchase_price: f64,
    pub selling_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerTeam {
    pub money_bank: f64,
    pub money_total: f64,
    pub free_transfers: u32,
    pub picks: Vec<ManagerPick>,
}

impl ManagerTeam {
    pub fn from_value(payload: &Value) -> Result<Self> {
        let raw = RawManagerTeam::deserialize(payload).context("decode manager team")?;
        let picks: Vec<ManagerPick> = raw
            .picks
            .iter()
            .map(|p| ManagerPick {
                player_id_season: p.element,
                role: pick_role(p),
                purchase_price: p.purchase_price,
                selling_price: p.selling_price,
            })
            .collect();
        let money_total = picks.iter().map(|p| p.selling_price).sum::<f64>() + raw.helper.bank;
        Ok(Self {
            money_bank: raw.helper.bank,
            money_total,
            free_transfers: raw.helper.transfers_state.free,
            picks,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let payload: Value = serde_json::from_str(raw.trim())
            .with_context(|| format!("parse {}", path.display()))?;
        Self::from_value(&payload)
    }

    pub fn existing_player_ids(&self, scored: &[ScoredPlayer]) -> Vec<u32> {
        let by_season_id: HashMap<u32, u32> = scored
            .iter()
            .filter_map(|p| p.player_id_season.map(|sid| (sid, p.player_id)))
            .collect();
        self.picks
            .iter()
            .filter_map(|pick| {
                let found = by_season_id.get(&pick.player_id_season).copied();
                if found.is_none() {
                    warn!(element = pick.player_id_season, "pick has no scored candidate");
                }
                found
            })
            .collect()
    }

    pub fn selection_request(
        &self,
        scored: &[ScoredPlayer],
        unlimited: bool,
        timeout: Duration,
    ) -> SelectionRequest {
        SelectionRequest {
            budget: self.money_total,
            free_transfers: if unlimited {
                SQUAD_SIZE as u32
            } else {
                self.free_transfers
            },
            existing_team: self.existing_player_ids(scored),
            timeout,
        }
    }
}

fn pick_role(pick: &RawPick) -> SquadRole {
    if pick.is_captain {
        SquadRole::Captain
    } else if pick.is_vice_captain {
        SquadRole::ViceCaptain
    } else if pick.position > STARTING_SLOTS {
        SquadRole::Bench
    } else {
        SquadRole::Normal
    }
}
