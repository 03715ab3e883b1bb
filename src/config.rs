use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BUDGET: u32 = 1000;
pub const DEFAULT_FREE_TRANSFERS: u32 = 15;
const DEFAULT_SOLVER_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub solver_timeout: Duration,
    pub budget: u32,
    pub free_transfers: u32,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let data_dir = opt_env("FPL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));
        let solver_timeout = Duration::from_secs(
            env::var("FPL_SOLVER_TIMEOUT_SECS")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_SOLVER_TIMEOUT_SECS)
                .clamp(1, 600),
        );
        let budget = env::var("FPL_BUDGET")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_BUDGET);
        let free_transfers = env::var("FPL_FREE_TRANSFERS")
            .ok()
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_FREE_TRANSFERS);

        Self {
            data_dir,
            solver_timeout,
            budget,
            free_transfers,
        }
    }

    pub fn bootstrap_dir(&self) -> PathBuf {
        self.data_dir.join("raw").join("bootstrap")
    }

    pub fn fixture_dir(&self) -> PathBuf {
        self.data_dir.join("raw").join("fixtures")
    }

    pub fn player_details_dir(&self) -> PathBuf {
        self.data_dir.join("raw").join("player-details")
    }

    pub fn canonical_csv(&self) -> PathBuf {
        self.data_dir.join("intermediate").join("bootstrap.csv")
    }

    pub fn features_csv(&self) -> PathBuf {
        self.data_dir.join("processed").join("features.csv")
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}

pub fn parse_flag(args: &[String], name: &str) -> Option<String> {
    let long = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == long {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn parse_path_flag(args: &[String], name: &str) -> Option<PathBuf> {
    parse_flag(args, name).map(PathBuf::from)
}

pub fn parse_u32_flag(args: &[String], name: &str) -> Option<u32> {
    parse_flag(args, name).and_then(|v| v.parse::<u32>().ok())
}
