pub mod assembler;
pub mod canonical;
pub mod config;
pub mod error;
pub mod features;
pub mod fixtures;
pub mod gameweek;
pub mod historical;
pub mod logging;
pub mod manager;
pub mod optimizer;
pub mod raw;
pub mod schema_mapper;
pub mod scored;
