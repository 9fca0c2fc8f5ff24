pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::config::{toml_config::TomlConfig, Settings};
pub use crate::core::{
    form::{DateRangeForm, SubmitStatus, DEFAULT_ENDPOINT},
    http::{post_json, HttpPoster},
    output::OutputFormat,
};
pub use crate::domain::model::{default_range, DateRange, MatchesPlayedDay, RangePayload};
pub use crate::utils::error::{Result, TrackerError};
