use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::output::OutputFormat;
use crate::domain::model::{default_range, parse_range_bound, DateRange, RangeBound};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, TimeZone};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "matches-per-day")]
#[command(about = "Post a date range to the matches-per-day endpoint and print the answer")]
pub struct CliConfig {
    #[arg(long, help = "Server base URL [default: http://localhost:8000]")]
    pub base_url: Option<String>,

    #[arg(long, help = "Endpoint path [default: /valorant/matches-per-day.json]")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Range start, YYYY-MM-DD or RFC 3339 [default: yesterday 00:00]")]
    pub begin: Option<String>,

    #[arg(long, help = "Range end, YYYY-MM-DD or RFC 3339 [default: today 23:59:59.999]")]
    pub end: Option<String>,

    #[arg(long, short = 'c', help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Request timeout in seconds (no timeout by default)")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, default_value = "json", help = "Output format: json, csv or table")]
    pub format: OutputFormat,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併預設值、設定檔與命令列參數，命令列優先
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading config file {}", path.display());
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            settings = settings.merge_toml(&file);
        }

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if self.timeout_seconds.is_some() {
            settings.timeout_seconds = self.timeout_seconds;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// The range asked for on the command line, if any. A missing end falls
    /// back to the matching end of the default range around `reference`.
    pub fn requested_range<Tz: TimeZone>(
        &self,
        reference: &DateTime<Tz>,
    ) -> Result<Option<DateRange>> {
        if self.begin.is_none() && self.end.is_none() {
            return Ok(None);
        }

        let tz = reference.timezone();
        let fallback = default_range(reference);

        let begin = match &self.begin {
            Some(raw) => parse_range_bound(raw, RangeBound::Begin, &tz)?,
            None => fallback.begin,
        };
        let end = match &self.end {
            Some(raw) => parse_range_bound(raw, RangeBound::End, &tz)?,
            None => fallback.end,
        };

        Ok(Some(DateRange::new(begin, end)))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validation::validate_url("base_url", base_url)?;
        }
        if let Some(endpoint) = &self.endpoint {
            validation::validate_endpoint_path("endpoint", endpoint)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
