use crate::domain::model::MatchesPlayedDay;
use crate::utils::error::{Result, TrackerError};
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Table,
}

impl FromStr for OutputFormat {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            other => Err(TrackerError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Expected one of: json, csv, table".to_string(),
            }),
        }
    }
}

pub fn render(response: &serde_json::Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Csv => render_csv(&decode_rows(response)?),
        OutputFormat::Table => Ok(render_table(&decode_rows(response)?)),
    }
}

/// Reads the endpoint answer as matches-per-day rows.
pub fn decode_rows(response: &serde_json::Value) -> Result<Vec<MatchesPlayedDay>> {
    // Some deployments wrap the rows as {"data": [...]}
    let rows = match response.get("data") {
        Some(inner) if inner.is_array() => inner,
        _ => response,
    };
    serde_json::from_value(rows.clone()).map_err(|e| TrackerError::InvalidResponse {
        message: format!("expected a list of {{match_date, matches_played}}: {}", e),
    })
}

fn render_csv(rows: &[MatchesPlayedDay]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["match_date", "matches_played"])?;
    for row in rows {
        writer.write_record([row.match_date.to_string(), row.matches_played.to_string()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

fn render_table(rows: &[MatchesPlayedDay]) -> String {
    let total: i64 = rows.iter().map(|row| row.matches_played).sum();
    let width = rows
        .iter()
        .map(|row| row.matches_played.to_string().len())
        .chain(std::iter::once(total.to_string().len()))
        .chain(std::iter::once("matches".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{:<10}  {:>width$}", "date", "matches", width = width);
    for row in rows {
        let _ = writeln!(
            out,
            "{:<10}  {:>width$}",
            row.match_date.to_string(),
            row.matches_played,
            width = width
        );
    }
    let _ = write!(out, "{:<10}  {:>width$}", "total", total, width = width);
    out
}
