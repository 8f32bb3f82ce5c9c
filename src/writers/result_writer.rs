use crate::error::{ProcessingError, Result};
use crate::models::{StationStats, StationSummary};
use crate::utils::constants::{FORMAT_JSON, FORMAT_TEXT};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `{name=min/mean/max, ...}`
    #[default]
    Text,
    /// Array of station summaries.
    Json,
}

pub struct ResultWriter {
    format: OutputFormat,
}

impl ResultWriter {
    pub fn new() -> Self {
        Self {
            format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: &str) -> Result<Self> {
        self.format = match format.to_lowercase().as_str() {
            FORMAT_TEXT => OutputFormat::Text,
            FORMAT_JSON => OutputFormat::Json,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported output format: {}",
                    format
                )))
            }
        };
        Ok(self)
    }

    /// Render stations, which are expected to be sorted already.
    pub fn render(&self, stations: &[StationStats]) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                let body = stations
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!("{{{}}}\n", body))
            }
            OutputFormat::Json => {
                let summaries: Vec<StationSummary> =
                    stations.iter().map(StationStats::summary).collect();
                let mut json = serde_json::to_string_pretty(&summaries)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    pub fn write<W: Write>(&self, stations: &[StationStats], mut out: W) -> Result<()> {
        out.write_all(self.render(stations)?.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self::new()
    }
}
