pub mod report;

pub use report::{Report, ReportEntry};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Writes a finished report in the configured format
pub struct OutputHandler {
    format: OutputFormat,
    writer: Box<dyn Write>,
}

/// One jsonl line: an entry tagged with its report's threshold and time
#[derive(Serialize)]
struct JsonlRecord<'a> {
    threshold: u64,
    generated_at: &'a DateTime<Utc>,
    #[serde(flatten)]
    entry: &'a ReportEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            other => Err(ConfigError::Invalid(format!(
                "unknown output format '{}' (expected text, json or jsonl)",
                other
            ))),
        }
    }
}

impl OutputHandler {
    /// Create an output handler writing to the given sink
    pub fn new(format: OutputFormat, writer: Box<dyn Write>) -> Self {
        OutputHandler { format, writer }
    }

    /// Create an output handler writing to standard output
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, Box::new(io::stdout()))
    }

    /// Write the report
    pub fn write_report(&mut self, report: &Report) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(report)?,
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report)?;
                writeln!(self.writer, "{}", json)?;
            }
            OutputFormat::Jsonl => {
                for entry in &report.entries {
                    let record = JsonlRecord {
                        threshold: report.threshold,
                        generated_at: &report.generated_at,
                        entry,
                    };
                    let json = serde_json::to_string(&record)?;
                    writeln!(self.writer, "{}", json)?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_text(&mut self, report: &Report) -> io::Result<()> {
        writeln!(
            self.writer,
            "--- Rejected SMTP access over {} times retry from unknown hosts ---",
            report.threshold
        )?;
        writeln!(self.writer, "retry : IP address (From:[, ...])")?;

        for entry in &report.entries {
            writeln!(
                self.writer,
                "{:5} : {} {}",
                entry.count,
                entry.address,
                entry.sender_suffix()
            )?;
        }

        writeln!(self.writer, "--- ")
    }
}
