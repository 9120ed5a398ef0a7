//! Single-pass scan driver
//!
//! Reads every configured log source in order, classifies each line and
//! folds the result into the aggregate. The finished [`ScanSummary`] is
//! read-only and is what the report is built from.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::Config;
use crate::detection::{AddressCount, Aggregator, LineClassifier};
use crate::error::Result;
use crate::input::{LogLine, LogReader};
use crate::models::ScanEvent;

/// Counters describing a scan run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub sources: usize,
    pub lines: u64,
    pub connects: u64,
    pub rejects: u64,
    pub undecodable: u64,
}

/// Final state of a scan, handed to the report
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub counts: HashMap<String, AddressCount>,
    pub senders: HashMap<String, Vec<String>>,
    pub stats: ScanStats,
}

/// Drives log lines through the classifier into the aggregator
pub struct Scanner {
    classifier: LineClassifier,
    aggregator: Aggregator,
    stats: ScanStats,
}

impl Scanner {
    pub fn new(classifier: LineClassifier) -> Self {
        Scanner {
            classifier,
            aggregator: Aggregator::new(),
            stats: ScanStats::default(),
        }
    }

    /// Build a scanner from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = LineClassifier::with_strict_addresses(config.detection.strict_addresses)?;
        Ok(Self::new(classifier))
    }

    /// Scan the given sources in order
    ///
    /// Stops at the first source that cannot be opened or read.
    pub fn scan_sources(&mut self, sources: &[PathBuf]) -> Result<()> {
        for path in sources {
            let reader = LogReader::open(path)?;
            self.scan_reader(reader)?;
        }
        Ok(())
    }

    /// Scan every line of one source
    pub fn scan_reader(&mut self, mut reader: LogReader) -> Result<()> {
        log::info!("Scanning {}", reader.origin());
        self.stats.sources += 1;

        while let Some(line) = reader.read_line()? {
            self.stats.lines += 1;

            let event = match line {
                LogLine::Text(text) => self.classifier.classify(&text),
                LogLine::Undecodable(len) => {
                    log::debug!(
                        "{}:{}: skipping {} byte line that is not valid UTF-8",
                        reader.origin(),
                        reader.line_number(),
                        len
                    );
                    self.stats.undecodable += 1;
                    ScanEvent::Irrelevant
                }
            };

            self.process_event(event);
        }

        log::info!("{}: {} line(s) read", reader.origin(), reader.line_number());
        Ok(())
    }

    /// Classify and fold a single line
    pub fn scan_line(&mut self, line: &str) {
        self.stats.lines += 1;
        let event = self.classifier.classify(line);
        self.process_event(event);
    }

    fn process_event(&mut self, event: ScanEvent) {
        match &event {
            ScanEvent::Connect { .. } => self.stats.connects += 1,
            ScanEvent::Reject { .. } => self.stats.rejects += 1,
            ScanEvent::Irrelevant => return,
        }
        self.aggregator.fold(event);
    }

    /// Counters so far
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// End the scan and hand over the aggregate
    pub fn finish(self) -> ScanSummary {
        log::info!(
            "Scan complete: {} source(s), {} line(s), {} connect(s) from {} address(es), {} reject(s)",
            self.stats.sources,
            self.stats.lines,
            self.stats.connects,
            self.aggregator.address_count(),
            self.stats.rejects
        );
        if self.stats.undecodable > 0 {
            log::warn!("{} line(s) were not valid UTF-8 and were skipped", self.stats.undecodable);
        }

        let (counts, senders) = self.aggregator.into_parts();
        ScanSummary {
            counts,
            senders,
            stats: self.stats,
        }
    }
}
