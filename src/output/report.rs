use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scanner::ScanSummary;

/// One reported source address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub count: u64,
    pub address: String,
    /// Envelope senders from rejected RCPTs, first-seen order
    pub senders: Vec<String>,
}

impl ReportEntry {
    /// Parenthesised, comma separated sender list, or empty
    pub fn sender_suffix(&self) -> String {
        if self.senders.is_empty() {
            String::new()
        } else {
            format!("({})", self.senders.join(", "))
        }
    }
}

/// Addresses at or above the threshold, most frequent first
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub threshold: u64,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Build the report from a finished scan
    ///
    /// Entries with equal counts keep the order in which they reached
    /// that count.
    pub fn build(summary: &ScanSummary, threshold: u64) -> Self {
        let mut qualifying: Vec<_> = summary
            .counts
            .iter()
            .filter(|(_, c)| c.count >= threshold)
            .collect();
        qualifying.sort_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(a.reached_at.cmp(&b.reached_at))
        });

        let entries: Vec<ReportEntry> = qualifying
            .into_iter()
            .map(|(address, c)| ReportEntry {
                count: c.count,
                address: address.clone(),
                senders: summary.senders.get(address).cloned().unwrap_or_default(),
            })
            .collect();

        log::debug!("{} address(es) at or above threshold {}", entries.len(), threshold);

        Report {
            threshold,
            generated_at: Utc::now(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
