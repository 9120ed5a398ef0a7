/// Result of classifying a single log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Connection from an unknown host
    Connect { source: String },
    /// Rejected RCPT from an unknown host, with the envelope sender
    Reject { source: String, sender: String },
    /// Anything else; folds to a no-op
    Irrelevant,
}

impl ScanEvent {
    pub fn is_irrelevant(&self) -> bool {
        matches!(self, ScanEvent::Irrelevant)
    }
}
