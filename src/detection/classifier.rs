//! Postfix smtpd line classification
//!
//! Recognises the two log lines that matter for hosts whose reverse DNS
//! lookup failed: the initial connect and the rejected RCPT. All patterns
//! are unanchored and case-sensitive so any syslog prefix is accepted.

use regex::Regex;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::models::ScanEvent;

/// smtpd worker, including the submission and smtps variants
const SMTPD_PATTERN: &str = r"postfix/(?:submission/|smtps/)?smtpd";
const CONNECT_PATTERN: &str = r"(?:connect|established) from unknown\[";
const REJECT_PATTERN: &str = r"reject: RCPT from unknown\[";
const ADDRESS_PATTERN: &str = r"unknown\[(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\]";
/// `from=<>` (null sender) captures an empty string
const SENDER_PATTERN: &str = r"from=<(\S*?)>";

/// Stateless classifier turning log lines into scan events
#[derive(Debug, Clone)]
pub struct LineClassifier {
    smtpd: Regex,
    connect: Regex,
    reject: Regex,
    address: Regex,
    sender: Regex,
    strict_addresses: bool,
}

impl LineClassifier {
    /// Create a classifier that accepts any dotted quad of 1-3 digit groups
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_strict_addresses(false)
    }

    /// Create a classifier; when `strict_addresses` is set, an address that
    /// does not parse as `Ipv4Addr` (out-of-range octets, leading zeros)
    /// makes the line irrelevant
    pub fn with_strict_addresses(strict_addresses: bool) -> Result<Self, regex::Error> {
        Ok(LineClassifier {
            smtpd: Regex::new(SMTPD_PATTERN)?,
            connect: Regex::new(CONNECT_PATTERN)?,
            reject: Regex::new(REJECT_PATTERN)?,
            address: Regex::new(ADDRESS_PATTERN)?,
            sender: Regex::new(SENDER_PATTERN)?,
            strict_addresses,
        })
    }

    /// Classify one log line
    pub fn classify(&self, line: &str) -> ScanEvent {
        if !self.smtpd.is_match(line) {
            return ScanEvent::Irrelevant;
        }

        // Connect takes priority when both phrases occur
        if self.connect.is_match(line) {
            return match self.extract_address(line) {
                Some(source) => ScanEvent::Connect { source },
                None => {
                    log::debug!("Connect line without usable address: {}", line.trim_end());
                    ScanEvent::Irrelevant
                }
            };
        }

        if self.reject.is_match(line) {
            let source = self.extract_address(line);
            let sender = self.extract_sender(line);

            return match (source, sender) {
                (Some(source), Some(sender)) => ScanEvent::Reject { source, sender },
                _ => {
                    log::debug!("Reject line missing address or sender: {}", line.trim_end());
                    ScanEvent::Irrelevant
                }
            };
        }

        ScanEvent::Irrelevant
    }

    fn extract_address(&self, line: &str) -> Option<String> {
        let address = self.address.captures(line)?.get(1)?.as_str();

        if self.strict_addresses && Ipv4Addr::from_str(address).is_err() {
            return None;
        }

        Some(address.to_string())
    }

    fn extract_sender(&self, line: &str) -> Option<String> {
        self.sender
            .captures(line)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }
}
