pub mod config;
pub mod detection;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod scanner;

// Re-export commonly used types
pub use config::Config;
pub use detection::{Aggregator, LineClassifier};
pub use error::{ConfigError, Result, ScanError};
pub use models::ScanEvent;
pub use output::{OutputFormat, OutputHandler, Report, ReportEntry};
pub use scanner::{ScanStats, ScanSummary, Scanner};
