pub mod aggregator;
pub mod classifier;

pub use aggregator::{AddressCount, Aggregator};
pub use classifier::LineClassifier;
