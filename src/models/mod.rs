pub mod event;

pub use event::ScanEvent;
