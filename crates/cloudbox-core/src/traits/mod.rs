//! Traits connecting the core to its external collaborators.

pub mod sink;

pub use sink::DownloadSink;
