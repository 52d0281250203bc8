//! Log processing for fwscope
//!
//! This crate provides the merge/filter/sort/limit engine, the background
//! worker that runs it, and the view that holds the displayed batch.

mod engine;
mod filter;
mod protocol;
mod timestamp;
mod view;
mod worker;

pub use engine::process_logs;
pub use filter::{FilterChoices, FilterPresets};
pub use protocol::{WorkerRequest, WorkerResponse, dispatch};
pub use timestamp::{parse_timestamp, sort_key};
pub use view::{ActionCounts, LogView};
pub use worker::{LogWorker, WorkerError};

// Re-export types used in our public API
pub use fwscope_types::{FirewallLog, LogFilters};
