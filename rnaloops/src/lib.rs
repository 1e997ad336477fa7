//! Batch runner for the RNAMotif structure prediction programs
//!
//! Builds one external invocation per sequence record, runs a bounded number
//! of them in parallel, and funnels the parsed results through a single
//! collector that owns the CSV output stream.

pub mod collector;
pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod pool;
pub mod services;
pub mod traits;
pub mod worker;

// Re-export commonly used types
pub use collector::{Collector, CollectorHandle, OutcomeSender};
pub use config::{Args, InputSource, RunConfig};
pub use crate::core::{InvocationBuilder, OutputStats, OutputWriter, ParseError, classify};
pub use error::{RnaLoopsError, RnaLoopsResult};
pub use orchestrator::{BatchSummary, Orchestrator};
pub use pool::{Scheduler, SchedulerReport, default_pool_size};
pub use traits::{CommandExecutor, ExecutableLocator, RecordReader};
pub use worker::Worker;
