//! Shared types for the rnaloops batch runner
//!
//! Data model (records, algorithm options, structured results), the
//! worker/collector message protocol, and logging setup.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod results;
pub mod types;

pub use errors::*;
pub use types::*;

pub use logging::{LogLevel, Stage};
pub use messages::{CollectorMessage, FailedJob, Invocation, JobOutcome, RawOutcome};
pub use results::{PfcResult, Row, ScoreResult, StructuredResult};
