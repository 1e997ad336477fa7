//! Job execution messages
//!
//! An `Invocation` goes into a worker, a `RawOutcome` comes out of the
//! external program, and a `JobOutcome` travels over the aggregation channel
//! to the collector wrapped in a `CollectorMessage`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::results::StructuredResult;
use crate::types::AlgorithmKind;

/// Fully parameterized external command for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub record_id: String,
    pub algorithm: AlgorithmKind,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Directory the program runs in; motif tables are loaded relative to it
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// Shell-like rendering for log lines
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// What the external program left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub record_id: String,
    /// `None` when the process was terminated by a signal
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl RawOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_status == Some(0)
    }
}

/// A record whose job produced no rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedJob {
    pub id: String,
    pub diagnostic: String,
}

impl FailedJob {
    pub fn new(id: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            diagnostic: diagnostic.into(),
        }
    }
}

/// Result of one worker execution, exactly one per record
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed {
        result: StructuredResult,
        /// Raw stderr of the program, may carry timing output
        stderr: String,
        elapsed: Duration,
    },
    Failed(FailedJob),
}

impl JobOutcome {
    pub fn id(&self) -> &str {
        match self {
            JobOutcome::Completed { result, .. } => result.id(),
            JobOutcome::Failed(failed) => &failed.id,
        }
    }
}

/// Aggregation channel protocol
#[derive(Debug, Clone, PartialEq)]
pub enum CollectorMessage {
    Outcome(JobOutcome),
    /// Sent once, strictly after every outcome has been enqueued
    Shutdown,
}
