//! Trait definitions with mockall annotations for testing
//!
//! These are the seams to the outside world: running an external program,
//! finding it on disk, and reading sequence files. Workers, the scheduler and
//! the orchestrator only ever see these traits, so they run against mocks in
//! tests without any real prediction binaries.

use std::path::{Path, PathBuf};

use rnaloops_shared::{Invocation, RawOutcome, Record};

use crate::error::RnaLoopsResult;

/// External program execution
#[mockall::automock]
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run one invocation to completion and capture its output
    ///
    /// # Returns
    /// The raw outcome for any process that ran, whatever its exit status.
    /// An `Execution` error when the process could not be started or was
    /// stopped by the executor itself.
    async fn execute(&self, invocation: &Invocation) -> RnaLoopsResult<RawOutcome>;
}

/// Executable lookup
#[mockall::automock]
pub trait ExecutableLocator: Send + Sync {
    /// Find an executable by exact file name
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Multi-record input source
#[mockall::automock]
pub trait RecordReader: Send + Sync {
    /// Read every record of a sequence file, gaps already stripped
    fn read_records(&self, path: &Path) -> RnaLoopsResult<Vec<Record>>;
}
