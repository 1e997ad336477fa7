//! Service implementations
//!
//! Real implementations of the collaborator traits: child processes, the
//! filesystem executable search and sequence file parsing.

pub mod executor;
pub mod locator;
pub mod reader;

pub use executor::ProcessExecutor;
pub use locator::{ALGORITHM_DIR_ENV, FsExecutableLocator, default_search_roots};
pub use reader::{SequenceFileReader, SequenceFormat, detect_file_kind};
