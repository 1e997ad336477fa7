//! Core pipeline logic
//!
//! Pure building blocks with no process or channel handling: turning records
//! into invocations, classifying program output, and formatting rows.

pub mod classifier;
pub mod invocation;
pub mod output;

pub use classifier::{ParseError, classify};
pub use invocation::InvocationBuilder;
pub use output::{OutputStats, OutputWriter};
