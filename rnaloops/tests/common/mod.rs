//! Common test utilities and infrastructure
//!
//! Shared fixtures, mock-backed builders and output capture used across the
//! rnaloops integration suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{OrchestratorBuilder, RunOutput, SharedBuffer, TestHelpers};
