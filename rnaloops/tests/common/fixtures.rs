//! Test fixtures and data for rnaloops tests

use std::time::Duration;

use rnaloops_shared::{RawOutcome, Record};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Directory the mocked locator "finds" every executable in
    pub const ALGORITHM_DIR: &'static str = "/opt/rnaloops/bin";
    pub const INPUT_FILE: &'static str = "sequences.fasta";

    pub const SCORE_OUTPUT: &'static str = "GNRA|-5.2|UNCG\n";
    pub const PFC_OUTPUT: &'static str = "GNRA|2.0\nUNCG|3.0\nkturn|5.0\n\n";

    /// Records named `r0..r{count}` with a fixed hairpin sequence
    pub fn records(count: usize) -> Vec<Record> {
        (0..count).map(|i| Record::new(format!("r{i}"), "GGGGAAACCCC")).collect()
    }

    pub fn success(id: &str, stdout: &str) -> RawOutcome {
        RawOutcome {
            record_id: id.to_string(),
            exit_status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
            elapsed: Duration::from_millis(3),
        }
    }

    pub fn failure(id: &str, code: i32, stderr: &str) -> RawOutcome {
        RawOutcome {
            record_id: id.to_string(),
            exit_status: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
            elapsed: Duration::from_millis(3),
        }
    }
}
