//! Test helpers and builder patterns for orchestrator tests

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rnaloops::traits::{MockCommandExecutor, MockExecutableLocator, MockRecordReader};
use rnaloops::{BatchSummary, InputSource, Orchestrator, RnaLoopsResult, RunConfig};
use rnaloops_shared::{AlgorithmKind, RawOutcome, Record};

use super::fixtures::TestFixtures;

/// Type alias for test orchestrator with all mocks
pub type TestOrchestrator =
    Orchestrator<MockCommandExecutor, MockExecutableLocator, MockRecordReader>;

/// In-memory stream that can be handed to the orchestrator and read back
/// after the run
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a run left behind
pub struct RunOutput {
    pub result: RnaLoopsResult<BatchSummary>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn summary(&self) -> BatchSummary {
        match &self.result {
            Ok(summary) => *summary,
            Err(e) => panic!("run failed: {e}"),
        }
    }

    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    pub fn stderr_lines(&self) -> Vec<&str> {
        self.stderr.lines().collect()
    }
}

/// Builder for orchestrators wired to mocks
pub struct OrchestratorBuilder {
    config: RunConfig,
    executor: MockCommandExecutor,
    locator: MockExecutableLocator,
    reader: MockRecordReader,
}

impl OrchestratorBuilder {
    /// Batch run of `algorithm` over the fixture input file, with a locator
    /// that finds every executable
    pub fn new(algorithm: AlgorithmKind) -> Self {
        let mut locator = MockExecutableLocator::new();
        locator
            .expect_locate()
            .returning(|name| Some(PathBuf::from(TestFixtures::ALGORITHM_DIR).join(name)))
            .times(0..);

        let mut config = RunConfig::new(
            algorithm,
            InputSource::File {
                path: PathBuf::from(TestFixtures::INPUT_FILE),
            },
        );
        config.jobs = Some(4);

        Self {
            config,
            executor: MockCommandExecutor::new(),
            locator,
            reader: MockRecordReader::new(),
        }
    }

    /// Switch to the single-sequence path
    pub fn with_single_sequence(mut self, tag: &str, sequence: &str) -> Self {
        self.config.input = InputSource::Sequence {
            tag: tag.to_string(),
            sequence: sequence.to_string(),
        };
        self
    }

    pub fn with_config<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut RunConfig),
    {
        setup(&mut self.config);
        self
    }

    /// Reader returns exactly these records
    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.reader
            .expect_read_records()
            .times(1)
            .returning(move |_| Ok(records.clone()));
        self
    }

    /// Executor answers every invocation with `respond`
    pub fn with_responses<F>(mut self, respond: F) -> Self
    where
        F: Fn(&str) -> RawOutcome + Send + 'static,
    {
        self.executor
            .expect_execute()
            .returning(move |invocation| Ok(respond(&invocation.record_id)));
        self
    }

    pub fn with_executor<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockCommandExecutor),
    {
        setup(&mut self.executor);
        self
    }

    pub fn with_locator<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockExecutableLocator),
    {
        self.locator = MockExecutableLocator::new();
        setup(&mut self.locator);
        self
    }

    pub fn with_reader<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockRecordReader),
    {
        setup(&mut self.reader);
        self
    }

    pub fn build(self) -> TestOrchestrator {
        Orchestrator::new(self.config, self.executor, self.locator, self.reader)
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Run to completion, capturing both output streams
    pub async fn run(orchestrator: TestOrchestrator) -> RunOutput {
        let stdout = SharedBuffer::default();
        let stderr = SharedBuffer::default();

        let result = orchestrator.run(stdout.clone(), stderr.clone()).await;

        RunOutput {
            result,
            stdout: stdout.contents(),
            stderr: stderr.contents(),
        }
    }

    /// Result rows, without header lines
    pub fn data_rows<'a>(output: &'a RunOutput, header: &str) -> Vec<&'a str> {
        output
            .stdout_lines()
            .into_iter()
            .filter(|line| *line != header)
            .collect()
    }

    /// The fourth column of pfc rows, parsed
    pub fn probabilities(rows: &[&str]) -> Vec<f64> {
        rows.iter()
            .map(|row| row.rsplit(',').next().unwrap().parse::<f64>().unwrap())
            .collect()
    }
}
