//! Job worker
//!
//! Executes one invocation, classifies the output and turns every possible
//! failure into a `JobOutcome`. Nothing escapes this boundary as an error.

use std::sync::Arc;

use rnaloops_shared::{FailedJob, Invocation, JobOutcome, RawOutcome, Stage, stage_debug};

use crate::collector::OutcomeSender;
use crate::core::classify;
use crate::error::RnaLoopsError;
use crate::traits::CommandExecutor;

pub struct Worker<E: CommandExecutor> {
    executor: Arc<E>,
}

impl<E: CommandExecutor> Clone for Worker<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E: CommandExecutor> Worker<E> {
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Run one invocation to an outcome
    pub async fn execute(&self, invocation: Invocation) -> JobOutcome {
        stage_debug!(
            Stage::Worker,
            "▶️ {}: {}",
            invocation.record_id,
            invocation.command_line()
        );

        match self.executor.execute(&invocation).await {
            Ok(raw) => Self::interpret(&invocation, raw),
            Err(RnaLoopsError::Execution { message }) => {
                JobOutcome::Failed(FailedJob::new(invocation.record_id, message))
            }
            Err(e) => JobOutcome::Failed(FailedJob::new(invocation.record_id, e.to_string())),
        }
    }

    /// Run one invocation and hand the outcome to the collector
    pub async fn run(&self, invocation: Invocation, sender: &OutcomeSender) {
        let outcome = self.execute(invocation).await;
        sender.send(outcome);
    }

    fn interpret(invocation: &Invocation, raw: RawOutcome) -> JobOutcome {
        let id = invocation.record_id.clone();

        if !raw.succeeded() {
            stage_debug!(Stage::Worker, "❌ {} exited with {:?}", id, raw.exit_status);
            let diagnostic = if raw.stderr.trim().is_empty() {
                match raw.exit_status {
                    Some(code) => format!("exited with status {code}"),
                    None => "terminated by signal".to_string(),
                }
            } else {
                raw.stderr
            };
            return JobOutcome::Failed(FailedJob::new(id, diagnostic));
        }

        match classify(invocation.algorithm, &id, &raw.stdout) {
            Ok(result) => {
                stage_debug!(
                    Stage::Worker,
                    "✅ {} finished in {:.3}s with {} rows",
                    id,
                    raw.elapsed.as_secs_f64(),
                    result.rows().len()
                );
                JobOutcome::Completed {
                    result,
                    stderr: raw.stderr,
                    elapsed: raw.elapsed,
                }
            }
            Err(e) => {
                let diagnostic = RnaLoopsError::from(e).to_string();
                stage_debug!(Stage::Worker, "❌ {}: {}", id, diagnostic);
                JobOutcome::Failed(FailedJob::new(id, diagnostic))
            }
        }
    }
}
