//! Real process execution service
//!
//! Runs invocations as child processes with piped stdout/stderr and no
//! stdin. An optional per-job timeout kills children that hang.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use rnaloops_shared::{Invocation, RawOutcome, Stage, stage_warn};

use crate::error::{RnaLoopsError, RnaLoopsResult};
use crate::traits::CommandExecutor;

/// Process executor backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    /// Kill a job that runs longer than this
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure per-job timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> RnaLoopsResult<RawOutcome> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        let started = Instant::now();
        let child = cmd.spawn().map_err(|e| {
            let program = invocation.program.display();
            RnaLoopsError::execution(format!("failed to start {program}: {e}"))
        })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    // Dropping the wait future drops the child, which kills it
                    stage_warn!(
                        Stage::Worker,
                        "⏱️ {} exceeded {:.1}s, killed",
                        invocation.record_id,
                        limit.as_secs_f64()
                    );
                    return Err(RnaLoopsError::execution(format!(
                        "timed out after {:.1}s",
                        limit.as_secs_f64()
                    )));
                }
            },
            None => child.wait_with_output().await?,
        };

        Ok(RawOutcome {
            record_id: invocation.record_id.clone(),
            exit_status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        })
    }
}
