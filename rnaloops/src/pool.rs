//! Bounded job scheduler
//!
//! Every submitted invocation gets its own task right away; a semaphore
//! limits how many of them run an external program at the same time.
//! `join` is the completion barrier: once it returns, every submitted job
//! has delivered exactly one outcome to the collector channel.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use rnaloops_shared::{FailedJob, Invocation, JobOutcome, Stage, stage_debug, stage_error};

use crate::collector::OutcomeSender;
use crate::traits::CommandExecutor;
use crate::worker::Worker;

/// Cores left free for the orchestrator and collector
pub const RESERVED_CORES: usize = 2;

/// Largest pool the semaphore can back
pub const MAX_POOL_SIZE: usize = Semaphore::MAX_PERMITS;

/// Pool size for a machine with `available` hardware threads, never below one
pub fn clamp_pool_size(available: usize) -> usize {
    available.saturating_sub(RESERVED_CORES).max(1)
}

/// Pool size for this machine
pub fn default_pool_size() -> usize {
    let available = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    clamp_pool_size(available)
}

/// What the barrier saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub submitted: usize,
    /// Jobs whose worker task died; each still produced a failed outcome
    pub aborted: usize,
}

pub struct Scheduler<E: CommandExecutor + 'static> {
    worker: Worker<E>,
    slots: Arc<Semaphore>,
    size: usize,
    sender: OutcomeSender,
    tasks: JoinSet<bool>,
    submitted: usize,
}

impl<E: CommandExecutor + 'static> Scheduler<E> {
    pub fn new(worker: Worker<E>, size: usize, sender: OutcomeSender) -> Self {
        let size = size.clamp(1, MAX_POOL_SIZE);
        stage_debug!(Stage::Scheduler, "🏭 Pool with {} slots", size);

        Self {
            worker,
            slots: Arc::new(Semaphore::new(size)),
            size,
            sender,
            tasks: JoinSet::new(),
            submitted: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Queue one job; returns immediately
    pub fn submit(&mut self, invocation: Invocation) {
        let worker = self.worker.clone();
        let slots = Arc::clone(&self.slots);
        let sender = self.sender.clone();
        self.submitted += 1;

        self.tasks.spawn(async move {
            let record_id = invocation.record_id.clone();

            // Hold the slot until the job is done
            let _permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    sender.send(JobOutcome::Failed(FailedJob::new(record_id, "scheduler closed")));
                    return false;
                }
            };

            let job_sender = sender.clone();
            let job = tokio::spawn(async move { worker.run(invocation, &job_sender).await });

            match job.await {
                Ok(()) => true,
                Err(e) => {
                    stage_error!(Stage::Scheduler, "Worker for {} died: {}", record_id, e);
                    sender.send(JobOutcome::Failed(FailedJob::new(
                        record_id,
                        format!("worker task failed: {e}"),
                    )));
                    false
                }
            }
        });
    }

    /// Wait until every submitted job has finished
    pub async fn join(mut self) -> SchedulerReport {
        let mut report = SchedulerReport {
            submitted: self.submitted,
            aborted: 0,
        };

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(true) => {}
                Ok(false) => report.aborted += 1,
                Err(e) => {
                    stage_error!(Stage::Scheduler, "Job task failed: {}", e);
                    report.aborted += 1;
                }
            }
        }

        stage_debug!(
            Stage::Scheduler,
            "🏁 All {} jobs finished ({} aborted)",
            report.submitted,
            report.aborted
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockCommandExecutor;
    use rnaloops_shared::{AlgorithmKind, CollectorMessage, RawOutcome};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn invocation(id: &str) -> Invocation {
        Invocation {
            record_id: id.to_string(),
            algorithm: AlgorithmKind::MotShapeX,
            program: PathBuf::from("/bin/motshapeX"),
            args: vec!["ACGU".into()],
            working_dir: None,
        }
    }

    fn success(id: &str) -> RawOutcome {
        RawOutcome {
            record_id: id.to_string(),
            exit_status: Some(0),
            stdout: "A|1|B\n".to_string(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_pool_size_clamp() {
        assert_eq!(clamp_pool_size(0), 1);
        assert_eq!(clamp_pool_size(1), 1);
        assert_eq!(clamp_pool_size(2), 1);
        assert_eq!(clamp_pool_size(3), 1);
        assert_eq!(clamp_pool_size(4), 2);
        assert_eq!(clamp_pool_size(64), 62);
        assert!(default_pool_size() >= 1);
    }

    #[tokio::test]
    async fn test_zero_size_is_clamped() {
        let worker = Worker::new(Arc::new(MockCommandExecutor::new()));
        let (sender, _rx) = OutcomeSender::detached();
        let scheduler = Scheduler::new(worker, 0, sender);
        assert_eq!(scheduler.size(), 1);
    }

    #[tokio::test]
    async fn test_oversized_pool_is_clamped_to_semaphore_limit() {
        let worker = Worker::new(Arc::new(MockCommandExecutor::new()));
        let (sender, _rx) = OutcomeSender::detached();
        let scheduler = Scheduler::new(worker, usize::MAX, sender);
        assert_eq!(scheduler.size(), MAX_POOL_SIZE);
    }

    #[tokio::test]
    async fn test_every_submission_yields_one_outcome() {
        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().times(25).returning(|inv| {
            if inv.record_id.ends_with('7') {
                Ok(RawOutcome {
                    exit_status: Some(1),
                    stderr: "bad input".to_string(),
                    ..success(&inv.record_id)
                })
            } else {
                Ok(success(&inv.record_id))
            }
        });

        let (sender, mut rx) = OutcomeSender::detached();
        let mut scheduler = Scheduler::new(Worker::new(Arc::new(executor)), 4, sender);
        for i in 0..25 {
            scheduler.submit(invocation(&format!("r{i}")));
        }

        let report = scheduler.join().await;
        assert_eq!(report, SchedulerReport { submitted: 25, aborted: 0 });

        let mut ids = Vec::new();
        while let Ok(CollectorMessage::Outcome(outcome)) = rx.try_recv() {
            ids.push(outcome.id().to_string());
        }
        ids.sort();
        let mut expected: Vec<String> = (0..25).map(|i| format!("r{i}")).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    /// Executor that records the highest number of concurrent executions
    struct CountingExecutor {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CommandExecutor for CountingExecutor {
        async fn execute(
            &self,
            invocation: &Invocation,
        ) -> crate::error::RnaLoopsResult<RawOutcome> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(success(&invocation.record_id))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded_by_pool_size() {
        let executor = Arc::new(CountingExecutor {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let (sender, _rx) = OutcomeSender::detached();
        let mut scheduler = Scheduler::new(Worker::new(Arc::clone(&executor)), 3, sender);

        for i in 0..12 {
            scheduler.submit(invocation(&format!("r{i}")));
        }
        scheduler.join().await;

        let peak = executor.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak} exceeded pool size");
        assert!(peak >= 2, "jobs never overlapped (peak {peak})");
    }

    /// Executor that panics for one record
    struct PanickingExecutor;

    #[async_trait::async_trait]
    impl CommandExecutor for PanickingExecutor {
        async fn execute(
            &self,
            invocation: &Invocation,
        ) -> crate::error::RnaLoopsResult<RawOutcome> {
            if invocation.record_id == "boom" {
                panic!("executor exploded");
            }
            Ok(success(&invocation.record_id))
        }
    }

    #[tokio::test]
    async fn test_panicking_worker_still_reports_outcome() {
        let (sender, mut rx) = OutcomeSender::detached();
        let mut scheduler = Scheduler::new(Worker::new(Arc::new(PanickingExecutor)), 2, sender);
        scheduler.submit(invocation("ok"));
        scheduler.submit(invocation("boom"));

        let report = scheduler.join().await;
        assert_eq!(report.aborted, 1);

        let mut outcomes = Vec::new();
        while let Ok(CollectorMessage::Outcome(outcome)) = rx.try_recv() {
            outcomes.push(outcome);
        }
        assert_eq!(outcomes.len(), 2);
        let failed = outcomes.iter().find(|o| o.id() == "boom").unwrap();
        assert!(matches!(failed, JobOutcome::Failed(_)));
    }
}
