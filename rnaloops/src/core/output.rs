//! CSV output formatting
//!
//! `OutputWriter` owns the result stream and the diagnostic stream together
//! with the per-shape header flags. Whoever owns the writer is the only
//! writer of both streams: the collector in batch runs, the orchestrator in
//! single-sequence runs.

use std::io::{self, Write};
use std::time::Duration;

use rnaloops_shared::logging::TIMING_TARGET;
use rnaloops_shared::{FailedJob, JobOutcome, ResultShape, StructuredResult};

pub const SCORE_HEADER: &str = "ID,class1,score,class2";
pub const PFC_HEADER: &str = "ID,class,pfc,probability";

pub fn header_for(shape: ResultShape) -> &'static str {
    match shape {
        ResultShape::Score => SCORE_HEADER,
        ResultShape::Pfc => PFC_HEADER,
    }
}

/// `<id>:<seconds>s <stderr>` with the program's own timing report on one line
pub fn timing_line(id: &str, elapsed: Duration, stderr: &str) -> String {
    let report = single_line(stderr);
    if report.is_empty() {
        format!("{}:{:.3}s", id, elapsed.as_secs_f64())
    } else {
        format!("{}:{:.3}s {}", id, elapsed.as_secs_f64(), report)
    }
}

/// Joins the non-blank lines of a program message with `; `
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Counters for everything the writer has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStats {
    pub succeeded: usize,
    pub failed: usize,
    pub rows_written: usize,
}

impl OutputStats {
    pub fn outcomes(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct OutputWriter<O: Write, D: Write> {
    out: O,
    diagnostics: D,
    score_header_written: bool,
    pfc_header_written: bool,
    timing: bool,
    stats: OutputStats,
}

impl<O: Write, D: Write> OutputWriter<O, D> {
    pub fn new(out: O, diagnostics: D) -> Self {
        Self {
            out,
            diagnostics,
            score_header_written: false,
            pfc_header_written: false,
            timing: false,
            stats: OutputStats::default(),
        }
    }

    /// Log per-job timing lines for successful outcomes (fluent API)
    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }

    pub fn stats(&self) -> OutputStats {
        self.stats
    }

    pub fn write_outcome(&mut self, outcome: &JobOutcome) -> io::Result<()> {
        match outcome {
            JobOutcome::Completed {
                result,
                stderr,
                elapsed,
            } => {
                self.write_result(result)?;
                if self.timing {
                    let line = timing_line(result.id(), *elapsed, stderr);
                    tracing::info!(target: TIMING_TARGET, "{}", line);
                }
                self.stats.succeeded += 1;
            }
            JobOutcome::Failed(failed) => {
                self.write_failure(failed)?;
                self.stats.failed += 1;
            }
        }
        Ok(())
    }

    fn write_result(&mut self, result: &StructuredResult) -> io::Result<()> {
        let shape = result.shape();
        let header_written = match shape {
            ResultShape::Score => &mut self.score_header_written,
            ResultShape::Pfc => &mut self.pfc_header_written,
        };
        if !*header_written {
            writeln!(self.out, "{}", header_for(shape))?;
            *header_written = true;
        }

        for row in result.rows() {
            writeln!(self.out, "{},{}", result.id(), row.join(","))?;
            self.stats.rows_written += 1;
        }
        Ok(())
    }

    fn write_failure(&mut self, failed: &FailedJob) -> io::Result<()> {
        writeln!(self.diagnostics, "{}:{}", failed.id, single_line(&failed.diagnostic))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.diagnostics.flush()
    }

    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diagnostics)
    }
}
