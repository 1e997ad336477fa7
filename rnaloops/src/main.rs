//! Main entry point for the rnaloops binary

use std::io::{self, BufWriter};

use anyhow::Context;
use clap::Parser;

use rnaloops::services::{
    FsExecutableLocator, ProcessExecutor, SequenceFileReader, default_search_roots,
};
use rnaloops::{Args, Orchestrator, RunConfig};
use rnaloops_shared::logging::{init_tracing, log_error};
use rnaloops_shared::{Stage, stage_debug};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A .env file may name the algorithm directory
    dotenvy::dotenv().ok();

    let config = RunConfig::try_from(args)
        .context("invalid configuration")?
        .with_extra_roots(default_search_roots());

    init_tracing(config.log_level, config.timing());
    stage_debug!(Stage::Orchestrator, "Executable search roots: {:?}", config.search_roots);

    let executor = ProcessExecutor::new().with_timeout(config.timeout);
    let locator = FsExecutableLocator::new(config.search_roots.clone());
    let orchestrator = Orchestrator::new(config, executor, locator, SequenceFileReader::new());

    let summary = orchestrator
        .run(BufWriter::new(io::stdout()), io::stderr())
        .await
        .inspect_err(|e| log_error(Stage::Orchestrator, "run", e))
        .context("rnaloops run aborted")?;

    stage_debug!(Stage::Orchestrator, "Summary: {:?}", summary);
    Ok(())
}
