//! Invocation building
//!
//! The command template (program path, working directory, flags) is resolved
//! once per run. Each record then only contributes its sequence as the final
//! argument.

use std::path::PathBuf;

use rnaloops_shared::{
    AlgorithmKind, AlgorithmOptions, Invocation, Record, Stage, stage_debug, stage_warn,
};

use crate::error::{RnaLoopsError, RnaLoopsResult};
use crate::traits::ExecutableLocator;

/// Builds per-record invocations from a resolved command template
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationBuilder {
    algorithm: AlgorithmKind,
    program: PathBuf,
    working_dir: Option<PathBuf>,
    flags: Vec<String>,
}

impl InvocationBuilder {
    /// Resolve the backing executable and freeze the flag list
    ///
    /// Fails with a configuration error when the executable cannot be found,
    /// so nothing is scheduled for an algorithm that cannot run.
    pub fn new<L>(
        algorithm: AlgorithmKind,
        options: &AlgorithmOptions,
        locator: &L,
    ) -> RnaLoopsResult<Self>
    where
        L: ExecutableLocator + ?Sized,
    {
        options.validate()?;

        if options.subopt && !algorithm.supports_subopt() {
            stage_warn!(
                Stage::Orchestrator,
                "Suboptimal mode is only available for {}, ignoring it for {}",
                AlgorithmKind::MotMfePretty,
                algorithm
            );
        }

        let name = executable_name(algorithm, options);
        let program = locator.locate(&name).ok_or_else(|| {
            RnaLoopsError::config(format!(
                "could not find executable '{name}' for algorithm {algorithm}; \
                 make sure it is installed under one of the algorithm directories"
            ))
        })?;
        let working_dir = program.parent().map(|dir| dir.to_path_buf());

        let builder = Self {
            algorithm,
            program,
            working_dir,
            flags: flags(algorithm, options),
        };

        stage_debug!(Stage::Orchestrator, "Command template: {}", builder.template());
        Ok(builder)
    }

    /// Program and flags, without a sequence
    pub fn template(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.flags.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Append the record's sequence to the template
    pub fn build(&self, record: &Record) -> Invocation {
        let mut args = self.flags.clone();
        args.push(record.sequence.clone());

        Invocation {
            record_id: record.id.clone(),
            algorithm: self.algorithm,
            program: self.program.clone(),
            args,
            working_dir: self.working_dir.clone(),
        }
    }
}

/// File name of the program backing an algorithm, including variant suffix
pub fn executable_name(algorithm: AlgorithmKind, options: &AlgorithmOptions) -> String {
    match algorithm {
        AlgorithmKind::MotMfePretty if options.subopt => format!("{}_subopt", algorithm.name()),
        AlgorithmKind::MotHishapes => {
            format!("{}_{}", algorithm.name(), options.hishape_mode.suffix())
        }
        _ => algorithm.name().to_string(),
    }
}

/// Flags shared by every invocation of a run
pub fn flags(algorithm: AlgorithmKind, options: &AlgorithmOptions) -> Vec<String> {
    let mut flags = Vec::new();

    if algorithm.supports_subopt() && options.subopt {
        flags.extend(["-e".to_string(), options.energy_range.to_string()]);
    } else {
        flags.extend(["-k".to_string(), options.k_best.to_string()]);
    }

    flags.extend([
        "-Q".to_string(),
        options.database.flag_value().to_string(),
        "-b".to_string(),
        options.direction.flag_value().to_string(),
    ]);

    if algorithm.uses_shape_level() {
        flags.extend(["-q".to_string(), options.shape_level.get().to_string()]);
    }

    flags
}
