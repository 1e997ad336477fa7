//! Command line and run configuration
//!
//! `Args` is the raw clap surface. It is converted once into an immutable
//! `RunConfig`; every value is validated during that conversion so a bad
//! option fails the run before any external program starts.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use serde::Serialize;

use rnaloops_shared::{
    AlgorithmKind, AlgorithmOptions, HishapeMode, LogLevel, MotifDatabase, MotifDirection,
    ShapeLevel,
};

use crate::error::{RnaLoopsError, RnaLoopsResult};
use crate::pool::{MAX_POOL_SIZE, default_pool_size};

/// Default id given to an inline sequence
pub const DEFAULT_SEQUENCE_TAG: &str = "single_sequence";

/// Upper bound accepted for `--jobs`
pub const MAX_JOBS: usize = MAX_POOL_SIZE;

/// Motif-aware RNA structure prediction over single sequences or sequence files
#[derive(Parser, Debug, Clone)]
#[command(name = "rnaloops")]
#[command(
    about = "Runs the RNAMotif prediction programs over one sequence or a whole sequence file"
)]
#[command(group(ArgGroup::new("input").required(true).args(["input_file", "input_sequence"])))]
pub struct Args {
    /// Algorithm: motmfepretty, motpfc, motshapeX, mothishapes or motshapeX_pfc
    pub algorithm: String,

    /// Sequence file (fasta, fastq or stockholm, optionally .gz compressed)
    #[arg(short = 'i', long)]
    pub input_file: Option<PathBuf>,

    /// Single RNA sequence
    #[arg(short = 'I', long)]
    pub input_sequence: Option<String>,

    /// Name used for the single sequence in the output
    #[arg(short = 'n', long, default_value = DEFAULT_SEQUENCE_TAG)]
    pub sequence_tag: String,

    /// Suboptimal folding (motmfepretty only)
    #[arg(short = 's', long)]
    pub subopt: bool,

    /// Motif source: 1 = RNA 3D Motif Atlas, 2 = Rfam, 3 = both
    #[arg(short = 'Q', long, default_value = "3")]
    pub database: String,

    /// Motif orientation: 1 = 5'->3' only, 2 = 3'->5' only, 3 = both
    #[arg(short = 'b', long, default_value = "3")]
    pub direction: String,

    /// Number of best results to report
    #[arg(short = 'k', long = "kvalue", default_value_t = 10)]
    pub k_best: u32,

    /// Hishape mode: h, m or b
    #[arg(short = 'p', long = "hishape", default_value = "h")]
    pub hishape_mode: String,

    /// Shape level 1-5
    #[arg(short = 'q', long = "shape", default_value_t = 2)]
    pub shape_level: u8,

    /// Energy range for suboptimal folding (kcal/mol)
    #[arg(short = 'e', long = "energy", default_value_t = 1.0)]
    pub energy_range: f64,

    /// Log level: critical, error, warning, info, debug or trace
    #[arg(short = 'l', long, default_value = "warning")]
    pub log_level: String,

    /// Log the runtime of every job
    #[arg(short = 't', long)]
    pub time: bool,

    /// Extra directory searched for the algorithm executables (repeatable)
    #[arg(long = "algorithm-dir")]
    pub algorithm_dirs: Vec<PathBuf>,

    /// Number of concurrent jobs (default: available cores minus two)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Kill a job after this many seconds
    #[arg(long)]
    pub timeout: Option<f64>,
}

/// Where records come from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSource {
    Sequence { tag: String, sequence: String },
    File { path: PathBuf },
}

/// Validated, immutable configuration of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub algorithm: AlgorithmKind,
    pub options: AlgorithmOptions,
    pub input: InputSource,
    pub log_level: LogLevel,
    pub search_roots: Vec<PathBuf>,
    pub jobs: Option<usize>,
    pub timeout: Option<Duration>,
}

impl RunConfig {
    /// Configuration for an algorithm and input with every option at its default
    pub fn new(algorithm: AlgorithmKind, input: InputSource) -> Self {
        Self {
            algorithm,
            options: AlgorithmOptions::default(),
            input,
            log_level: LogLevel::default(),
            search_roots: Vec::new(),
            jobs: None,
            timeout: None,
        }
    }

    /// Concurrent job slots, never below one
    pub fn pool_size(&self) -> usize {
        self.jobs
            .map(|jobs| jobs.clamp(1, MAX_POOL_SIZE))
            .unwrap_or_else(default_pool_size)
    }

    pub fn timing(&self) -> bool {
        self.options.time_instrumentation
    }

    /// Append search roots after the configured ones
    pub fn with_extra_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_roots.extend(roots);
        self
    }

    /// JSON rendering for debug logging
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable config: {e}>"))
    }
}

impl TryFrom<Args> for RunConfig {
    type Error = RnaLoopsError;

    fn try_from(args: Args) -> RnaLoopsResult<Self> {
        let algorithm = AlgorithmKind::from_str(&args.algorithm)?;
        let log_level = LogLevel::from_str(&args.log_level)?;

        let options = AlgorithmOptions {
            k_best: args.k_best,
            database: MotifDatabase::from_str(&args.database)?,
            direction: MotifDirection::from_str(&args.direction)?,
            subopt: args.subopt,
            energy_range: args.energy_range,
            hishape_mode: HishapeMode::from_str(&args.hishape_mode)?,
            shape_level: ShapeLevel::new(args.shape_level)?,
            time_instrumentation: args.time,
        };
        options.validate()?;

        let input = match (args.input_file, args.input_sequence) {
            (Some(path), None) => InputSource::File { path },
            (None, Some(sequence)) => {
                let sequence = sequence.trim().to_string();
                if sequence.is_empty() {
                    return Err(RnaLoopsError::config("input sequence is empty"));
                }
                InputSource::Sequence { tag: args.sequence_tag, sequence }
            }
            _ => {
                return Err(RnaLoopsError::config(
                    "exactly one of --input-file or --input-sequence is required",
                ));
            }
        };

        let timeout = match args.timeout {
            None => None,
            Some(secs) if secs > 0.0 => Some(
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| RnaLoopsError::config(format!("invalid timeout {secs}: {e}")))?,
            ),
            Some(secs) => return Err(RnaLoopsError::config(format!("invalid timeout: {secs}"))),
        };

        match args.jobs {
            Some(0) => return Err(RnaLoopsError::config("--jobs must be at least 1")),
            Some(jobs) if jobs > MAX_JOBS => {
                return Err(RnaLoopsError::config(format!(
                    "--jobs must be at most {MAX_JOBS}, got {jobs}"
                )));
            }
            _ => {}
        }

        Ok(Self {
            algorithm,
            options,
            input,
            log_level,
            search_roots: args.algorithm_dirs,
            jobs: args.jobs,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> RnaLoopsResult<RunConfig> {
        let args = Args::try_parse_from(std::iter::once("rnaloops").chain(argv.iter().copied()))
            .map_err(|e| RnaLoopsError::config(e.to_string()))?;
        RunConfig::try_from(args)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["motpfc", "-I", "GGGAAACCC"]).unwrap();

        assert_eq!(config.algorithm, AlgorithmKind::MotPfc);
        assert_eq!(config.options, AlgorithmOptions::default());
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(
            config.input,
            InputSource::Sequence { tag: "single_sequence".into(), sequence: "GGGAAACCC".into() }
        );
        assert!(config.timeout.is_none());
        assert!(config.pool_size() >= 1);
    }

    #[test]
    fn test_all_options() {
        let config = parse(&[
            "mothishapes", "-i", "reads.fa.gz", "-Q", "1", "-b", "2", "-k", "4", "-p", "m",
            "-q", "5", "-e", "2.5", "-s", "-t", "-l", "DEBUG",
            "--algorithm-dir", "/opt/a", "--algorithm-dir", "/opt/b", "-j", "3",
            "--timeout", "30",
        ])
        .unwrap();

        assert_eq!(config.input, InputSource::File { path: PathBuf::from("reads.fa.gz") });
        assert_eq!(config.options.database, MotifDatabase::Bgsu);
        assert_eq!(config.options.direction, MotifDirection::Reverse);
        assert_eq!(config.options.k_best, 4);
        assert_eq!(config.options.hishape_mode, HishapeMode::M);
        assert_eq!(config.options.shape_level.get(), 5);
        assert_eq!(config.options.energy_range, 2.5);
        assert!(config.options.subopt);
        assert!(config.timing());
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.search_roots, vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]);
        assert_eq!(config.pool_size(), 3);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_input_sources_are_mutually_exclusive_and_required() {
        assert!(parse(&["motpfc"]).is_err());
        assert!(parse(&["motpfc", "-i", "a.fa", "-I", "ACGU"]).is_err());
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for argv in [
            &["motfoo", "-I", "ACGU"][..],
            &["motpfc", "-I", "ACGU", "-l", "verbose"],
            &["motpfc", "-I", "ACGU", "-Q", "4"],
            &["motpfc", "-I", "ACGU", "-p", "x"],
            &["motshapeX", "-I", "ACGU", "-q", "6"],
            &["motpfc", "-I", "ACGU", "-k", "0"],
            &["motpfc", "-I", "ACGU", "--timeout", "0"],
            &["motpfc", "-I", "ACGU", "-j", "0"],
            &["motpfc", "-I", "ACGU", "--timeout", "1e300"],
            &["motpfc", "-I", "ACGU", "--timeout", "NaN"],
            &["motpfc", "-I", "ACGU", "--timeout", "inf"],
            &["motpfc", "-I", "   "],
        ] {
            let err = parse(argv).unwrap_err();
            assert!(matches!(err, RnaLoopsError::Configuration { .. }), "{argv:?} gave {err}");
        }
    }

    #[test]
    fn test_job_count_above_pool_limit_is_rejected() {
        let too_many = (MAX_JOBS + 1).to_string();
        let err = parse(&["motpfc", "-I", "ACGU", "-j", &too_many]).unwrap_err();
        assert!(matches!(err, RnaLoopsError::Configuration { .. }));

        let max = MAX_JOBS.to_string();
        assert_eq!(parse(&["motpfc", "-I", "ACGU", "-j", &max]).unwrap().pool_size(), MAX_JOBS);

        let mut config = parse(&["motpfc", "-I", "ACGU"]).unwrap();
        config.jobs = Some(usize::MAX);
        assert_eq!(config.pool_size(), MAX_POOL_SIZE);
    }

    #[test]
    fn test_extra_roots_follow_configured_ones() {
        let config = parse(&["motpfc", "-I", "ACGU", "--algorithm-dir", "/opt/a"])
            .unwrap()
            .with_extra_roots([PathBuf::from("/usr/local/rnaloops")]);

        assert_eq!(
            config.search_roots,
            vec![PathBuf::from("/opt/a"), PathBuf::from("/usr/local/rnaloops")]
        );
    }

    #[test]
    fn test_config_serializes_to_json() {
        let json = parse(&["motshapeX_pfc", "-I", "ACGU"]).unwrap().to_json();
        assert!(json.contains("\"algorithm\":\"motshapeX_pfc\""));
        assert!(json.contains("\"kind\":\"sequence\""));
    }
}
