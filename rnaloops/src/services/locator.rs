//! Filesystem executable lookup
//!
//! The prediction programs live somewhere below an installation directory,
//! usually in nested build folders, so configured roots are searched
//! recursively. `PATH` entries are searched flat.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rnaloops_shared::{Stage, stage_debug};

use crate::traits::ExecutableLocator;

/// Environment variable naming an extra algorithm directory
pub const ALGORITHM_DIR_ENV: &str = "RNALOOPS_ALGORITHM_DIR";

#[derive(Debug, Clone, Default)]
pub struct FsExecutableLocator {
    roots: Vec<PathBuf>,
    search_path: Vec<PathBuf>,
}

impl FsExecutableLocator {
    /// Search `roots` recursively, then the process `PATH`
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let search_path = env::var_os("PATH")
            .map(|path| env::split_paths(&path).collect())
            .unwrap_or_default();

        Self { roots, search_path }
    }

    /// Replace the flat search path (fluent API)
    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self
    }

    fn find_recursive(dir: &Path, name: &str) -> Option<PathBuf> {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }

        let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
            .ok()?
            .filter_map(Result::ok)
            // file_type does not follow symlinks, which keeps the walk finite
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        subdirs.sort();

        subdirs.iter().find_map(|subdir| Self::find_recursive(subdir, name))
    }
}

impl ExecutableLocator for FsExecutableLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let found = self
            .roots
            .iter()
            .find_map(|root| Self::find_recursive(root, name))
            .or_else(|| {
                self.search_path
                    .iter()
                    .map(|dir| dir.join(name))
                    .find(|candidate| candidate.is_file())
            })?;

        let resolved = found.canonicalize().unwrap_or(found);
        stage_debug!(Stage::Orchestrator, "🔎 Resolved {} to {}", name, resolved.display());
        Some(resolved)
    }
}

/// Roots searched when none are configured explicitly: the directory named
/// by `RNALOOPS_ALGORITHM_DIR`, then the directory holding this binary
pub fn default_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(dir) = env::var_os(ALGORITHM_DIR_ENV) {
        roots.push(PathBuf::from(dir));
    }

    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
}
