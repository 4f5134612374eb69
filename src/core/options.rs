//! Build options
//!
//! Per-invocation switches that select optional stages and tune the
//! external tools. They never affect variant resolution.

use std::path::PathBuf;

/// Options for one install run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Log every action instead of performing it
    pub dry_run: bool,
    /// Run `make clean` before configuring
    pub clean: bool,
    /// Run `make clean` after installing
    pub post_clean: bool,
    /// Run the test suite before installing
    pub test: bool,
    /// Use the production php.ini template
    pub production: bool,
    /// `make -j` job count; CPU count when unset
    pub make_jobs: Option<usize>,
    /// Scheduling priority for the compile step
    pub nice: Option<i32>,
    /// Patches applied to the source tree before configuring
    pub patches: Vec<PathBuf>,
}

impl BuildOptions {
    /// Effective job count
    pub fn jobs(&self) -> usize {
        self.make_jobs.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

/// Resolve patch paths, dropping the ones that cannot be read
///
/// Each surviving path is canonical, so later stages can run from any
/// working directory.
pub fn canonicalize_patches(patches: &[PathBuf]) -> Vec<PathBuf> {
    patches
        .iter()
        .filter_map(|patch| match patch.canonicalize() {
            Ok(path) if path.is_file() => Some(path),
            Ok(path) => {
                tracing::warn!("Ignoring patch {}: not a regular file", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring patch {}: {e}", patch.display());
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_jobs_defaults_to_cpu_count() {
        let options = BuildOptions::default();
        assert_eq!(options.jobs(), num_cpus::get());

        let options = BuildOptions {
            make_jobs: Some(3),
            ..Default::default()
        };
        assert_eq!(options.jobs(), 3);

        let options = BuildOptions {
            make_jobs: Some(0),
            ..Default::default()
        };
        assert_eq!(options.jobs(), num_cpus::get());
    }

    #[test]
    fn test_canonicalize_patches_drops_missing() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("fix.patch");
        std::fs::write(&good, "--- a\n+++ b\n").unwrap();

        let patches = vec![
            good.clone(),
            tmp.path().join("missing.patch"),
            tmp.path().to_path_buf(),
        ];
        let kept = canonicalize_patches(&patches);

        assert_eq!(kept, vec![good.canonicalize().unwrap()]);
    }
}
