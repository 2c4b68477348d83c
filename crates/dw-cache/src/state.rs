//! Sidecar validity against the metadata of the compared runs.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use dw_core::metadata::metadata_path;

/// Whether a sidecar may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Newer than both metadata files.
    Valid,
    /// No sidecar on disk.
    Missing,
    /// Not newer than one of the metadata files, or a metadata file is gone.
    Stale,
    /// Recomputation requested by the caller.
    Forced,
}

impl CacheState {
    /// True when the sidecar can be read instead of recomputed.
    pub fn is_valid(self) -> bool {
        self == CacheState::Valid
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Classifies `sidecar` for the runs in `candidate_dir` and `reference_dir`.
pub fn cache_state(sidecar: &Path, candidate_dir: &Path, reference_dir: &Path, force: bool) -> CacheState {
    if force {
        return CacheState::Forced;
    }
    let Some(written) = modified(sidecar) else {
        return CacheState::Missing;
    };
    let newer_than = |dir: &Path| modified(&metadata_path(dir)).is_some_and(|stamp| written > stamp);
    if newer_than(candidate_dir) && newer_than(reference_dir) {
        CacheState::Valid
    } else {
        CacheState::Stale
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::time::Duration;

    use super::*;

    fn stamp(path: &Path, time: SystemTime) {
        File::options().write(true).open(path).unwrap().set_modified(time).unwrap();
    }

    #[test]
    fn classification_follows_timestamps() {
        let candidate = tempfile::tempdir().unwrap();
        let reference = tempfile::tempdir().unwrap();
        let sidecar = candidate.path().join("mean_L1.txt");
        assert_eq!(cache_state(&sidecar, candidate.path(), reference.path(), false), CacheState::Missing);

        fs::write(&sidecar, "1\n").unwrap();
        assert_eq!(cache_state(&sidecar, candidate.path(), reference.path(), false), CacheState::Stale);

        let now = SystemTime::now();
        for dir in [candidate.path(), reference.path()] {
            fs::write(metadata_path(dir), "{}").unwrap();
            stamp(&metadata_path(dir), now - Duration::from_secs(60));
        }
        stamp(&sidecar, now);
        assert_eq!(cache_state(&sidecar, candidate.path(), reference.path(), false), CacheState::Valid);
        assert_eq!(cache_state(&sidecar, candidate.path(), reference.path(), true), CacheState::Forced);

        stamp(&metadata_path(reference.path()), now);
        assert_eq!(cache_state(&sidecar, candidate.path(), reference.path(), false), CacheState::Stale);
    }
}
