//! Persistent cache of computed dataset summaries.
//!
//! A summary is expensive (one full pass over the matrix) but small (three
//! vectors), so it is computed once per dataset version and persisted as a
//! bincode record under the dataset's logical name. There is no atomic
//! check-then-store: two processes racing past a miss will both compute,
//! which is wasteful but not incorrect since they write identical records.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use tenxbrain_core::MatrixSummary;

use super::client::HubClient;
use super::consts::DEFAULT_SUMMARY_EXT;

/// The persisted summary record: the matrix it was computed from plus the
/// statistic vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Logical name of the matrix this summary describes.
    pub matrix: String,
    /// The statistic vectors from the streaming reduction.
    pub summary: MatrixSummary,
}

/// Whether a summary came from the cache or was computed on demand.
#[derive(Debug, Clone)]
pub enum CacheOutcome {
    /// Loaded from a previously persisted record; no computation ran.
    Cached(DatasetSummary),
    /// Freshly computed and persisted during this call.
    Fresh(DatasetSummary),
}

impl CacheOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, CacheOutcome::Cached(_))
    }

    pub fn into_inner(self) -> DatasetSummary {
        match self {
            CacheOutcome::Cached(summary) | CacheOutcome::Fresh(summary) => summary,
        }
    }
}

/// File-backed store of [`DatasetSummary`] records keyed by logical name.
pub struct SummaryCache {
    folder: PathBuf,
}

impl SummaryCache {
    /// A cache rooted in the client's summaries folder.
    pub fn new(client: &HubClient) -> SummaryCache {
        SummaryCache {
            folder: client.summary_folder(),
        }
    }

    /// A cache rooted at an explicit folder.
    pub fn at(folder: PathBuf) -> SummaryCache {
        SummaryCache { folder }
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{}{}", name, DEFAULT_SUMMARY_EXT))
    }

    /// Load the record stored under `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<DatasetSummary>> {
        let path = self.entry_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)
            .with_context(|| format!("Failed to open cached summary {}", path.display()))?;
        let summary = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to decode cached summary {}", path.display()))?;
        Ok(Some(summary))
    }

    /// Persist `record` under `name`, overwriting any existing entry.
    pub fn put(&self, name: &str, record: &DatasetSummary) -> Result<()> {
        let path = self.entry_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        bincode::serialize_into(BufWriter::new(file), record)
            .with_context(|| format!("Failed to encode summary to {}", path.display()))?;
        Ok(())
    }

    /// Drop the entry stored under `name`, if any.
    pub fn invalidate(&self, name: &str) -> Result<()> {
        let path = self.entry_path(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Return the cached record for `name`, or run `compute`, persist its
    /// result, and return that.
    ///
    /// On a hit `compute` is never invoked. A failed `compute` persists
    /// nothing, so the next call starts from scratch.
    pub fn get_or_compute<F>(&self, name: &str, compute: F) -> Result<CacheOutcome>
    where
        F: FnOnce() -> Result<DatasetSummary>,
    {
        if let Some(stored) = self.get(name)? {
            return Ok(CacheOutcome::Cached(stored));
        }
        let fresh = compute()?;
        self.put(name, &fresh)?;
        Ok(CacheOutcome::Fresh(fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::cell::Cell;

    #[fixture]
    fn record() -> DatasetSummary {
        DatasetSummary {
            matrix: "tiny.ccm".to_string(),
            summary: MatrixSummary {
                rows: 2,
                columns: 3,
                column_sum: vec![4, 4, 2],
                column_nonzero: vec![2, 1, 1],
                row_sum: vec![3, 7],
                row_mean: vec![1.0, 7.0 / 3.0],
            },
        }
    }

    #[rstest]
    fn miss_computes_once_then_hits(record: DatasetSummary) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::at(dir.path().to_path_buf());
        let calls = Cell::new(0u32);

        let first = cache
            .get_or_compute("tiny", || {
                calls.set(calls.get() + 1);
                Ok(record.clone())
            })
            .unwrap();
        assert!(!first.is_cached());
        assert_eq!(calls.get(), 1);

        let second = cache
            .get_or_compute("tiny", || {
                calls.set(calls.get() + 1);
                Ok(record.clone())
            })
            .unwrap();
        assert!(second.is_cached());
        // the compute closure must not run on a hit
        assert_eq!(calls.get(), 1);
        assert_eq!(second.into_inner(), record);
    }

    #[rstest]
    fn failed_compute_persists_nothing(record: DatasetSummary) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::at(dir.path().to_path_buf());

        let failed: Result<CacheOutcome> =
            cache.get_or_compute("tiny", || Err(anyhow!("block unreadable")));
        assert!(failed.is_err());
        assert!(cache.get("tiny").unwrap().is_none());

        // a later attempt recomputes from scratch
        let retried = cache.get_or_compute("tiny", || Ok(record.clone())).unwrap();
        assert!(!retried.is_cached());
    }

    #[rstest]
    fn invalidate_forces_recomputation(record: DatasetSummary) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::at(dir.path().to_path_buf());

        cache.put("tiny", &record).unwrap();
        assert!(cache.get("tiny").unwrap().is_some());

        cache.invalidate("tiny").unwrap();
        assert!(cache.get("tiny").unwrap().is_none());
        // invalidating a missing entry is not an error
        cache.invalidate("tiny").unwrap();
    }

    #[rstest]
    fn round_trips_through_bincode(record: DatasetSummary) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SummaryCache::at(dir.path().to_path_buf());

        cache.put("tiny", &record).unwrap();
        let loaded = cache.get("tiny").unwrap().unwrap();
        assert_eq!(loaded, record);
    }
}
