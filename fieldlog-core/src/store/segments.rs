//! Segment store - exclusive owner of the on-disk week files

use super::{CapacityPolicy, StoreConfig};
use crate::{FsUsage, LogError, Measurement, Result, WeekKey};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Durable store of week-keyed segment files
///
/// Segments are append-only: rows are only ever added at the end, and a
/// segment disappears only by being deleted whole. Nothing else reads or
/// writes the segment directory.
pub struct SegmentStore {
    dir: PathBuf,
    policy: CapacityPolicy,
}

impl SegmentStore {
    /// Open the store, creating the segment directory if needed
    ///
    /// A directory that cannot be created is reported but not fatal: the
    /// store stays constructed and every later operation surfaces the
    /// underlying IO error.
    pub fn open(config: StoreConfig) -> Self {
        if let Err(e) = fs::create_dir_all(&config.dir) {
            error!("segment directory {} unavailable: {e}", config.dir.display());
        }
        Self {
            dir: config.dir,
            policy: config.policy,
        }
    }

    /// The capacity policy in force
    pub fn policy(&self) -> &CapacityPolicy {
        &self.policy
    }

    /// The segment directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fresh usage snapshot of the segment directory
    ///
    /// Never cached: eviction re-reads this after every deletion, since
    /// segment sizes vary and a deletion frees an unpredictable amount.
    pub fn usage(&self) -> Result<FsUsage> {
        let mut used_bytes = 0u64;
        for entry in fs::read_dir(&self.dir)? {
            let metadata = entry?.metadata()?;
            if metadata.is_file() {
                used_bytes += metadata.len();
            }
        }
        Ok(FsUsage {
            used_bytes,
            total_bytes: self.policy.total_bytes,
        })
    }

    /// All existing segment keys, in no particular order
    ///
    /// Callers sort where order matters. Files that are not week
    /// segments are skipped.
    pub fn list(&self) -> Result<Vec<WeekKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<WeekKey>() {
                Ok(key) => keys.push(key),
                Err(_) => debug!("skipping foreign file {}", path.display()),
            }
        }
        Ok(keys)
    }

    /// Append a batch of measurements to their week segments
    ///
    /// Rows are routed by their own timestamp, so a batch that spans a
    /// week boundary lands in two segments. Groups are written oldest
    /// week first; space is ensured per group before its file is opened.
    /// Appending is atomic per call, not per row: a crash mid-write can
    /// leave a partial last row behind, which readers see as-is.
    ///
    /// Returns the number of rows written. On error, groups written
    /// before the failure remain on disk; the caller keeps its batch and
    /// a retry may append those rows a second time.
    pub fn append(&self, batch: &[Measurement]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut groups: BTreeMap<WeekKey, Vec<&Measurement>> = BTreeMap::new();
        for measurement in batch {
            let key = WeekKey::from_timestamp(measurement.timestamp)?;
            groups.entry(key).or_default().push(measurement);
        }

        let mut written = 0;
        for (key, rows) in &groups {
            self.ensure_space(rows.len())?;
            self.append_segment(key, rows)?;
            written += rows.len();
        }
        Ok(written)
    }

    /// Delete the chronologically oldest segment
    ///
    /// Returns `false` when no segment exists.
    pub fn delete_oldest(&self) -> Result<bool> {
        let Some(oldest) = self.list()?.into_iter().min() else {
            return Ok(false);
        };
        fs::remove_file(self.dir.join(oldest.file_name()))?;
        info!("evicted oldest segment {oldest}");
        Ok(true)
    }

    /// Delete every segment strictly older than `reference`
    ///
    /// Returns the number of segments deleted.
    pub fn delete_before(&self, reference: &WeekKey) -> Result<usize> {
        let mut deleted = 0;
        for key in self.list()? {
            if key < *reference {
                fs::remove_file(self.dir.join(key.file_name()))?;
                info!("deleted segment {key}");
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Delete every segment unconditionally
    ///
    /// Returns the number of segments deleted.
    pub fn delete_all(&self) -> Result<usize> {
        let mut deleted = 0;
        for key in self.list()? {
            fs::remove_file(self.dir.join(key.file_name()))?;
            deleted += 1;
        }
        if deleted > 0 {
            info!("deleted all {deleted} segments");
        }
        Ok(deleted)
    }

    /// Full raw contents of one segment
    pub fn read(&self, key: &WeekKey) -> Result<String> {
        match fs::read_to_string(self.dir.join(key.file_name())) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(LogError::SegmentNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Evict oldest segments until `rows` more rows fit under the ceiling
    ///
    /// Terminates after at most one iteration per existing segment: each
    /// pass deletes one. Fails with [`LogError::StorageExhausted`] when
    /// nothing is left to delete, before any write has started.
    fn ensure_space(&self, rows: usize) -> Result<()> {
        let estimate = self.policy.estimate(rows);
        let mut used = self.usage()?.used_bytes;

        while !self.policy.fits(used, estimate) {
            if !self.delete_oldest()? {
                warn!(
                    "storage exhausted: {used} bytes used, {estimate} more needed, \
                     threshold {}",
                    self.policy.threshold()
                );
                return Err(LogError::StorageExhausted);
            }
            used = self.usage()?.used_bytes;
        }
        Ok(())
    }

    fn append_segment(&self, key: &WeekKey, rows: &[&Measurement]) -> Result<()> {
        let path = self.dir.join(key.file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut payload = String::with_capacity(rows.len() * 24);
        for measurement in rows {
            payload.push_str(&measurement.to_row());
        }
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;

        debug!("appended {} rows to segment {key}", rows.len());
        Ok(())
    }
}
