//! Record File
//!
//! Untyped store engine over raw payload bytes.
//!
//! ## Responsibilities
//! - Linear scans (find, count, verify) over checksum-valid slots
//! - Appending records, realigning a torn tail first
//! - Atomic replacement of an existing key
//! - Removal and explicit garbage collection via compaction
//!
//! Every operation opens the file, makes one pass, and closes it. No handle
//! or index is kept between calls.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::record::{RecordKey, RecordLayout};
use crate::StoreError;

use super::{Compaction, CompactionStats, SlotReader};

/// Result of a read-only integrity scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Slots whose checksum verified
    pub valid: usize,
    /// Complete slots whose checksum failed
    pub corrupt: usize,
    /// Bytes of an incomplete slot at the end of the file
    pub trailing_bytes: u64,
}

impl ScanStats {
    /// True when every byte of the file belongs to a valid slot
    pub fn is_clean(&self) -> bool {
        self.corrupt == 0 && self.trailing_bytes == 0
    }
}

/// A store file of fixed-width slots with a known payload width
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
    scratch_path: PathBuf,
    layout: RecordLayout,
    sync_writes: bool,
}

impl RecordFile {
    /// Bind a store file described by `config` to a payload width
    ///
    /// Does not touch the filesystem: a missing file is an empty store.
    pub fn open(config: &Config, payload_len: usize) -> Result<Self> {
        if config.path.file_name().is_none() {
            return Err(StoreError::Config(format!(
                "store path {} does not name a file",
                config.path.display()
            )));
        }

        let scratch_path = config.scratch_path();
        if scratch_path == config.path {
            return Err(StoreError::Config(format!(
                "scratch path must differ from store path {}",
                config.path.display()
            )));
        }

        Ok(Self {
            path: config.path.clone(),
            scratch_path,
            layout: RecordLayout::new(payload_len, config.integrity),
            sync_writes: config.sync_writes,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Scan all slots, valid or not
    pub fn slots(&self) -> Result<SlotReader> {
        SlotReader::open(&self.path, self.layout)
    }

    /// Payload of the first valid slot with `key`, in file order
    pub fn find(&self, key: &RecordKey) -> Result<Option<Vec<u8>>> {
        for slot in self.slots()?.valid() {
            let slot = slot?;
            if self.layout.key_matches(&slot.bytes, key) {
                return Ok(Some(self.layout.payload(&slot.bytes).to_vec()));
            }
        }
        Ok(None)
    }

    /// Number of valid slots
    pub fn count(&self) -> Result<usize> {
        let mut n = 0;
        for slot in self.slots()?.valid() {
            slot?;
            n += 1;
        }
        Ok(n)
    }

    /// Count valid, corrupt and torn bytes without modifying anything
    pub fn scan(&self) -> Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut slots = self.slots()?;
        for slot in slots.by_ref() {
            if slot?.valid {
                stats.valid += 1;
            } else {
                stats.corrupt += 1;
            }
        }
        stats.trailing_bytes = slots.trailing_bytes();
        Ok(stats)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `payload` under `key`, replacing any existing record
    ///
    /// An absent key is appended. A present key is replaced by one
    /// compaction pass that drops the old slot and writes the new one before
    /// the rename, so a failure leaves the old value in place.
    pub fn upsert(&mut self, key: &RecordKey, payload: &[u8]) -> Result<()> {
        let slot = self.layout.encode(key, payload)?;

        if self.find(key)?.is_none() {
            return self.append(&slot);
        }

        let stats = self.rewrite(Some(key), Some(slot.as_slice()), |_| true)?;
        debug!(
            key = %key,
            kept = stats.kept,
            corrupt = stats.corrupt,
            "replaced record"
        );
        Ok(())
    }

    /// Remove every valid slot with `key`
    ///
    /// Commits only when the key was found, pruning corrupt slots as a
    /// side effect. Otherwise the file is left byte-identical.
    pub fn remove(&mut self, key: &RecordKey) -> Result<bool> {
        let stats = self.rewrite(Some(key), None, |stats| stats.removed > 0)?;
        let found = stats.removed > 0;
        debug!(key = %key, found, "remove");
        Ok(found)
    }

    /// Rewrite the file keeping only valid slots
    pub fn compact(&mut self) -> Result<CompactionStats> {
        let stats = self.rewrite(None, None, CompactionStats::reclaimed_anything)?;
        debug!(kept = stats.kept, corrupt = stats.corrupt, "compacted");
        Ok(stats)
    }

    /// Delete the store file. A missing file is already clear.
    pub fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared store");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch_path
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Append one encoded slot, creating the file if needed
    fn append(&mut self, slot: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // A torn slot from an interrupted append would shift every slot
        // written after it
        let width = self.layout.width() as u64;
        let len = file.metadata()?.len();
        let torn = len % width;
        if torn != 0 {
            warn!(
                path = %self.path.display(),
                bytes = torn,
                "truncating torn trailing slot"
            );
            file.set_len(len - torn)?;
        }

        file.write_all(slot)?;
        if self.sync_writes {
            file.sync_data()?;
        }

        debug!(
            key = %self.layout.key(slot),
            offset = len - torn,
            "appended record"
        );
        Ok(())
    }

    /// Stream the file into the scratch file, dropping invalid slots and
    /// slots matching `target`, then appending `replacement`.
    ///
    /// `commit_if` decides from the pass statistics whether the scratch
    /// replaces the store; otherwise it is deleted. A missing store file
    /// is only created when there is a replacement to write.
    fn rewrite<F>(
        &mut self,
        target: Option<&RecordKey>,
        replacement: Option<&[u8]>,
        commit_if: F,
    ) -> Result<CompactionStats>
    where
        F: Fn(&CompactionStats) -> bool,
    {
        let mut slots = self.slots()?;
        if !slots.file_exists() && replacement.is_none() {
            return Ok(CompactionStats::default());
        }

        let mut compaction = Compaction::begin(&self.path, &self.scratch_path, self.sync_writes)?;
        let mut stats = CompactionStats::default();

        for slot in slots.by_ref() {
            let slot = slot?;
            if !slot.valid {
                stats.corrupt += 1;
                continue;
            }
            if target.is_some_and(|key| self.layout.key_matches(&slot.bytes, key)) {
                stats.removed += 1;
                continue;
            }
            compaction.write_slot(&slot.bytes)?;
            stats.kept += 1;
        }
        stats.trailing_bytes = slots.trailing_bytes();

        if let Some(slot) = replacement {
            compaction.write_slot(slot)?;
        }

        if commit_if(&stats) {
            compaction.commit()?;
            if stats.corrupt > 0 || stats.trailing_bytes > 0 {
                warn!(
                    path = %self.path.display(),
                    corrupt = stats.corrupt,
                    trailing_bytes = stats.trailing_bytes,
                    "compaction pruned damaged slots"
                );
            }
        } else {
            compaction.abort();
        }

        Ok(stats)
    }
}
