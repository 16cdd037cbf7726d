//! Compaction
//!
//! Rewrites a store file through its scratch file.
//!
//! ## Protocol
//! 1. Truncate-or-create the scratch file
//! 2. Stream every slot to keep into it
//! 3. `commit`: flush, fsync, rename the scratch over the store,
//!    fsync the parent directory
//! 4. `abort`: delete the scratch, leaving the store untouched
//!
//! `fs::rename` replaces the destination atomically, so a crash leaves
//! either the old or the new store, never neither. A compaction dropped
//! without commit or abort (an error path) deletes its scratch file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::StoreError;

/// Outcome of one compaction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Valid slots copied to the new file
    pub kept: usize,
    /// Valid slots dropped because their key was removed or replaced
    pub removed: usize,
    /// Slots dropped because their checksum failed
    pub corrupt: usize,
    /// Bytes of a torn trailing slot left behind
    pub trailing_bytes: u64,
}

impl CompactionStats {
    /// Whether the rewritten file differs from the original
    pub fn reclaimed_anything(&self) -> bool {
        self.removed > 0 || self.corrupt > 0 || self.trailing_bytes > 0
    }
}

/// An in-progress rewrite into the scratch file
pub(crate) struct Compaction {
    target: PathBuf,
    scratch: PathBuf,
    writer: Option<BufWriter<File>>,
    sync: bool,
}

impl Compaction {
    /// Start a rewrite of `target` into `scratch`
    pub fn begin(target: &Path, scratch: &Path, sync: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(scratch)?;

        Ok(Self {
            target: target.to_path_buf(),
            scratch: scratch.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            sync,
        })
    }

    /// Append one slot to the new file
    pub fn write_slot(&mut self, slot: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            StoreError::Layout("compaction already finished".to_string())
        })?;
        writer.write_all(slot)?;
        Ok(())
    }

    /// Replace the store with the scratch file
    pub fn commit(mut self) -> Result<()> {
        let writer = self.writer.take().ok_or_else(|| {
            StoreError::Layout("compaction already finished".to_string())
        })?;

        if let Err(e) = self.install(writer) {
            let _ = fs::remove_file(&self.scratch);
            return Err(e);
        }

        if self.sync {
            sync_parent_dir(&self.target);
        }

        Ok(())
    }

    fn install(&self, writer: BufWriter<File>) -> Result<()> {
        let file = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;
        if self.sync {
            file.sync_all()?;
        }
        drop(file);

        fs::rename(&self.scratch, &self.target)?;
        Ok(())
    }

    /// Discard the scratch file
    ///
    /// The store is untouched either way, so a scratch file that cannot be
    /// deleted is logged rather than reported.
    pub fn abort(mut self) {
        drop(self.writer.take());
        self.discard_scratch();
    }

    fn discard_scratch(&self) {
        if let Err(e) = fs::remove_file(&self.scratch) {
            warn!(
                scratch = %self.scratch.display(),
                error = %e,
                "failed to remove scratch file"
            );
        }
    }
}

impl Drop for Compaction {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            self.discard_scratch();
        }
    }
}

/// Make a rename durable. Best effort: not every platform can open a
/// directory for syncing.
fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
}
