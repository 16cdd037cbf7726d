//! Store Module
//!
//! Typed record store over a single file.
//!
//! ## Responsibilities
//! - Validate keys before touching the file
//! - Copy payloads byte-for-byte in and out of slots
//! - Expose insert / query / exists / remove / count / select_all / clear
//!
//! ## Ownership Model
//! Reads take `&self`, mutations take `&mut self`. An iterator borrows the
//! store, so the file cannot be rewritten while it is being scanned.
//! Sharing a store across threads requires an external lock around the
//! whole store; two stores must not point at the same file.

use std::marker::PhantomData;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::record::{Payload, RecordKey, RecordLayout};
use crate::storage::{CompactionStats, RecordFile, ScanStats, SlotReader};
use crate::StoreError;

/// A key/value store of fixed-size `T` records
///
/// ```no_run
/// use recordkv::RecordStore;
///
/// let mut store: RecordStore<u32> = RecordStore::open_path("/flash/counters.db")?;
/// store.insert(b"boots", &1)?;
/// assert_eq!(store.query(b"boots")?, Some(1));
/// # Ok::<(), recordkv::StoreError>(())
/// ```
pub struct RecordStore<T: Payload> {
    config: Config,
    file: RecordFile,
    _payload: PhantomData<fn() -> T>,
}

impl<T: Payload> RecordStore<T> {
    /// Open a store with the given config
    ///
    /// Nothing is created on disk until the first insert.
    pub fn open(config: Config) -> Result<Self> {
        let file = RecordFile::open(&config, T::WIDTH)?;
        Ok(Self {
            config,
            file,
            _payload: PhantomData,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified store file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Insert or replace the record for `key`
    ///
    /// Fails with `InvalidKey` for keys over 31 bytes or containing NUL.
    /// A failed replacement leaves the previous value readable.
    pub fn insert(&mut self, key: &[u8], value: &T) -> Result<()> {
        let key = RecordKey::new(key)?;
        self.file.upsert(&key, value.as_bytes())
    }

    /// Get the value stored under `key`
    ///
    /// Scans from the start of the file; the first valid match wins.
    pub fn query(&self, key: &[u8]) -> Result<Option<T>> {
        let key = RecordKey::new(key)?;
        match self.file.find(&key)? {
            Some(bytes) => Ok(Some(decode::<T>(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether a valid record exists for `key`
    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        let key = RecordKey::new(key)?;
        Ok(self.file.find(&key)?.is_some())
    }

    /// Remove the record for `key`, returning whether it existed
    ///
    /// When the key is found the whole file is compacted, which also
    /// discards every corrupted record. When it is not found the file is
    /// left unchanged.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool> {
        let key = RecordKey::new(key)?;
        self.file.remove(&key)
    }

    /// Number of valid records
    pub fn count(&self) -> Result<usize> {
        self.file.count()
    }

    /// Call `visit` for every valid record in file order
    pub fn select_all<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &T),
    {
        for record in self.iter()? {
            let (key, value) = record?;
            visit(key.as_bytes(), &value);
        }
        Ok(())
    }

    /// Iterate over valid records in file order
    pub fn iter(&self) -> Result<Records<'_, T>> {
        Ok(Records {
            slots: self.file.slots()?,
            layout: self.file.layout(),
            _store: PhantomData,
        })
    }

    /// Rewrite the file without corrupted or torn slots
    pub fn compact(&mut self) -> Result<CompactionStats> {
        self.file.compact()
    }

    /// Report valid, corrupt and torn content without modifying the file
    pub fn verify(&self) -> Result<ScanStats> {
        self.file.scan()
    }

    /// Delete every record by removing the backing file
    pub fn clear(&mut self) -> Result<()> {
        self.file.clear()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the store file path
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Get the scratch file path used by compaction
    pub fn scratch_path(&self) -> &Path {
        self.file.scratch_path()
    }

    /// Get the slot layout
    pub fn layout(&self) -> RecordLayout {
        self.file.layout()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Iterator over the valid records of a store
pub struct Records<'a, T: Payload> {
    slots: SlotReader,
    layout: RecordLayout,
    _store: PhantomData<&'a RecordStore<T>>,
}

impl<T: Payload> Iterator for Records<'_, T> {
    type Item = Result<(RecordKey, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = match self.slots.next()? {
                Ok(slot) => slot,
                Err(e) => return Some(Err(e)),
            };
            if !slot.valid {
                continue;
            }

            let key = self.layout.key(&slot.bytes);
            return Some(decode::<T>(self.layout.payload(&slot.bytes)).map(|value| (key, value)));
        }
    }
}

fn decode<T: Payload>(bytes: &[u8]) -> Result<T> {
    T::read_from_bytes(bytes).map_err(|_| {
        StoreError::Layout(format!(
            "payload is {} bytes, type expects {}",
            bytes.len(),
            T::WIDTH
        ))
    })
}
