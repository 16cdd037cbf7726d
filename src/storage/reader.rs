//! Slot Reader
//!
//! Sequential iteration over the fixed-width slots of a store file.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::Result;
use crate::record::RecordLayout;

/// One slot read from disk
#[derive(Debug, Clone)]
pub struct Slot {
    /// Position of the slot in the file (0-based)
    pub index: u64,
    /// Raw slot bytes, exactly `layout.width()` long
    pub bytes: Vec<u8>,
    /// Whether the integrity trailer verified
    pub valid: bool,
}

/// Iterator over the slots of a store file, in file order
///
/// A missing file yields nothing. A short slot at the end of the file
/// stops the scan; its length is kept in `trailing_bytes`.
pub struct SlotReader {
    file: Option<BufReader<File>>,
    layout: RecordLayout,
    next_index: u64,
    trailing_bytes: u64,
}

impl SlotReader {
    /// Open a store file for scanning
    pub fn open(path: &Path, layout: RecordLayout) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            file,
            layout,
            next_index: 0,
            trailing_bytes: 0,
        })
    }

    /// Whether the backing file existed when opened
    pub fn file_exists(&self) -> bool {
        self.file.is_some()
    }

    /// Bytes of an incomplete slot found at the end of the file
    pub fn trailing_bytes(&self) -> u64 {
        self.trailing_bytes
    }

    /// Only slots whose trailer verifies
    pub fn valid(self) -> impl Iterator<Item = Result<Slot>> {
        self.filter(|slot| !matches!(slot, Ok(slot) if !slot.valid))
    }

    /// Fill `buf` as far as the file allows; returns bytes read
    fn fill(file: &mut BufReader<File>, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl Iterator for SlotReader {
    type Item = Result<Slot>;

    fn next(&mut self) -> Option<Self::Item> {
        let file = self.file.as_mut()?;

        let width = self.layout.width();
        let mut bytes = vec![0u8; width];
        let filled = match Self::fill(file, &mut bytes) {
            Ok(n) => n,
            Err(e) => {
                self.file = None;
                return Some(Err(e.into()));
            }
        };

        if filled < width {
            // End of file, possibly with a torn slot behind it
            self.trailing_bytes = filled as u64;
            self.file = None;
            return None;
        }

        let slot = Slot {
            index: self.next_index,
            valid: self.layout.is_valid(&bytes),
            bytes,
        };
        self.next_index += 1;

        Some(Ok(slot))
    }
}
