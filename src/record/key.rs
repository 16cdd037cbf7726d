//! Record keys
//!
//! Fixed-capacity, NUL-padded key field.

use std::fmt;

use crate::error::Result;
use crate::StoreError;

use super::{KEY_CAPACITY, MAX_KEY_LEN};

/// A validated key, stored exactly as it appears on disk
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    bytes: [u8; KEY_CAPACITY],
    len: usize,
}

impl RecordKey {
    /// Validate and pad a key
    ///
    /// Rejects keys longer than `MAX_KEY_LEN` and keys containing NUL,
    /// which would be cut short by the terminator on the way back.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() > MAX_KEY_LEN {
            return Err(StoreError::InvalidKey(format!(
                "key is {} bytes, maximum is {}",
                key.len(),
                MAX_KEY_LEN
            )));
        }
        if key.contains(&0) {
            return Err(StoreError::InvalidKey(
                "key must not contain NUL bytes".to_string(),
            ));
        }

        let mut bytes = [0u8; KEY_CAPACITY];
        bytes[..key.len()].copy_from_slice(key);
        Ok(Self {
            bytes,
            len: key.len(),
        })
    }

    /// Rebuild a key from an on-disk key field (up to the first NUL)
    pub(crate) fn from_field(field: &[u8]) -> Self {
        let len = field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(field.len())
            .min(KEY_CAPACITY);
        let mut bytes = [0u8; KEY_CAPACITY];
        bytes[..len].copy_from_slice(&field[..len]);
        Self { bytes, len }
    }

    /// Key bytes without padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Full NUL-padded field as written to disk
    pub fn as_field(&self) -> &[u8; KEY_CAPACITY] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}
