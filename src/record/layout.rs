//! Slot layout
//!
//! Encodes and validates fixed-width record slots.

use crate::error::Result;
use crate::StoreError;

use super::{crc8, RecordKey, KEY_CAPACITY};

/// Per-record integrity trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// No trailer; every complete slot is valid
    None,

    /// One CRC-8 byte over key + payload
    Crc8,
}

impl Integrity {
    /// Bytes the trailer adds to every slot
    pub fn trailer_len(self) -> usize {
        match self {
            Integrity::None => 0,
            Integrity::Crc8 => 1,
        }
    }
}

impl Default for Integrity {
    fn default() -> Self {
        if cfg!(feature = "checksum") {
            Integrity::Crc8
        } else {
            Integrity::None
        }
    }
}

/// Geometry of one slot: key field, payload, optional trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    payload_len: usize,
    integrity: Integrity,
}

impl RecordLayout {
    pub fn new(payload_len: usize, integrity: Integrity) -> Self {
        Self {
            payload_len,
            integrity,
        }
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    pub fn integrity(&self) -> Integrity {
        self.integrity
    }

    /// Total bytes per slot on disk
    pub fn width(&self) -> usize {
        KEY_CAPACITY + self.payload_len + self.integrity.trailer_len()
    }

    /// Build a zero-filled slot holding `key` and `payload`, checksum last
    pub fn encode(&self, key: &RecordKey, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() != self.payload_len {
            return Err(StoreError::Layout(format!(
                "payload is {} bytes, layout expects {}",
                payload.len(),
                self.payload_len
            )));
        }

        let mut slot = vec![0u8; self.width()];
        slot[..KEY_CAPACITY].copy_from_slice(key.as_field());
        slot[KEY_CAPACITY..KEY_CAPACITY + self.payload_len].copy_from_slice(payload);

        if self.integrity == Integrity::Crc8 {
            let body = KEY_CAPACITY + self.payload_len;
            slot[body] = crc8(&slot[..body]);
        }

        Ok(slot)
    }

    /// Check a slot's trailer. Slots of the wrong width never verify.
    pub fn is_valid(&self, slot: &[u8]) -> bool {
        if slot.len() != self.width() {
            return false;
        }
        match self.integrity {
            Integrity::None => true,
            Integrity::Crc8 => {
                let body = KEY_CAPACITY + self.payload_len;
                crc8(&slot[..body]) == slot[body]
            }
        }
    }

    /// Key stored in a slot
    pub fn key(&self, slot: &[u8]) -> RecordKey {
        RecordKey::from_field(&slot[..KEY_CAPACITY.min(slot.len())])
    }

    /// Whether a slot's key equals `key` (byte-exact, up to the terminator)
    pub fn key_matches(&self, slot: &[u8], key: &RecordKey) -> bool {
        self.key(slot).as_bytes() == key.as_bytes()
    }

    /// Payload bytes of a slot
    pub fn payload<'a>(&self, slot: &'a [u8]) -> &'a [u8] {
        &slot[KEY_CAPACITY..KEY_CAPACITY + self.payload_len]
    }
}
