//! Record Module
//!
//! On-disk layout of a single fixed-width record slot.
//!
//! ## Slot Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Slot (32 + sizeof(T) [+ 1] bytes)                        │
//! │ ┌────────────────────┬──────────────────┬──────────────┐ │
//! │ │ Key (32, NUL-pad)  │ Payload (T)      │ CRC-8 (1)    │ │
//! │ └────────────────────┴──────────────────┴──────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The store file is a plain concatenation of slots: no header, no magic,
//! no record count. The CRC trailer is present only with `Integrity::Crc8`.

mod crc;
mod key;
mod layout;
mod payload;

pub use crc::crc8;
pub use key::RecordKey;
pub use layout::{Integrity, RecordLayout};
pub use payload::Payload;

// =============================================================================
// Shared Constants
// =============================================================================

/// Width of the on-disk key field, including the NUL terminator
pub const KEY_CAPACITY: usize = 32;

/// Longest key that fits in the key field
pub const MAX_KEY_LEN: usize = KEY_CAPACITY - 1;
