//! Storage Module
//!
//! Flat file of fixed-width record slots.
//!
//! ## Responsibilities
//! - Scan slots in file order, skipping those whose checksum fails
//! - Append new slots
//! - Compact through a per-store scratch file (deletion and the only form
//!   of garbage collection)
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Slot 0  [Key (32)][Payload][CRC-8]     │
//! ├────────────────────────────────────────┤
//! │ Slot 1  [Key (32)][Payload][CRC-8]     │
//! ├────────────────────────────────────────┤
//! │ ...                                    │
//! └────────────────────────────────────────┘
//! ```
//! No header, no length prefixes, no record count.

mod compaction;
mod file;
mod reader;

pub use compaction::CompactionStats;
pub(crate) use compaction::Compaction;
pub use file::{RecordFile, ScanStats};
pub use reader::{Slot, SlotReader};
