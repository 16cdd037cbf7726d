//! # RecordKV
//!
//! A minimal append-and-compact key/value store for flash-backed
//! filesystems on small devices:
//! - Fixed-width records: 32-byte key, fixed-size payload, CRC-8 trailer
//! - One flat file, no header, no index, linear scans
//! - Corrupted records are skipped by readers and pruned by compaction
//! - Atomic replace-by-rename through a per-store scratch file
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RecordStore<T>                            │
//! │          (typed payloads, key validation)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     RecordFile                               │
//! │        (scan / append / rewrite on raw slots)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ SlotReader  │          │ Compaction  │
//!   │   (scan)    │          │  (scratch)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌────────────────────────────────────────┐
//!   │        store file  +  {path}.compact    │
//!   └────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use record::{Integrity, Payload, RecordKey};
pub use storage::{CompactionStats, ScanStats};
pub use store::RecordStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RecordKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
