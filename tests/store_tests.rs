//! Tests for RecordStore
//!
//! These tests verify:
//! - Insert / query / exists / remove / count
//! - Replacement keeps keys unique
//! - Empty and missing store files
//! - Iteration order and select_all
//! - Clear and reopen
//! - Configuration (scratch path, integrity mode)

use std::fs;
use std::path::PathBuf;

use recordkv::record::{Integrity, RecordKey};
use recordkv::{Config, RecordStore, StoreError};
use tempfile::TempDir;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

// =============================================================================
// Helper Types and Functions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct Reading {
    sensor_id: u32,
    millivolts: u32,
    flags: [u8; 8],
}

impl Reading {
    fn new(sensor_id: u32, millivolts: u32) -> Self {
        Self {
            sensor_id,
            millivolts,
            flags: [0; 8],
        }
    }
}

fn setup_temp_store<T: recordkv::Payload>() -> (TempDir, RecordStore<T>) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("records.db"))
        .integrity(Integrity::Crc8)
        .build();
    let store = RecordStore::open(config).unwrap();
    (temp_dir, store)
}

fn file_len(path: &PathBuf) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_does_not_create_file() {
    let (_temp, store) = setup_temp_store::<u32>();

    assert!(!store.path().exists());
}

#[test]
fn test_insert_query() {
    let (_temp, mut store) = setup_temp_store::<Reading>();

    store.insert(b"probe-1", &Reading::new(1, 3300)).unwrap();

    assert_eq!(store.query(b"probe-1").unwrap(), Some(Reading::new(1, 3300)));
}

#[test]
fn test_query_missing_key() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"a", &1).unwrap();

    assert_eq!(store.query(b"b").unwrap(), None);
}

#[test]
fn test_exists() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"present", &7).unwrap();

    assert!(store.exists(b"present").unwrap());
    assert!(!store.exists(b"absent").unwrap());
}

#[test]
fn test_scenario_insert_replace_remove() {
    let (_temp, mut store) = setup_temp_store::<u32>();

    store.insert(b"a", &1).unwrap();
    store.insert(b"b", &2).unwrap();
    store.insert(b"a", &3).unwrap();

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.query(b"a").unwrap(), Some(3));
    assert_eq!(store.query(b"b").unwrap(), Some(2));

    assert!(store.remove(b"a").unwrap());
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.query(b"a").unwrap(), None);
    assert_eq!(store.query(b"b").unwrap(), Some(2));
}

#[test]
fn test_remove_twice() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"k", &1).unwrap();

    assert!(store.remove(b"k").unwrap());
    assert!(!store.remove(b"k").unwrap());
}

#[test]
fn test_file_is_concatenation_of_slots() {
    let (_temp, mut store) = setup_temp_store::<Reading>();
    let width = store.layout().width() as u64;
    assert_eq!(width, 32 + 16 + 1);

    for i in 0..5u32 {
        store.insert(format!("k{}", i).as_bytes(), &Reading::new(i, i)).unwrap();
    }

    assert_eq!(file_len(&store.path().to_path_buf()), 5 * width);
}

#[test]
fn test_replace_does_not_grow_file() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"a", &1).unwrap();
    store.insert(b"b", &2).unwrap();
    let before = file_len(&store.path().to_path_buf());

    store.insert(b"a", &10).unwrap();

    assert_eq!(file_len(&store.path().to_path_buf()), before);
}

#[test]
fn test_replaced_record_moves_to_end() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"a", &1).unwrap();
    store.insert(b"b", &2).unwrap();
    store.insert(b"a", &3).unwrap();

    let keys: Vec<RecordKey> = store.iter().unwrap().map(|r| r.unwrap().0).collect();

    assert_eq!(keys[0].as_bytes(), b"b");
    assert_eq!(keys[1].as_bytes(), b"a");
}

// =============================================================================
// Key Validation Tests
// =============================================================================

#[test]
fn test_insert_over_length_key_fails() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    let key = [b'x'; 32];

    let result = store.insert(&key, &1);

    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    assert!(!store.path().exists());
}

#[test]
fn test_insert_max_length_key() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    let key = [b'x'; 31];

    store.insert(&key, &99).unwrap();

    assert_eq!(store.query(&key).unwrap(), Some(99));
}

#[test]
fn test_query_over_length_key_fails() {
    let (_temp, store) = setup_temp_store::<u32>();

    assert!(matches!(
        store.query(&[b'x'; 40]),
        Err(StoreError::InvalidKey(_))
    ));
}

#[test]
fn test_keys_are_case_sensitive() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"Key", &1).unwrap();
    store.insert(b"key", &2).unwrap();

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.query(b"Key").unwrap(), Some(1));
    assert_eq!(store.query(b"key").unwrap(), Some(2));
}

// =============================================================================
// Payload Round-Trip Tests
// =============================================================================

#[test]
fn test_all_zero_payload_round_trip() {
    let (_temp, mut store) = setup_temp_store::<[u8; 24]>();

    store.insert(b"zeros", &[0u8; 24]).unwrap();

    assert_eq!(store.query(b"zeros").unwrap(), Some([0u8; 24]));
}

#[test]
fn test_all_ones_payload_round_trip() {
    let (_temp, mut store) = setup_temp_store::<[u8; 24]>();

    store.insert(b"ones", &[0xFF; 24]).unwrap();

    assert_eq!(store.query(b"ones").unwrap(), Some([0xFF; 24]));
}

#[test]
fn test_zero_sized_payload() {
    let (_temp, mut store) = setup_temp_store::<()>();

    store.insert(b"flag", &()).unwrap();

    assert!(store.exists(b"flag").unwrap());
    assert_eq!(store.layout().width(), 33);
}

// =============================================================================
// Empty Store Tests
// =============================================================================

#[test]
fn test_empty_store_operations() {
    let (_temp, mut store) = setup_temp_store::<u32>();

    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.query(b"anything").unwrap(), None);
    assert!(!store.remove(b"anything").unwrap());

    let mut visits = 0;
    store.select_all(|_, _| visits += 1).unwrap();
    assert_eq!(visits, 0);

    assert!(!store.path().exists());
    assert!(!store.scratch_path().exists());
}

#[test]
fn test_empty_file_is_empty_store() {
    let (_temp, store) = setup_temp_store::<u32>();
    fs::write(store.path(), b"").unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.query(b"a").unwrap(), None);
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_select_all_visits_in_insert_order() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"first", &1).unwrap();
    store.insert(b"second", &2).unwrap();
    store.insert(b"third", &3).unwrap();

    let mut seen = Vec::new();
    store
        .select_all(|key, value| seen.push((key.to_vec(), *value)))
        .unwrap();

    assert_eq!(
        seen,
        vec![
            (b"first".to_vec(), 1),
            (b"second".to_vec(), 2),
            (b"third".to_vec(), 3),
        ]
    );
}

#[test]
fn test_iter_yields_keys_and_values() {
    let (_temp, mut store) = setup_temp_store::<Reading>();
    store.insert(b"a", &Reading::new(1, 100)).unwrap();
    store.insert(b"b", &Reading::new(2, 200)).unwrap();

    let records = store.iter().unwrap().collect::<recordkv::Result<Vec<_>>>().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].0.as_bytes(), b"b");
    assert_eq!(records[1].1, Reading::new(2, 200));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_clear_removes_file() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"a", &1).unwrap();
    store.insert(b"b", &2).unwrap();

    store.clear().unwrap();

    assert!(!store.path().exists());
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_clear_missing_file_is_ok() {
    let (_temp, mut store) = setup_temp_store::<u32>();

    store.clear().unwrap();
    store.clear().unwrap();
}

#[test]
fn test_insert_after_clear() {
    let (_temp, mut store) = setup_temp_store::<u32>();
    store.insert(b"a", &1).unwrap();
    store.clear().unwrap();

    store.insert(b"a", &2).unwrap();

    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.query(b"a").unwrap(), Some(2));
}

#[test]
fn test_reopen_sees_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("persist.db");

    {
        let mut store: RecordStore<u64> = RecordStore::open_path(&path).unwrap();
        store.insert(b"uptime", &123_456).unwrap();
        store.insert(b"boots", &3).unwrap();
    }

    let store: RecordStore<u64> = RecordStore::open_path(&path).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.query(b"uptime").unwrap(), Some(123_456));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_scratch_path_derived_from_store_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sensors.db");

    let store: RecordStore<u32> = RecordStore::open_path(&path).unwrap();

    assert_eq!(store.scratch_path(), temp_dir.path().join("sensors.db.compact"));
}

#[test]
fn test_explicit_scratch_path() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("a.db"))
        .scratch_path(temp_dir.path().join("tmp.db"))
        .build();

    let mut store: RecordStore<u32> = RecordStore::open(config).unwrap();
    store.insert(b"x", &1).unwrap();
    store.insert(b"x", &2).unwrap();

    assert_eq!(store.query(b"x").unwrap(), Some(2));
    assert!(!temp_dir.path().join("tmp.db").exists());
}

#[test]
fn test_scratch_equal_to_store_path_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a.db");
    let config = Config::builder().path(&path).scratch_path(&path).build();

    let result = RecordStore::<u32>::open(config);

    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[test]
fn test_two_stores_in_one_directory() {
    let temp_dir = TempDir::new().unwrap();
    let mut left: RecordStore<u32> =
        RecordStore::open_path(temp_dir.path().join("left.db")).unwrap();
    let mut right: RecordStore<u32> =
        RecordStore::open_path(temp_dir.path().join("right.db")).unwrap();

    left.insert(b"k", &1).unwrap();
    right.insert(b"k", &2).unwrap();
    left.insert(b"k", &3).unwrap();
    right.remove(b"k").unwrap();

    assert_eq!(left.query(b"k").unwrap(), Some(3));
    assert_eq!(right.query(b"k").unwrap(), None);
}

#[test]
fn test_without_checksum_slot_is_one_byte_shorter() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("plain.db"))
        .integrity(Integrity::None)
        .build();

    let mut store: RecordStore<u32> = RecordStore::open(config).unwrap();
    store.insert(b"a", &1).unwrap();
    store.insert(b"b", &2).unwrap();

    assert_eq!(store.layout().width(), 36);
    assert_eq!(file_len(&store.path().to_path_buf()), 72);
    assert_eq!(store.query(b"b").unwrap(), Some(2));
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.path, PathBuf::from("./records.db"));
    assert_eq!(config.scratch_path(), PathBuf::from("./records.db.compact"));
    assert!(config.sync_writes);
}
