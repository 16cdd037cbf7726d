//! Payload bound
//!
//! Payloads are copied byte-for-byte into the slot. Only types with a fixed,
//! padding-free, pointer-free representation qualify; everything else fails
//! the zerocopy bounds at compile time.

use zerocopy::{FromBytes, Immutable, IntoBytes};

/// A fixed-size, memory-copyable record payload
///
/// Implemented for every type deriving zerocopy's `FromBytes`, `IntoBytes`
/// and `Immutable`, e.g. integers, byte arrays and `#[repr(C)]` structs of
/// those.
pub trait Payload: FromBytes + IntoBytes + Immutable + Sized {
    /// Encoded width in bytes
    const WIDTH: usize = std::mem::size_of::<Self>();
}

impl<T: FromBytes + IntoBytes + Immutable + Sized> Payload for T {}
