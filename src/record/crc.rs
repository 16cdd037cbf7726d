//! CRC-8 checksum
//!
//! Polynomial x^8 + x^2 + x + 1 (0x07), initial value 0, MSB-first,
//! no reflection and no final xor (CRC-8/SMBUS).

use crc::{Crc, CRC_8_SMBUS};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Compute the CRC-8 of `data`
pub fn crc8(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}
