//! Low-level bit read and write utilities for the packed token buffer.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

/// Reads a single bit at `bit_pos` (0 = MSB of first byte). Bits past the end read as 0.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> u8 {
    data.get(bit_pos / 8)
        .map_or(0, |byte| (byte >> (7 - bit_pos % 8)) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value. MSB-first.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> BigUint {
    let mut value = BigUint::zero();

    for pos in bit_pos..bit_pos + n {
        value <<= 1u8;
        if read_bit_at(data, pos) == 1 {
            value.set_bit(0, true);
        }
    }

    value
}

/// Writes the low `n` bits of `value` starting at `bit_pos`, MSB-first, overwriting
/// whatever was there.
///
/// The span must lie inside `data`. Token fields always do: [crate::schema::Schema::compile]
/// rejects schemas wider than the 160-bit buffer, so this is never called with an
/// out-of-range span.
pub fn write_bits_at(data: &mut [u8], bit_pos: usize, n: usize, value: &BigUint) {
    assert!(bit_pos + n <= data.len() * 8, "bit span past end of buffer");

    for i in 0..n {
        let pos = bit_pos + i;
        let byte = &mut data[pos / 8];

        let mask = 1u8 << (7 - pos % 8);
        if value.bit((n - 1 - i) as u64) {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

/// Splits the low `width * count` bits of `value` into `count` units, most significant
/// unit first.
pub fn split_units(value: &BigUint, width: usize, count: usize) -> Vec<BigUint> {
    let mask = (BigUint::one() << width) - 1u8;

    (0..count)
        .rev()
        .map(|i| (value >> (i * width)) & &mask)
        .collect()
}

/// Two's-complement bit pattern of `value` in `bits` bits: `2^bits + value` for negatives.
/// `value` must already be within the signed range of `bits`.
pub fn to_twos_complement(value: &BigInt, bits: usize) -> BigUint {
    if value.sign() == Sign::Minus {
        ((BigInt::one() << bits) + value).into_parts().1
    } else {
        value.magnitude().clone()
    }
}

/// Reinterprets a `bits`-wide pattern as signed: `pattern - 2^bits` when the top bit is set.
pub fn from_twos_complement(pattern: &BigUint, bits: usize) -> BigInt {
    let value = BigInt::from(pattern.clone());
    if bits > 0 && pattern.bit((bits - 1) as u64) {
        value - (BigInt::one() << bits)
    } else {
        value
    }
}
