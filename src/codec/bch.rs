//! Short BCH block codes used throughout the burst formats.
//!
//! There is no published crate for these specific fixed, short polynomials
//! (the same situation the teacher codebase is in with LDPC(174,91), which
//! it implements by hand in `src/ldpc/` rather than depending on an external
//! crate), so the division and repair primitives live here as ordinary
//! in-crate functions.
//!
//! A generator polynomial is given as its integer bit pattern (e.g. `29` is
//! `0b11101`). Division treats `bits` as a binary polynomial and reduces it
//! modulo the generator, the same way a CRC's shift-and-xor division works.

use crate::bits::{Bits, BitSlice01};
use bitvec::prelude::*;

/// Bit-length of `poly`'s binary representation (e.g. `29` -> `5`), i.e. one
/// more than the generator's polynomial degree.
pub fn poly_bit_len(poly: u32) -> u32 {
    32 - poly.leading_zeros()
}

/// Compute the BCH syndrome of `bits` against `poly`. Zero means `bits` is a
/// valid codeword.
pub fn bch_divide(poly: u32, bits: &BitSlice01) -> u32 {
    long_division_remainder(poly, bits)
}

/// Plain shift/xor binary long division, matching how a hardware LFSR would
/// compute the syndrome: the remainder after dividing `bits` (as a
/// polynomial, MSB first) by `poly`.
fn long_division_remainder(poly: u32, bits: &BitSlice01) -> u32 {
    let deg = poly_bit_len(poly) - 1;
    let mut reg: u64 = 0;
    let width_mask: u64 = (1u64 << (deg + 1)) - 1;
    for bit in bits {
        reg = ((reg << 1) | (*bit as u64)) & width_mask;
        if (reg >> deg) & 1 != 0 {
            reg ^= poly as u64;
            reg &= width_mask;
        }
    }
    reg as u32
}

/// Result of a BCH repair attempt. `errors` is `0`, `1`, `2`, or `-1` when no
/// correction within two bit-flips restores a valid codeword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BchRepair {
    pub errors: i32,
    pub data_bits: Bits,
    pub bch_bits: Bits,
}

/// Attempt to repair `bits` (a full BCH codeword: data followed by check
/// bits) against `poly`, allowing up to two corrected bit positions.
/// `data_len` is the number of leading data bits; the remainder are check
/// bits.
pub fn bch_repair(poly: u32, bits: &BitSlice01, data_len: usize) -> BchRepair {
    assert!(data_len <= bits.len(), "data_len exceeds codeword length");

    if long_division_remainder(poly, bits) == 0 {
        return BchRepair {
            errors: 0,
            data_bits: bits[..data_len].to_bitvec(),
            bch_bits: bits[data_len..].to_bitvec(),
        };
    }

    let mut candidate: Bits = bits.to_bitvec();
    for i in 0..bits.len() {
        let saved = candidate[i];
        candidate.set(i, !saved);
        if long_division_remainder(poly, &candidate) == 0 {
            return BchRepair {
                errors: 1,
                data_bits: candidate[..data_len].to_bitvec(),
                bch_bits: candidate[data_len..].to_bitvec(),
            };
        }
        candidate.set(i, saved);
    }

    for i in 0..bits.len() {
        for j in (i + 1)..bits.len() {
            let si = candidate[i];
            let sj = candidate[j];
            candidate.set(i, !si);
            candidate.set(j, !sj);
            if long_division_remainder(poly, &candidate) == 0 {
                return BchRepair {
                    errors: 2,
                    data_bits: candidate[..data_len].to_bitvec(),
                    bch_bits: candidate[data_len..].to_bitvec(),
                };
            }
            candidate.set(i, si);
            candidate.set(j, sj);
        }
    }

    BchRepair {
        errors: -1,
        data_bits: bits[..data_len].to_bitvec(),
        bch_bits: bits[data_len..].to_bitvec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    /// poly=29 is 0b11101 (degree 4); an all-zero codeword always divides.
    #[test]
    fn zero_codeword_divides_to_zero() {
        let bits = parse_bitstring(&"0".repeat(10));
        assert_eq!(bch_divide(29, &bits), 0);
    }

    #[test]
    fn repair_corrects_single_bit_flip() {
        let bits = parse_bitstring(&"0".repeat(10));
        let mut flipped = bits.clone();
        flipped.set(3, true);
        let repaired = bch_repair(29, &flipped, 6);
        assert_eq!(repaired.errors, 1);
        assert!(repaired.data_bits.not_any());
    }

    #[test]
    fn repair_reports_failure_beyond_distance() {
        // Three errors spread across a ten-bit block with a degree-4
        // generator is expected to exceed this code's correction radius.
        let mut bits = parse_bitstring(&"0".repeat(10));
        bits.set(0, true);
        bits.set(4, true);
        bits.set(8, true);
        let repaired = bch_repair(29, &bits, 6);
        assert_eq!(repaired.errors, -1);
    }
}
