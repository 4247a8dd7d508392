//! Bit-exact de-interleavers.
//!
//! The air interface groups bits into 2-bit symbols (with the pair stored
//! reversed) before spreading them across the burst; these functions invert
//! that spreading. See `SPEC_FULL.md` §4.5 for the exact permutations.

use crate::bits::{Bits, BitSlice01};
use bitvec::prelude::*;

/// Split a bit buffer into 2-bit "symbols", each symbol being the reversed
/// pair `bits[2k+1] ‖ bits[2k]`.
fn to_symbols(bits: &BitSlice01) -> Vec<(bool, bool)> {
    assert_eq!(bits.len() % 2, 0, "de-interleaving requires an even bit count");
    bits.chunks_exact(2).map(|pair| (pair[1], pair[0])).collect()
}

fn push_symbol(out: &mut Bits, symbol: (bool, bool)) {
    out.push(symbol.0);
    out.push(symbol.1);
}

/// Two-way de-interleave: odd-indexed symbols (stepping backward from the
/// last) followed by even-indexed symbols.
pub fn de_interleave(bits: &BitSlice01) -> Bits {
    let symbols = to_symbols(bits);
    let n = symbols.len();
    let mut out = Bits::with_capacity(bits.len());
    let mut i = n.checked_sub(1);
    while let Some(idx) = i {
        push_symbol(&mut out, symbols[idx]);
        i = idx.checked_sub(2);
    }
    let mut i = n.checked_sub(2);
    while let Some(idx) = i {
        push_symbol(&mut out, symbols[idx]);
        i = idx.checked_sub(2);
    }
    out
}

/// Three-way de-interleave: three output streams, each stepping back by 3
/// symbols from offsets `n-1`, `n-2`, `n-3`.
pub fn de_interleave3(bits: &BitSlice01) -> (Bits, Bits, Bits) {
    let symbols = to_symbols(bits);
    let n = symbols.len();
    let build = |start: usize| -> Bits {
        let mut out = Bits::new();
        let mut i = if start < n { Some(start) } else { None };
        while let Some(idx) = i {
            push_symbol(&mut out, symbols[idx]);
            i = idx.checked_sub(3);
        }
        out
    };
    (build(n.wrapping_sub(1)), build(n.wrapping_sub(2)), build(n.wrapping_sub(3)))
}

/// Fixed 1-based permutation used to de-interleave the 46-bit link control
/// word into its three constituent fields (7, 13, and 21 bits).
const LCW_PERMUTATION: [usize; 46] = [
    40, 39, 36, 35, 32, 31, 28, 27, 24, 23, 20, 19, 16, 15, 12, 11, 8, 7, 4, 3, 41, 38, 37, 34, 33,
    30, 29, 26, 25, 22, 21, 18, 17, 14, 13, 10, 9, 6, 5, 2, 1, 46, 45, 44, 43, 42,
];

/// De-interleave the 46-bit LCW header into `(lcw1: 7b, lcw2: 13b, lcw3: 26b)`.
pub fn de_interleave_lcw(bits: &BitSlice01) -> (Bits, Bits, Bits) {
    assert_eq!(bits.len(), 46, "LCW de-interleave requires exactly 46 bits");
    let mut permuted: Bits = Bits::with_capacity(46);
    for &one_based in LCW_PERMUTATION.iter() {
        permuted.push(bits[one_based - 1]);
    }
    let lcw1 = permuted[0..7].to_bitvec();
    let lcw2 = permuted[7..20].to_bitvec();
    let lcw3 = permuted[20..46].to_bitvec();
    (lcw1, lcw2, lcw3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn de_interleave_preserves_length() {
        let bits = parse_bitstring(&"01".repeat(16));
        let out = de_interleave(&bits);
        assert_eq!(out.len(), bits.len());
    }

    #[test]
    fn de_interleave3_splits_into_equal_thirds_when_divisible() {
        let bits = parse_bitstring(&"10".repeat(9));
        let (a, b, c) = de_interleave3(&bits);
        assert_eq!(a.len() + b.len() + c.len(), bits.len());
    }

    #[test]
    fn lcw_permutation_preserves_bit_count() {
        let bits = parse_bitstring(&"0".repeat(46));
        let (a, b, c) = de_interleave_lcw(&bits);
        assert_eq!((a.len(), b.len(), c.len()), (7, 13, 26));
    }
}
