//! Shared descramble-then-BCH-repair pipeline used by the MS, RA, BC, and
//! DA frame bodies.
//!
//! Each body is first split into a list of interleaved blocks (31 bits of
//! BCH-protected data, occasionally with one trailing parity bit making 32),
//! then every block is repaired independently and the recovered data bits
//! are concatenated into `bitstream_bch`. This mirrors the single shared
//! loop the original tooling runs for every ECC-protected message type,
//! just keyed on which BCH polynomial applies.

use crate::bits::{chunks_with_remainder, Bits, BitSlice01};
use crate::codec::{bch_repair, poly_bit_len};
use crate::interleave::{de_interleave, de_interleave3};

/// Split `payload` into 64-bit chunks (dropping any trailing partial
/// chunk, preserved as the returned remainder) and two-way de-interleave
/// each into `(odd, even)` 32-bit blocks, appended in that order.
fn sixty_four_bit_blocks(payload: &BitSlice01) -> (Vec<Bits>, Bits) {
    let (chunks, remainder) = chunks_with_remainder(payload, 64);
    let mut blocks = Vec::with_capacity(chunks.len() * 2);
    for chunk in chunks {
        let interleaved = de_interleave(chunk);
        let half = interleaved.len() / 2;
        blocks.push(interleaved[..half].to_bitvec());
        blocks.push(interleaved[half..].to_bitvec());
    }
    (blocks, remainder.to_bitvec())
}

/// MS body framing: the whole payload (after the 32-bit header has already
/// been stripped by the caller) is a chain of 64-bit two-way-interleaved
/// blocks.
pub fn ms_blocks(body: &BitSlice01) -> (Vec<Bits>, Bits) {
    sixty_four_bit_blocks(body)
}

/// BC body framing: identical to MS, applied after the 6-bit header.
pub fn bc_blocks(body: &BitSlice01) -> (Vec<Bits>, Bits) {
    sixty_four_bit_blocks(body)
}

/// RA body framing: the first 96 bits are three-way interleaved into three
/// 32-bit blocks, the remainder follows the ordinary 64-bit chain.
pub fn ra_blocks(payload: &BitSlice01) -> (Vec<Bits>, Bits) {
    assert!(payload.len() >= 96, "ring-alert body shorter than 96 bits");
    let (first, second, third) = de_interleave3(&payload[..96]);
    let mut blocks = vec![first, second, third];
    let (rest_blocks, extra) = sixty_four_bit_blocks(&payload[96..]);
    blocks.extend(rest_blocks);
    (blocks, extra)
}

/// DA (SBD) body framing: the 312-bit LCW payload is two 124-bit
/// two-way-interleaved chunks, each re-sliced into four 31-bit blocks in
/// `[b4, b2, b3, b1]` order, followed by one 64-bit two-way-interleaved
/// chunk whose halves each drop a leading bit to produce the final pair of
/// 31-bit blocks.
pub fn da_blocks(payload: &BitSlice01) -> Vec<Bits> {
    assert!(payload.len() >= 312, "DA body shorter than 312 bits");
    let mut blocks = Vec::with_capacity(10);
    for chunk in [&payload[0..124], &payload[124..248]] {
        let interleaved = de_interleave(chunk);
        let b1 = interleaved[0..31].to_bitvec();
        let b2 = interleaved[31..62].to_bitvec();
        let b3 = interleaved[62..93].to_bitvec();
        let b4 = interleaved[93..124].to_bitvec();
        blocks.push(b4);
        blocks.push(b2);
        blocks.push(b3);
        blocks.push(b1);
    }
    let end = &payload[248..312];
    let interleaved = de_interleave(end);
    let half = interleaved.len() / 2;
    blocks.push(interleaved[half + 1..].to_bitvec());
    blocks.push(interleaved[1..half].to_bitvec());
    blocks
}

/// Result of running the shared BCH-repair chain over a block list.
#[derive(Debug, Clone, Default)]
pub struct BchChain {
    pub bitstream_bch: Bits,
    pub bitstream_messaging: Bits,
    pub odd_bits: Bits,
    pub fixed_errors: u32,
    pub ok: bool,
}

/// Repair every block in `blocks` against `poly`, stopping at the first
/// block that fails to validate (BCH failure or, when a parity bit is
/// present, odd parity across `data‖bch‖parity`).
pub fn bch_chain(blocks: &[Bits], poly: u32) -> BchChain {
    let mut out = BchChain::default();
    // Every block here is a 31-bit BCH codeword; the split between data and
    // check bits depends on the generator's own degree, not a fixed width
    // (e.g. poly 3545 carries 20 data bits where 1207/1897 carry 21).
    let data_len = 31 - (poly_bit_len(poly) as usize - 1);
    for block in blocks {
        let (data_input, parity): (&BitSlice01, Option<bool>) = if block.len() == 32 {
            (&block[..31], Some(block[31]))
        } else if block.len() == 31 {
            (&block[..], None)
        } else {
            break;
        };

        let repair = bch_repair(poly, data_input, data_len);
        if repair.errors < 0 {
            break;
        }

        if let Some(parity_bit) = parity {
            let mut parity_bits = Bits::new();
            parity_bits.extend_from_bitslice(&repair.data_bits);
            parity_bits.extend_from_bitslice(&repair.bch_bits);
            parity_bits.push(parity_bit);
            let ones = parity_bits.count_ones();
            if ones % 2 == 1 {
                break;
            }
        }

        if repair.errors > 0 {
            out.fixed_errors += 1;
        }

        out.odd_bits.push(repair.data_bits[0]);
        out.bitstream_messaging.extend_from_bitslice(&repair.data_bits[1..]);
        out.bitstream_bch.extend_from_bitslice(&repair.data_bits);
    }
    out.ok = !out.bitstream_bch.is_empty();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn sixty_four_bit_chunking_drops_partial_remainder() {
        let payload = parse_bitstring(&"0".repeat(70));
        let (blocks, extra) = sixty_four_bit_blocks(&payload);
        assert_eq!(blocks.len(), 2);
        assert_eq!(extra.len(), 6);
    }

    #[test]
    fn bch_chain_on_all_zero_blocks_recovers_all_zero_data() {
        let block: Bits = std::iter::repeat(false).take(31).collect();
        let chain = bch_chain(&[block.clone(), block], crate::codec::poly::MESSAGING);
        assert!(chain.ok);
        assert_eq!(chain.bitstream_bch.len(), 42);
        assert!(chain.bitstream_bch.not_any());
    }

    #[test]
    fn bch_chain_stops_at_first_uncorrectable_block() {
        let mut garbage: Bits = std::iter::repeat(false).take(31).collect();
        for i in (0..31).step_by(3) {
            garbage.set(i, true);
        }
        let good: Bits = std::iter::repeat(false).take(31).collect();
        let chain = bch_chain(&[garbage, good], crate::codec::poly::MESSAGING);
        assert!(chain.bitstream_bch.is_empty());
    }
}
