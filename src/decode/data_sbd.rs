//! DA (mobile-originated SBD) body decoding.
//!
//! Grounded on `IridiumLCWMessage` in `original_source/iridium-parser.py`:
//! the BCH-repaired bitstream is read at fixed 20-bit-unit offsets, and the
//! CRC-16 is computed over the header block re-padded with twelve zero
//! bits (a byte-alignment quirk of the original framing, preserved here).

use crate::bits::{load_be_u128, BitSlice01, Bits};
use crate::codec::crc16_ccitt_false;
use crate::error::{DecodeError, NotEnoughDataSnafu, ZeroFieldViolationSnafu};
use crate::frame::DataSbd;
use snafu::ensure;

fn bits_to_bytes(bits: &BitSlice01) -> Vec<u8> {
    bits.chunks_exact(8).map(|b| load_be_u128(b) as u8).collect()
}

pub fn decode_data_sbd(bitstream_bch: &BitSlice01) -> Result<DataSbd, DecodeError> {
    ensure!(bitstream_bch.len() >= 20, NotEnoughDataSnafu);

    let flags1 = load_be_u128(&bitstream_bch[0..4]) as u8;
    let cont = bitstream_bch[4];
    let da_ctr = load_be_u128(&bitstream_bch[5..8]) as u8;
    let flags2 = load_be_u128(&bitstream_bch[8..11]) as u8;
    let da_len = load_be_u128(&bitstream_bch[11..16]) as u8;
    let flags3 = bitstream_bch[16];
    let zero1 = load_be_u128(&bitstream_bch[17..20]) as u8;
    ensure!(zero1 == 0, ZeroFieldViolationSnafu);

    ensure!(bitstream_bch.len() >= 9 * 20 + 16, NotEnoughDataSnafu);

    let data = bits_to_bytes(&bitstream_bch[20..bitstream_bch.len().min(180)]);

    let (da_ta, da_crc16, crc_ok) = if da_len > 0 {
        let da_ta = bits_to_bytes(&bitstream_bch[20..180]);
        let da_crc16 = load_be_u128(&bitstream_bch[180..196]) as u16;

        let mut crcstream: Bits = bitstream_bch[0..20].to_bitvec();
        crcstream.extend(std::iter::repeat(false).take(12));
        crcstream.extend_from_bitslice(&bitstream_bch[20..bitstream_bch.len() - 4]);
        let crc_bytes = bits_to_bytes(&crcstream);
        let crc_ok = crc16_ccitt_false(&crc_bytes) == 0;

        if bitstream_bch.len() > 196 {
            let zero2 = load_be_u128(&bitstream_bch[196..]) as u32;
            if zero2 != 0 {
                return Err(ZeroFieldViolationSnafu.build());
            }
        }
        (da_ta, da_crc16, crc_ok)
    } else {
        let da_ta = bits_to_bytes(&bitstream_bch[20..]);
        (da_ta, 0, false)
    };

    Ok(DataSbd { flags1, cont, da_ctr, flags2, da_len, flags3, da_ta, data, da_crc16, crc_ok })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn short_stream_errors() {
        let bits = parse_bitstring(&"0".repeat(10));
        assert!(decode_data_sbd(&bits).is_err());
    }

    #[test]
    fn all_zero_stream_decodes_with_zero_len() {
        let bits = parse_bitstring(&"0".repeat(200));
        let decoded = decode_data_sbd(&bits).unwrap();
        assert_eq!(decoded.da_len, 0);
        assert!(!decoded.crc_ok);
    }

    #[test]
    fn stream_below_nine_blocks_plus_crc_errors_regardless_of_da_len() {
        // 20 header bits plus a short tail: valid header shape (zero1==0)
        // but shorter than the mandatory 9*20+16 = 196 bits.
        let bits = parse_bitstring(&"0".repeat(100));
        assert!(decode_data_sbd(&bits).is_err());
    }
}
