//! RA (ring-alert) frame decoding.
//!
//! Grounded directly on `IridiumRAMessage` in `original_source/iridium-parser.py`:
//! position/beam/paging fields are read from `bitstream_bch` at the same
//! fixed offsets, and the `NONE`/`FILL` end-of-list sanity rule is
//! preserved verbatim.

use crate::bits::{load_be_u128, load_signed, BitSlice01};
use crate::codec::poly;
use crate::decode::ecc::{bch_chain, ra_blocks};
use crate::error::{DecodeError, MessageTooShortSnafu};
use crate::frame::{PagingKind, PagingRecord, RingAlert};

const NONE_PAGE: &str = "111111111111111111111111111111111111111111";
const FILL_PAGE: &str = "101000100111001110111010101000100010111000";

pub struct RaDecoded {
    pub ring_alert: RingAlert,
    pub fixed_errors: u32,
}

pub fn decode_ring_alert(payload: &BitSlice01) -> Result<RaDecoded, DecodeError> {
    let (blocks, _extra) = ra_blocks(payload);
    let chain = bch_chain(&blocks, poly::RA_BC);
    if chain.bitstream_bch.len() < 63 {
        return Err(MessageTooShortSnafu { have: chain.bitstream_bch.len(), need: 63 }.build());
    }
    let d = &chain.bitstream_bch;

    let sat_id = load_be_u128(&d[0..7]) as u8;
    let beam_id = load_be_u128(&d[7..13]) as u8;
    let pos_x = sign_magnitude(&d[13..14], &d[14..25]);
    let pos_y = sign_magnitude(&d[25..26], &d[26..37]);
    let pos_z = sign_magnitude(&d[37..38], &d[38..49]);
    let interval = load_be_u128(&d[49..56]) as u8;
    let timeslot = d[56];
    let eip = d[57];
    let bc_subband = load_be_u128(&d[58..63]) as u8;

    let (lat, lon, alt) = position_to_geo(pos_x, pos_y, pos_z);

    let mut pages = Vec::new();
    let mut page_end: Option<usize> = None;
    let mut page_sane = true;
    let mut ra_extra = None;
    let mut rest = &d[63..];
    while rest.len() >= 42 {
        let record = &rest[..42];
        let text = crate::bits::bits_to_string(record);
        if text == NONE_PAGE {
            if page_end.is_none() {
                page_end = Some(pages.len());
            } else {
                page_sane = false;
            }
            pages.push(PagingRecord { tmsi: 0, msc_id: 0, kind: PagingKind::None });
        } else if text == FILL_PAGE {
            if page_end.is_none() {
                page_sane = false;
            }
            pages.push(PagingRecord { tmsi: 0, msc_id: 0, kind: PagingKind::Fill });
        } else {
            if page_end.is_some() {
                page_sane = false;
            }
            let tmsi = load_be_u128(&record[0..32]) as u32;
            let msc_id = load_be_u128(&record[34..39]) as u8;
            pages.push(PagingRecord { tmsi, msc_id, kind: PagingKind::Normal });
        }
        rest = &rest[42..];
    }
    if !page_sane {
        ra_extra = Some(crate::bits::bits_to_string(rest));
    }

    Ok(RaDecoded {
        ring_alert: RingAlert {
            sat_id,
            beam_id,
            pos_x,
            pos_y,
            pos_z,
            interval,
            timeslot,
            eip,
            bc_subband,
            lat,
            lon,
            alt,
            pages,
            page_sane,
            ra_extra,
        },
        fixed_errors: chain.fixed_errors,
    })
}

fn sign_magnitude(sign_bit: &BitSlice01, magnitude: &BitSlice01) -> i32 {
    let mag = load_be_u128(magnitude) as i32;
    if sign_bit[0] {
        mag - (1 << magnitude.len())
    } else {
        mag
    }
}

fn position_to_geo(x: i32, y: i32, z: i32) -> (f64, f64, f64) {
    let (x, y, z) = (x as f64, y as f64, z as f64);
    let lat = (z).atan2((x * x + y * y).sqrt()) * 180.0 / std::f64::consts::PI;
    let lon = y.atan2(x) * 180.0 / std::f64::consts::PI;
    let alt = (x * x + y * y + z * z).sqrt() * 4.0;
    (lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn zero_position_gives_zero_altitude() {
        let (lat, lon, alt) = position_to_geo(0, 0, 0);
        assert_eq!(alt, 0.0);
        assert_eq!(lat, 0.0);
        assert_eq!(lon, 0.0);
    }

    #[test]
    fn uncorrectable_header_block_errors() {
        // Scatter enough flipped bits into the first 96 bits that the
        // first de-interleaved block exceeds the BCH correction radius,
        // leaving an empty `bitstream_bch`.
        let mut s = "1".repeat(30) + &"0".repeat(66);
        s.truncate(96);
        let payload = parse_bitstring(&s);
        assert!(decode_ring_alert(&payload).is_err());
    }

    #[test]
    fn sign_magnitude_handles_negative() {
        let sign = parse_bitstring("1");
        let mag = parse_bitstring("00000000101"); // 5
        assert_eq!(sign_magnitude(&sign, &mag), 5 - 2048);
    }
}
