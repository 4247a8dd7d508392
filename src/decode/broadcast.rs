//! BC (broadcast) frame decoding, grounded on `IridiumBCMessage` in
//! `original_source/iridium-parser.py`.

use crate::bits::{bits_to_string, chunks_with_remainder, load_be_u128, BitSlice01};
use crate::codec::{bch_repair, poly};
use crate::decode::ecc::{bc_blocks, bch_chain};
use crate::error::{DecodeError, HeaderBchFailureSnafu};
use crate::frame::{Broadcast, BroadcastSubblock, BroadcastSubblockKind, LengthTag};
use crate::time::fmt_iritime;

const CHANNEL_ASSIGNMENT_NONE: &str = "111000000000000000000000000000000000000000";
const TYPE4_FIXED: &str = "000100000000100001110000110000110011110000";

pub struct BcDecoded {
    pub broadcast: Broadcast,
    pub fixed_errors: u32,
}

pub fn decode_broadcast(payload: &BitSlice01) -> Result<BcDecoded, DecodeError> {
    if payload.len() < 6 {
        return Err(crate::error::MessageTooShortSnafu { have: payload.len(), need: 6 }.build());
    }
    let header = &payload[..6];
    let header_repair = bch_repair(poly::HEADER, header, 2);
    if header_repair.errors < 0 {
        return Err(HeaderBchFailureSnafu.build());
    }
    let bc_type = load_be_u128(&header_repair.data_bits) as u8;

    let (blocks, _extra) = bc_blocks(&payload[6..]);
    let chain = bch_chain(&blocks, poly::RA_BC);

    let (mut sub_blocks, _rest) = chunks_with_remainder(&chain.bitstream_bch, 42);
    let length_tag = if sub_blocks.len() > 4 {
        sub_blocks.truncate(4);
        LengthTag::Long
    } else if sub_blocks.len() < 4 {
        LengthTag::Short
    } else {
        LengthTag::Exact
    };

    let mut subblocks = Vec::new();
    let mut iter = sub_blocks.into_iter();

    if bc_type == 0 {
        if let Some(data) = iter.next() {
            subblocks.push(BroadcastSubblock { raw: bits_to_string(data), kind: BroadcastSubblockKind::Unrecognised });
        }
        if let Some(data) = iter.next() {
            let kind = decode_type_subblock(data);
            subblocks.push(BroadcastSubblock { raw: bits_to_string(data), kind });
        }
    }

    for data in iter {
        let kind = if bits_to_string(data) == CHANNEL_ASSIGNMENT_NONE {
            BroadcastSubblockKind::Unrecognised
        } else {
            decode_channel_assignment(data)
        };
        subblocks.push(BroadcastSubblock { raw: bits_to_string(data), kind });
    }

    Ok(BcDecoded {
        broadcast: Broadcast { bc_type, header_bch_errors: header_repair.errors, subblocks, length_tag },
        fixed_errors: chain.fixed_errors,
    })
}

fn decode_type_subblock(data: &BitSlice01) -> BroadcastSubblockKind {
    let ty = load_be_u128(&data[0..6]) as u8;
    match ty {
        0 => BroadcastSubblockKind::MaxUplinkPower { max_uplink_pwr: load_be_u128(&data[36..42]) as u8 },
        1 => {
            let iri_time_raw = load_be_u128(&data[10..42]) as u32;
            BroadcastSubblockKind::IriTime { iri_time_raw, iri_time_unix: fmt_iritime(iri_time_raw as f64) }
        }
        2 => {
            let tmsi_expiry_raw = load_be_u128(&data[10..42]) as u64;
            BroadcastSubblockKind::TmsiExpiry { tmsi_expiry_raw, tmsi_expiry_unix: fmt_iritime(tmsi_expiry_raw as f64) }
        }
        4 => {
            if bits_to_string(data) == TYPE4_FIXED {
                BroadcastSubblockKind::FixedPattern
            } else {
                BroadcastSubblockKind::Unrecognised
            }
        }
        _ => BroadcastSubblockKind::Unrecognised,
    }
}

fn decode_channel_assignment(data: &BitSlice01) -> BroadcastSubblockKind {
    BroadcastSubblockKind::ChannelAssignment {
        random_id: load_be_u128(&data[3..11]) as u8,
        timeslot: 1 + load_be_u128(&data[11..13]) as u8,
        uplink_subband: load_be_u128(&data[13..18]) as u8,
        downlink_subband: load_be_u128(&data[18..23]) as u8,
        access: 1 + load_be_u128(&data[23..26]) as u8,
        dtoa: load_be_u128(&data[26..34]) as u8,
        dfoa: load_be_u128(&data[34..40]) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn short_header_errors() {
        let payload = parse_bitstring("000");
        assert!(decode_broadcast(&payload).is_err());
    }

    #[test]
    fn all_zero_body_classifies_as_short() {
        let mut s = "000000".to_string(); // header, divides to 0 under poly 29
        s.push_str(&"0".repeat(64));
        let payload = parse_bitstring(&s);
        let decoded = decode_broadcast(&payload).unwrap();
        assert_eq!(decoded.broadcast.bc_type, 0);
        assert_eq!(decoded.broadcast.length_tag, LengthTag::Short);
    }
}
