//! MS (paging/messaging) body decoding.
//!
//! Grounded on `IridiumMSMessage`, `IridiumMessagingAscii`, and
//! `IridiumMessagingUnknown` in `original_source/iridium-parser.py`: field
//! offsets, the pre/trailer stripping rules driven by the odd-bit stream,
//! and the 7-bit-group ASCII decoding with its `ETX`-delimited rest are
//! ported verbatim, just against packed `BitSlice01` instead of `'0'/'1'`
//! strings.

use crate::bits::{bits_to_string, load_be_u128, BitSlice01, Bits};
use crate::decode::ecc::bch_chain;
use crate::error::{DecodeError, MessageTooShortSnafu, UnsupportedFormatSnafu, ZeroFieldViolationSnafu};
use crate::frame::{Messaging, MessagingAscii, MessagingBody, MessagingGroup, MessagingUnknown};
use snafu::ensure;

pub struct MsDecoded {
    pub messaging: Messaging,
    pub fixed_errors: u32,
    /// Non-fatal violations recorded along the way (e.g. a zero-sentinel
    /// field that wasn't zero); the original tooling logs these with
    /// `_new_error` but keeps decoding rather than aborting.
    pub soft_errors: Vec<DecodeError>,
}

/// Decode the MS body: `header` is the 32-bit field this format's
/// classification check validated; `body` is everything after it.
pub fn decode_messaging(header: &BitSlice01, body: &BitSlice01) -> Result<MsDecoded, DecodeError> {
    let (blocks, _extra) = crate::decode::ecc::ms_blocks(body);
    let chain = bch_chain(&blocks, crate::codec::poly::MESSAGING);
    ensure!(chain.bitstream_messaging.len() >= 32, MessageTooShortSnafu { have: chain.bitstream_messaging.len(), need: 32usize });

    let mut soft_errors = Vec::new();

    let rest = &chain.bitstream_messaging;
    let zero1 = load_be_u128(&rest[0..4]) as u8;
    if zero1 != 0 {
        soft_errors.push(ZeroFieldViolationSnafu.build());
    }
    let _ = header;

    let block = load_be_u128(&rest[4..8]) as u8;
    let frame = load_be_u128(&rest[8..14]) as u8;
    let bch_blocks = load_be_u128(&rest[14..18]) as u8;
    let oddbits = &chain.odd_bits;

    let (group, agroup) = if !oddbits.is_empty() && oddbits[0] {
        (MessagingGroup::A, 0u8)
    } else {
        let g = load_be_u128(&rest[18..20]) as u8;
        (MessagingGroup::Numbered(g), 1 + g)
    };
    let secondary = rest[19];
    // ctr1 splices in the *second* odd-parity bit between rest[19] and
    // rest[20:32] -- the 14-bit field isn't a contiguous slice of `rest`.
    ensure!(oddbits.len() >= 2, MessageTooShortSnafu { have: oddbits.len(), need: 2usize });
    let mut ctr1_bits = Bits::with_capacity(14);
    ctr1_bits.push(rest[19]);
    ctr1_bits.push(oddbits[1]);
    ctr1_bits.extend_from_bitslice(&rest[20..32]);
    let ctr1 = load_be_u128(&ctr1_bits) as u32;
    let tdiff_ms = ((block as u32 * 5 + agroup as u32) * 48 + frame as u32) * 90;

    ensure!(bch_blocks >= 2, MessageTooShortSnafu { have: bch_blocks as usize, need: 2usize });

    let need_bits = bch_blocks as usize * 40;
    let mut stream = chain.bitstream_messaging.clone();
    if stream.len() >= need_bits {
        stream.truncate(need_bits);
    }
    let mut odd = oddbits.clone();
    if odd.len() >= bch_blocks as usize * 2 {
        odd.truncate(bch_blocks as usize * 2);
    }

    if !odd.is_empty() && *odd.last().unwrap() && stream.len() >= 20 {
        stream.truncate(stream.len() - 20);
        if odd.len() >= 2 && odd[odd.len() - 2] && stream.len() >= 20 {
            stream.truncate(stream.len() - 20);
        }
    }

    let (msg_pre, after_pre) = if !odd.is_empty() && odd[0] && stream.len() >= 100 {
        (Some(bits_to_string(&stream[20..100])), stream[100..].to_bitvec())
    } else if stream.len() >= 20 {
        (None, stream[20..].to_bitvec())
    } else {
        (None, Bits::new())
    };

    let mut msg = Messaging {
        block,
        frame,
        bch_blocks,
        secondary,
        group,
        ctr1,
        tdiff_ms,
        msg_pre,
        msg_ric: None,
        msg_format: None,
        body: None,
    };

    if after_pre.len() > 20 {
        let msg_ric = reverse_load(&after_pre[0..22]);
        let msg_format = load_be_u128(&after_pre[22..27]) as u8;
        let msg_data = &after_pre[27..];
        msg.msg_ric = Some(msg_ric);
        msg.msg_format = Some(msg_format);
        msg.body = match msg_format {
            5 => Some(MessagingBody::Ascii(decode_ascii(msg_data, &mut soft_errors)?)),
            3 => Some(MessagingBody::Unknown(decode_unknown(msg_data, &mut soft_errors)?)),
            other => return Err(UnsupportedFormatSnafu { format: other }.build()),
        };
    }

    Ok(MsDecoded { messaging: msg, fixed_errors: chain.fixed_errors, soft_errors })
}

/// `msg_ric` is transmitted bit-reversed (`rest[0:22][::-1]` in the
/// original tooling).
fn reverse_load(bits: &BitSlice01) -> u32 {
    let mut reversed: Bits = Bits::with_capacity(bits.len());
    for bit in bits.iter().rev() {
        reversed.push(*bit);
    }
    load_be_u128(&reversed) as u32
}

fn decode_ascii(rest: &BitSlice01, soft_errors: &mut Vec<DecodeError>) -> Result<MessagingAscii, DecodeError> {
    ensure!(rest.len() >= 21, MessageTooShortSnafu { have: rest.len(), need: 21usize });
    let msg_seq = load_be_u128(&rest[0..6]) as u8;
    let msg_zero1 = load_be_u128(&rest[6..10]) as u8;
    ensure!(msg_zero1 == 0, ZeroFieldViolationSnafu);
    let msg_unknown1 = bits_to_string(&rest[10..20]);
    let msg_len_bit = rest[20];
    let mut cursor = &rest[21..];

    let (msg_ctr, msg_ctr_max) = if msg_len_bit {
        ensure!(cursor.len() >= 4, MessageTooShortSnafu { have: cursor.len(), need: 4usize });
        let lfl = load_be_u128(&cursor[0..4]) as usize;
        ensure!(lfl != 0, MessageTooShortSnafu { have: 0usize, need: 1usize });
        ensure!(cursor.len() >= 4 + lfl * 2, MessageTooShortSnafu { have: cursor.len(), need: 4 + lfl * 2 });
        let ctr = load_be_u128(&cursor[4..4 + lfl]) as u32;
        let ctr_max = load_be_u128(&cursor[4 + lfl..4 + lfl * 2]) as u32;
        cursor = &cursor[4 + lfl * 2..];
        (Some(ctr), Some(ctr_max))
    } else {
        (None, None)
    };

    ensure!(!cursor.is_empty(), MessageTooShortSnafu { have: 0usize, need: 1usize });
    let msg_zero2 = cursor[0];
    if msg_zero2 {
        soft_errors.push(ZeroFieldViolationSnafu.build());
    }
    ensure!(cursor.len() >= 8, MessageTooShortSnafu { have: cursor.len(), need: 8usize });
    let msg_checksum = load_be_u128(&cursor[1..8]) as u8;
    let msg_msgdata = &cursor[8..];

    let mut msg_ascii = String::new();
    let groups = msg_msgdata.len() / 7;
    let mut end_seen = false;
    for g in 0..groups {
        let group = &msg_msgdata[g * 7..g * 7 + 7];
        let character = load_be_u128(group) as u32;
        if character == 3 {
            end_seen = true;
        }
        if character < 32 || character == 127 {
            msg_ascii.push_str(&format!("[{character}]"));
        } else if let Some(c) = char::from_u32(character) {
            msg_ascii.push(c);
        }
        let _ = end_seen;
    }
    let remainder_bits = msg_msgdata.len() % 7;
    let msg_rest = if remainder_bits != 0 {
        Some(bits_to_string(&msg_msgdata[msg_msgdata.len() - remainder_bits..]))
    } else {
        None
    };

    Ok(MessagingAscii { msg_seq, msg_unknown1, msg_ctr, msg_ctr_max, msg_checksum, msg_ascii, msg_rest })
}

fn decode_unknown(rest: &BitSlice01, _soft_errors: &mut Vec<DecodeError>) -> Result<MessagingUnknown, DecodeError> {
    ensure!(rest.len() >= 21, MessageTooShortSnafu { have: rest.len(), need: 21usize });
    let msg_seq = load_be_u128(&rest[0..6]) as u8;
    let msg_zero1 = load_be_u128(&rest[6..10]) as u8;
    ensure!(msg_zero1 == 0, ZeroFieldViolationSnafu);
    let msg_unknown2 = rest[20];
    let msg_msgdata = bits_to_string(&rest[21..]);
    Ok(MessagingUnknown { msg_seq, msg_unknown2, msg_msgdata })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn short_body_errors() {
        let header = parse_bitstring(&"0".repeat(32));
        let body = parse_bitstring(&"0".repeat(10));
        assert!(decode_messaging(&header, &body).is_err());
    }

    #[test]
    fn all_zero_body_has_no_secondary_and_no_message() {
        let header = parse_bitstring(&"0".repeat(32));
        let body: Bits = std::iter::repeat(false).take(64 * 4).collect();
        let decoded = decode_messaging(&header, &body).unwrap();
        assert!(!decoded.messaging.secondary);
        assert_eq!(decoded.messaging.tdiff_ms, 0);
        assert!(decoded.soft_errors.is_empty());
    }

    #[test]
    fn ascii_nonzero_msg_zero2_is_recorded_as_soft_error_not_a_hard_failure() {
        // 6b seq + 4b zero1(=0) + 10b unknown1 + len_bit(=0) + zero2(=1) +
        // 7b checksum + no message data.
        let mut rest = parse_bitstring(&"0".repeat(21));
        rest.set(20, true); // msg_zero2
        let mut soft_errors = Vec::new();
        let decoded = decode_ascii(&rest, &mut soft_errors).unwrap();
        assert_eq!(decoded.msg_seq, 0);
        assert_eq!(soft_errors.len(), 1);
        assert!(matches!(soft_errors[0], DecodeError::ZeroFieldViolation));
    }
}
