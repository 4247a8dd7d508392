//! Per-burst decode orchestration: access-code strip, classification, and
//! dispatch into the per-variant decoders, assembling one [`Frame`] per
//! input line.

use crate::bits::{chunks_with_remainder, parse_bitstring, BitSlice01, Bits};
use crate::burst::Burst;
use crate::classify::{self, BurstType};
use crate::decode::{broadcast, link_control, messaging, ring_alert, timing_location};
use crate::error::DecodeError;
use crate::frame::{Direction, Frame, FrameCommon, FrameVariant, LinkControlBody};
use crate::time::{global_time, DecoderContext};
use once_cell::sync::Lazy;

/// Options governing how tolerant the pipeline is of corrupted input,
/// threaded through from a caller-supplied configuration rather than parsed
/// from CLI flags here.
#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    pub uw_correction: bool,
    pub harder: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions { uw_correction: true, harder: false }
    }
}

static IRIDIUM_LEAD_OUT: Lazy<Bits> = Lazy::new(|| parse_bitstring("100101111010110110110011001111"));

fn lead_out_ok(extra: &BitSlice01) -> bool {
    extra.len() >= IRIDIUM_LEAD_OUT.len() && extra[..IRIDIUM_LEAD_OUT.len()] == IRIDIUM_LEAD_OUT[..]
}

/// Decode one [`Burst`] into a [`Frame`], advancing `ctx`'s running
/// timestamp state as a side effect.
pub fn decode(ctx: &mut DecoderContext, burst: Burst, options: &DecoderOptions) -> Frame {
    let time = global_time(&burst.source_name, burst.offset_ms, ctx);
    let mut common = FrameCommon {
        direction: Direction::Downlink,
        global_time: time,
        source_name: burst.source_name,
        offset_ms: burst.offset_ms,
        centre_frequency_hz: burst.centre_frequency_hz,
        confidence_pct: burst.confidence_pct,
        signal_level: burst.signal_level,
        symbol_count: 0,
        uw_errors_corrected: 0,
        fixed_errors: 0,
        lead_out_ok: false,
        error_log: Vec::new(),
    };

    if burst.symbols.len() < 24 {
        common.push_error(DecodeError::AccessCodeMissing);
        return Frame { common, variant: FrameVariant::Unknown };
    }

    let access = match classify::detect_access(&burst.symbols, options.uw_correction) {
        Ok(a) => a,
        Err(e) => {
            common.push_error(e);
            return Frame { common, variant: FrameVariant::Unknown };
        }
    };
    common.direction = access.direction;
    common.uw_errors_corrected = access.uw_errors_corrected;

    let payload = &burst.symbols[24..];
    common.symbol_count = payload.len() / 2;

    let burst_type = match classify::classify(payload, options.harder) {
        Ok(t) => t,
        Err(e) => {
            common.push_error(e);
            return Frame { common, variant: FrameVariant::Unknown };
        }
    };

    let variant = match burst_type {
        BurstType::Messaging => decode_messaging_variant(payload, &mut common),
        BurstType::TimingLocation => decode_timing_location_variant(payload, &mut common),
        BurstType::Broadcast => decode_broadcast_variant(payload, &mut common),
        BurstType::LinkControl => decode_link_control_variant(payload, &mut common),
        BurstType::RingAlert => decode_ring_alert_variant(payload, &mut common),
        BurstType::Unknown => {
            common.push_error(DecodeError::UnknownType);
            FrameVariant::Unknown
        }
    };

    Frame { common, variant }
}

fn decode_messaging_variant(payload: &BitSlice01, common: &mut FrameCommon) -> FrameVariant {
    if payload.len() < 32 {
        common.push_error(DecodeError::MessageTooShort { have: payload.len(), need: 32 });
        return FrameVariant::Unknown;
    }
    let header = &payload[..32];
    let body = &payload[32..];
    match messaging::decode_messaging(header, body) {
        Ok(decoded) => {
            common.fixed_errors += decoded.fixed_errors;
            for e in decoded.soft_errors {
                common.push_error(e);
            }
            let (_, extra) = chunks_with_remainder(body, 64);
            common.lead_out_ok = lead_out_ok(extra);
            FrameVariant::Messaging(decoded.messaging)
        }
        Err(e) => {
            common.push_error(e);
            FrameVariant::Unknown
        }
    }
}

fn decode_timing_location_variant(payload: &BitSlice01, common: &mut FrameCommon) -> FrameVariant {
    if payload.len() < 96 + 768 {
        common.push_error(DecodeError::MessageTooShort { have: payload.len(), need: 96 + 768 });
        return FrameVariant::Unknown;
    }
    let body = &payload[96..96 + 768];
    let extra = &payload[96 + 768..];
    common.lead_out_ok = lead_out_ok(extra);
    match timing_location::decode_timing_location(body) {
        Ok(tl) => FrameVariant::TimingLocation(tl),
        Err(e) => {
            common.push_error(e);
            FrameVariant::Unknown
        }
    }
}

fn decode_broadcast_variant(payload: &BitSlice01, common: &mut FrameCommon) -> FrameVariant {
    match broadcast::decode_broadcast(payload) {
        Ok(decoded) => {
            common.fixed_errors += decoded.fixed_errors;
            if payload.len() > 6 {
                let (_, extra) = chunks_with_remainder(&payload[6..], 64);
                common.lead_out_ok = lead_out_ok(extra);
            }
            FrameVariant::Broadcast(decoded.broadcast)
        }
        Err(e) => {
            common.push_error(e);
            FrameVariant::Unknown
        }
    }
}

fn decode_ring_alert_variant(payload: &BitSlice01, common: &mut FrameCommon) -> FrameVariant {
    if payload.len() < 96 {
        common.push_error(DecodeError::MessageTooShort { have: payload.len(), need: 96 });
        return FrameVariant::Unknown;
    }
    match ring_alert::decode_ring_alert(payload) {
        Ok(decoded) => {
            common.fixed_errors += decoded.fixed_errors;
            let (_, extra) = chunks_with_remainder(&payload[96..], 64);
            common.lead_out_ok = lead_out_ok(extra);
            FrameVariant::RingAlert(decoded.ring_alert)
        }
        Err(e) => {
            common.push_error(e);
            FrameVariant::Unknown
        }
    }
}

fn decode_link_control_variant(payload: &BitSlice01, common: &mut FrameCommon) -> FrameVariant {
    if payload.len() < 46 {
        common.push_error(DecodeError::MessageTooShort { have: payload.len(), need: 46 });
        return FrameVariant::Unknown;
    }
    let header = match link_control::decode_lcw_header(&payload[..46]) {
        Ok(h) => h,
        Err(e) => {
            common.push_error(e);
            return FrameVariant::Unknown;
        }
    };
    common.fixed_errors += header.fixed_errors;

    let body = &payload[46..];
    let used = 312.min(body.len());
    if used > 0 {
        let extra = &body[used..];
        common.lead_out_ok = lead_out_ok(extra);
    }

    match link_control::decode_lcw_body(header.word.frame_type, body) {
        Ok(lcw_body) => {
            if let LinkControlBody::Data(ref sbd) = lcw_body {
                if !sbd.crc_ok && sbd.da_len > 0 {
                    common.push_error(DecodeError::ChecksumFail);
                }
            }
            FrameVariant::LinkControl(header.word, lcw_body)
        }
        Err(e) => {
            common.push_error(e);
            FrameVariant::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::parse_line;

    #[test]
    fn unrecognisable_symbols_produce_error_frame() {
        let line = "RWA: src 0 0 A:ok I:ok 1% 0.0 1 00";
        let burst = parse_line(line).unwrap();
        let mut ctx = DecoderContext::default();
        let frame = decode(&mut ctx, burst, &DecoderOptions::default());
        assert!(frame.common.is_error());
    }

    #[test]
    fn downlink_access_code_alone_is_too_short_to_classify() {
        let bits = "001100000011000011110011";
        let line = format!("RWA: src 0 0 A:ok I:ok 1% 0.0 1 {bits}0");
        let burst = parse_line(&line).unwrap();
        let mut ctx = DecoderContext::default();
        let frame = decode(&mut ctx, burst, &DecoderOptions::default());
        assert_eq!(frame.common.direction, Direction::Downlink);
        assert!(frame.common.is_error());
    }
}
