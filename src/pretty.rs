//! Render a decoded [`Frame`] back into the documented one-line-per-burst
//! text format, the Rust counterpart of the per-subclass `pretty()` methods
//! in `original_source/iridium-parser.py`.

use crate::decoder::DecoderOptions;
use crate::frame::{
    BroadcastSubblockKind, Direction, Frame, FrameVariant, IpFrame, LinkControlBody, MessagingBody, PagingKind, U3Body,
    VoiceBody,
};

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(".")
}

fn flags(frame: &Frame, options: &DecoderOptions) -> String {
    let mut out = String::new();
    if options.uw_correction {
        out.push_str(&format!("-UW:{}", frame.common.uw_errors_corrected));
    }
    if options.harder {
        let lcw = match &frame.variant {
            FrameVariant::LinkControl(word, _) => word.lcw2_errors.max(0),
            _ => 0,
        };
        out.push_str(&format!("-LCW:{lcw}"));
    }
    if frame.common.fixed_errors > 0 {
        out.push_str(&format!("-FIX:{}", frame.common.fixed_errors));
    }
    out
}

fn header(frame: &Frame, prefix: &str, options: &DecoderOptions) -> String {
    let c = &frame.common;
    let direction = match c.direction {
        Direction::Downlink => "DL",
        Direction::Uplink => "UL",
    };
    format!(
        "{prefix}{flags}: {source} {offset:014.4} {freq:010} {conf:3}% {level:7.3} {symbols:03} {direction}",
        prefix = prefix,
        flags = flags(frame, options),
        source = c.source_name,
        offset = c.offset_ms,
        freq = c.centre_frequency_hz,
        conf = c.confidence_pct,
        level = c.signal_level,
        symbols = c.symbol_count,
        direction = direction,
    )
}

/// Render `frame` as one output line.
pub fn pretty(frame: &Frame, options: &DecoderOptions) -> String {
    if frame.common.is_error() {
        let msgs: Vec<String> = frame.common.error_log.iter().map(|e| e.to_string()).collect();
        return format!("{} ERR:{}", header(frame, "ERR", options), msgs.join(", "));
    }

    match &frame.variant {
        FrameVariant::Unknown => header(frame, "IRI", options),
        FrameVariant::Messaging(m) => pretty_messaging(frame, m, options),
        FrameVariant::TimingLocation(tl) => {
            format!(
                "{} [{}] [{}] [{}]",
                header(frame, "ITL", options),
                hex_nibbles(&tl.field_a),
                hex_nibbles(&tl.field_b),
                hex_nibbles(&tl.field_c)
            )
        }
        FrameVariant::Broadcast(bc) => {
            let mut s = format!("{} bc:{}", header(frame, "IBC", options), bc.bc_type);
            for sb in &bc.subblocks {
                s.push(' ');
                s.push_str(&pretty_broadcast_subblock(&sb.kind));
            }
            s
        }
        FrameVariant::RingAlert(ra) => {
            let mut s = format!(
                "{} sat:{:03} beam:{:02} lat:{:.4} lon:{:.4} alt:{:.1}",
                header(frame, "IRA", options),
                ra.sat_id,
                ra.beam_id,
                ra.lat,
                ra.lon,
                ra.alt
            );
            for p in &ra.pages {
                match p.kind {
                    PagingKind::Normal => s.push_str(&format!(" tmsi:{:08x}/msc:{}", p.tmsi, p.msc_id)),
                    PagingKind::None => s.push_str(" -"),
                    PagingKind::Fill => s.push_str(" ."),
                }
            }
            if !ra.page_sane {
                s.push_str(" page_order:bad");
            }
            s
        }
        FrameVariant::LinkControl(_, body) => pretty_link_control(frame, body, options),
    }
}

fn hex_nibbles(bits: &str) -> String {
    bits.as_bytes()
        .chunks(4)
        .map(|c| {
            let s = std::str::from_utf8(c).unwrap_or("0000");
            format!("{:x}", u8::from_str_radix(s, 2).unwrap_or(0))
        })
        .collect()
}

fn pretty_messaging(frame: &Frame, m: &crate::frame::Messaging, options: &DecoderOptions) -> String {
    let prefix = match &m.body {
        None => "IMS",
        Some(MessagingBody::Ascii(_)) => "MSG",
        Some(MessagingBody::Unknown(_)) => "MS3",
    };
    let mut s = format!(
        "{} block:{} frame:{} ctr1:{} tdiff:{}ms",
        header(frame, prefix, options),
        m.block,
        m.frame,
        m.ctr1,
        m.tdiff_ms
    );
    if let Some(ric) = m.msg_ric {
        s.push_str(&format!(" ric:{ric}"));
    }
    match &m.body {
        Some(MessagingBody::Ascii(a)) => {
            s.push_str(&format!(" seq:{} csum:{:02x} \"{}\"", a.msg_seq, a.msg_checksum, a.msg_ascii));
        }
        Some(MessagingBody::Unknown(u)) => {
            s.push_str(&format!(" seq:{} data:{}", u.msg_seq, u.msg_msgdata));
        }
        None => {}
    }
    s
}

fn pretty_broadcast_subblock(kind: &BroadcastSubblockKind) -> String {
    match kind {
        BroadcastSubblockKind::MaxUplinkPower { max_uplink_pwr } => format!("maxpwr:{max_uplink_pwr}"),
        BroadcastSubblockKind::IriTime { iri_time_unix, .. } => format!("time:{iri_time_unix:.3}"),
        BroadcastSubblockKind::TmsiExpiry { tmsi_expiry_unix, .. } => format!("tmsi_exp:{tmsi_expiry_unix:.3}"),
        BroadcastSubblockKind::FixedPattern => "fixed".to_string(),
        BroadcastSubblockKind::ChannelAssignment {
            random_id,
            timeslot,
            uplink_subband,
            downlink_subband,
            access,
            dtoa,
            dfoa,
        } => format!(
            "chan[id:{random_id},slot:{timeslot},up:{uplink_subband},dn:{downlink_subband},acc:{access},dtoa:{dtoa},dfoa:{dfoa}]"
        ),
        BroadcastSubblockKind::Unrecognised => "-".to_string(),
    }
}

fn pretty_link_control(frame: &Frame, body: &LinkControlBody, options: &DecoderOptions) -> String {
    match body {
        LinkControlBody::Voice(VoiceBody::Rs(rs)) => {
            let prefix = if rs.six_bit { "VO6" } else { "VOD" };
            let ok = if rs.perfect { "OK" } else { "ok" };
            format!("{} RS={ok} [{}]", header(frame, prefix, options), hex_bytes(&rs.message))
        }
        LinkControlBody::Voice(VoiceBody::CrcFail(raw)) => {
            format!("{} [{}]", header(frame, "VOC", options), hex_bytes(&raw.raw_payload))
        }
        LinkControlBody::Ip(IpFrame::Direct(hdr)) => {
            let prefix = if hdr.via_vda { "VDA" } else { "IIP" };
            format!(
                "{} type:{:02x} seq:{:03} ack:{:03} cs:{:03}/{} len:{:03} [{}] {:06x} FCS:OK",
                header(frame, prefix, options),
                hdr.ip_hdr,
                hdr.ip_seq,
                hdr.ip_ack,
                hdr.ip_cs,
                if hdr.header_checksum_ok { "OK" } else { "no" },
                hdr.ip_len,
                hex_bytes(&hdr.ip_data),
                hdr.ip_cksum,
            )
        }
        LinkControlBody::Ip(IpFrame::Rs(rs)) => {
            let prefix = if rs.checksum_ok { "IIR" } else { "IIQ" };
            format!("{} [{}] C={:04x}", header(frame, prefix, options), hex_bytes(&rs.data), rs.checksum)
        }
        LinkControlBody::Ip(IpFrame::Unrecovered) => header(frame, "IIU", options),
        LinkControlBody::Data(da) => {
            format!(
                "{} ctr:{} len:{} crc:{}",
                header(frame, "IDA", options),
                da.da_ctr,
                da.da_len,
                if da.crc_ok { "OK" } else { "no" }
            )
        }
        LinkControlBody::Sync(sy) => {
            let tail = if sy.sync_ok { "Sync=OK".to_string() } else { format!("Sync=no, errs={}", sy.errors) };
            format!("{} {}", header(frame, "ISY", options), tail)
        }
        LinkControlBody::U3(U3Body::Rs(rs)) => {
            let prefix = if rs.six_bit { "I36" } else { "I38" };
            let ok = if rs.perfect { "OK" } else { "ok" };
            format!("{} RS={ok} [{}]", header(frame, prefix, options), hex_bytes(&rs.message))
        }
        LinkControlBody::U3(U3Body::Raw(raw)) => {
            format!("{} RS=no [{}]", header(frame, "IU3", options), hex_bytes(raw))
        }
        LinkControlBody::U6(raw) => format!("{} U6 [{}]", header(frame, "IRI", options), hex_bytes(raw)),
        LinkControlBody::Unrecognised { frame_type, raw } => {
            format!("{} U{} [{}]", header(frame, "IRI", options), frame_type, hex_bytes(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::parse_line;
    use crate::time::DecoderContext;

    #[test]
    fn error_frame_renders_err_prefix() {
        let line = "RWA: src 0 0 A:ok I:ok 1% 0.0 1 00";
        let burst = parse_line(line).unwrap();
        let mut ctx = DecoderContext::default();
        let options = DecoderOptions::default();
        let frame = crate::decoder::decode(&mut ctx, burst, &options);
        let rendered = pretty(&frame, &options);
        assert!(rendered.starts_with("ERR"));
    }
}
