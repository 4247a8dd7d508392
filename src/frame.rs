//! The decoded-frame data model: one [`Frame`] per burst, a tagged variant
//! (not a trait object) mirroring the way the teacher codebase models its
//! own message variants as a plain `enum` with struct-like variants.

use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downlink,
    Uplink,
}

/// Fields every classified frame carries regardless of variant.
#[derive(Debug, Clone)]
pub struct FrameCommon {
    pub direction: Direction,
    pub global_time: f64,
    pub source_name: String,
    pub offset_ms: f64,
    pub centre_frequency_hz: u64,
    pub confidence_pct: u8,
    pub signal_level: f64,
    pub symbol_count: usize,
    pub uw_errors_corrected: u32,
    pub fixed_errors: u32,
    pub lead_out_ok: bool,
    pub error_log: Vec<DecodeError>,
}

impl FrameCommon {
    pub fn is_error(&self) -> bool {
        !self.error_log.is_empty()
    }

    pub fn push_error(&mut self, err: DecodeError) {
        self.error_log.push(err);
    }
}

#[derive(Debug, Clone)]
pub struct PagingRecord {
    pub tmsi: u32,
    pub msc_id: u8,
    pub kind: PagingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingKind {
    Normal,
    None,
    Fill,
}

#[derive(Debug, Clone)]
pub struct RingAlert {
    pub sat_id: u8,
    pub beam_id: u8,
    pub pos_x: i32,
    pub pos_y: i32,
    pub pos_z: i32,
    pub interval: u8,
    pub timeslot: bool,
    pub eip: bool,
    pub bc_subband: u8,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub pages: Vec<PagingRecord>,
    pub page_sane: bool,
    pub ra_extra: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessagingAscii {
    pub msg_seq: u8,
    pub msg_unknown1: String,
    pub msg_ctr: Option<u32>,
    pub msg_ctr_max: Option<u32>,
    pub msg_checksum: u8,
    pub msg_ascii: String,
    pub msg_rest: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MessagingUnknown {
    pub msg_seq: u8,
    pub msg_unknown2: bool,
    pub msg_msgdata: String,
}

#[derive(Debug, Clone)]
pub enum MessagingBody {
    Ascii(MessagingAscii),
    Unknown(MessagingUnknown),
}

#[derive(Debug, Clone)]
pub struct Messaging {
    pub block: u8,
    pub frame: u8,
    pub bch_blocks: u8,
    pub secondary: bool,
    pub group: MessagingGroup,
    pub ctr1: u32,
    pub tdiff_ms: u32,
    pub msg_pre: Option<String>,
    pub msg_ric: Option<u32>,
    pub msg_format: Option<u8>,
    pub body: Option<MessagingBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagingGroup {
    A,
    Numbered(u8),
}

#[derive(Debug, Clone)]
pub struct BroadcastSubblock {
    pub raw: String,
    pub kind: BroadcastSubblockKind,
}

#[derive(Debug, Clone)]
pub enum BroadcastSubblockKind {
    MaxUplinkPower { max_uplink_pwr: u8 },
    IriTime { iri_time_raw: u32, iri_time_unix: f64 },
    TmsiExpiry { tmsi_expiry_raw: u64, tmsi_expiry_unix: f64 },
    FixedPattern,
    ChannelAssignment { random_id: u8, timeslot: u8, uplink_subband: u8, downlink_subband: u8, access: u8, dtoa: u8, dfoa: u8 },
    Unrecognised,
}

#[derive(Debug, Clone)]
pub struct Broadcast {
    pub bc_type: u8,
    pub header_bch_errors: i32,
    pub subblocks: Vec<BroadcastSubblock>,
    pub length_tag: LengthTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthTag {
    Exact,
    Short,
    Long,
}

#[derive(Debug, Clone)]
pub struct VoiceCrcFail {
    pub raw_payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct VoiceRs {
    pub message: Vec<u8>,
    pub checksum: Vec<u8>,
    pub six_bit: bool,
    pub perfect: bool,
}

#[derive(Debug, Clone)]
pub enum VoiceBody {
    Rs(VoiceRs),
    CrcFail(VoiceCrcFail),
}

#[derive(Debug, Clone)]
pub struct IpHeader {
    pub ip_hdr: u8,
    pub ip_seq: u8,
    pub ip_ack: u8,
    pub ip_cs: u8,
    pub ip_len: u8,
    pub ip_data: Vec<u8>,
    pub ip_cksum: u32,
    pub crc_value: u32,
    pub header_checksum_ok: bool,
    pub len_truncated_warning: bool,
    pub via_vda: bool,
}

#[derive(Debug, Clone)]
pub struct IpRs {
    pub data: Vec<u8>,
    pub checksum: u16,
    pub odd_byte: u8,
    pub checksum_ok: bool,
}

#[derive(Debug, Clone)]
pub enum IpFrame {
    Direct(IpHeader),
    Rs(IpRs),
    Unrecovered,
}

#[derive(Debug, Clone)]
pub struct DataSbd {
    pub flags1: u8,
    pub cont: bool,
    pub da_ctr: u8,
    pub flags2: u8,
    pub da_len: u8,
    pub flags3: bool,
    pub da_ta: Vec<u8>,
    pub data: Vec<u8>,
    pub da_crc16: u16,
    pub crc_ok: bool,
}

#[derive(Debug, Clone)]
pub struct Sync {
    pub sync_bytes: Vec<u8>,
    pub errors: u32,
    pub sync_ok: bool,
}

#[derive(Debug, Clone)]
pub struct LinkControlWord {
    pub lcw1: u8,
    pub lcw2: u16,
    pub lcw3: u32,
    pub frame_type: u8,
    pub lcw_ft: u8,
    pub lcw_code: u16,
    pub lcw2_errors: i32,
}

#[derive(Debug, Clone)]
pub struct TimingLocation {
    pub field_a: String,
    pub field_b: String,
    pub field_c: String,
}

/// The tagged variant dispatched from `classify`/`decode`.
#[derive(Debug, Clone)]
pub enum FrameVariant {
    Messaging(Messaging),
    RingAlert(RingAlert),
    Broadcast(Broadcast),
    LinkControl(LinkControlWord, LinkControlBody),
    TimingLocation(TimingLocation),
    Unknown,
}

#[derive(Debug, Clone)]
pub struct U3Rs {
    pub message: Vec<u8>,
    pub checksum: Vec<u8>,
    pub six_bit: bool,
    pub perfect: bool,
}

#[derive(Debug, Clone)]
pub enum U3Body {
    Rs(U3Rs),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone)]
pub enum LinkControlBody {
    Voice(VoiceBody),
    Ip(IpFrame),
    Data(DataSbd),
    Sync(Sync),
    U3(U3Body),
    U6(Vec<u8>),
    Unrecognised { frame_type: u8, raw: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub common: FrameCommon,
    pub variant: FrameVariant,
}
