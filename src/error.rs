use snafu::Snafu;

/// Everything that can go wrong while classifying or decoding a single burst.
///
/// Every stage of the pipeline stops at the first error it hits and leaves
/// whatever fields it had already recovered in place; a [`DecodeError`] never
/// unwinds across burst boundaries (see the error handling design in
/// `SPEC_FULL.md`).
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    #[snafu(display("input line did not match the burst grammar: {reason}"))]
    ParseError { reason: String },

    #[snafu(display("access code not found in payload"))]
    AccessCodeMissing,

    #[snafu(display("access code symbol distance {distance} >= 4"))]
    AccessCodeDistance { distance: u32 },

    #[snafu(display("payload shorter than minimum for this variant ({have} < {need} bits)"))]
    MessageTooShort { have: usize, need: usize },

    #[snafu(display("not enough data remaining to decode field"))]
    NotEnoughData,

    #[snafu(display("burst did not match any known frame type"))]
    UnknownType,

    #[snafu(display("frame type {type_name} excluded by filter"))]
    FilteredType { type_name: String },

    #[snafu(display("header BCH syndrome nonzero"))]
    HeaderBchFailure,

    #[snafu(display("block BCH syndrome nonzero, errors={errors}"))]
    BlockBchFailure { errors: i32 },

    #[snafu(display("even parity check failed on repaired block"))]
    ParityError,

    #[snafu(display("checksum did not validate"))]
    ChecksumFail,

    #[snafu(display("CRC did not validate"))]
    CrcFail,

    #[snafu(display("expected trailer pattern not found"))]
    TrailerMismatch,

    #[snafu(display("field expected to be all-zero was not"))]
    ZeroFieldViolation,

    #[snafu(display("unsupported message format {format}"))]
    UnsupportedFormat { format: u8 },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
