//! TL (timing/location sync) body decoding.
//!
//! Grounded on `IridiumSTLMessage` in `original_source/iridium-parser.py`:
//! the 96-bit header carries no further structure the original tooling
//! extracts, and the remaining 768 bits are three fixed 256-bit fields
//! dumped as hex, with no BCH or de-interleaving applied.

use crate::bits::{bits_to_string, BitSlice01};
use crate::error::{DecodeError, MessageTooShortSnafu};
use crate::frame::TimingLocation;
use snafu::ensure;

pub fn decode_timing_location(body: &BitSlice01) -> Result<TimingLocation, DecodeError> {
    ensure!(body.len() >= 256 * 3, MessageTooShortSnafu { have: body.len(), need: 256usize * 3 });
    Ok(TimingLocation {
        field_a: bits_to_string(&body[0..256]),
        field_b: bits_to_string(&body[256..512]),
        field_c: bits_to_string(&body[512..768]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse_bitstring;

    #[test]
    fn short_body_errors() {
        let body = parse_bitstring(&"0".repeat(10));
        assert!(decode_timing_location(&body).is_err());
    }

    #[test]
    fn splits_three_equal_fields() {
        let body = parse_bitstring(&"0".repeat(768));
        let tl = decode_timing_location(&body).unwrap();
        assert_eq!(tl.field_a.len(), 256);
        assert_eq!(tl.field_b.len(), 256);
        assert_eq!(tl.field_c.len(), 256);
    }
}
