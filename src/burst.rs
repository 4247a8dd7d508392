//! Input line parsing: turns one `RAW:`/`RWA:` line into a [`Burst`].
//!
//! No `regex` dependency appears anywhere in this pack; fixed-shape line
//! grammars are parsed by hand with ordinary `str` splitting, the same way
//! the teacher's own line/field parsers work. This module follows suit.

use crate::bits::{parse_bitstring, Bits};
use crate::error::{DecodeError, ParseErrorSnafu};
use snafu::ensure;

/// One decoded input line, before access-code stripping or classification.
#[derive(Debug, Clone)]
pub struct Burst {
    pub swapped: bool,
    pub source_name: String,
    pub offset_ms: f64,
    pub centre_frequency_hz: u64,
    pub confidence_pct: u8,
    pub signal_level: f64,
    pub symbols: Bits,
    pub extra_trailer: Option<String>,
}

fn reverse_symbol_pairs(bits: &mut Bits) {
    let n = bits.len() / 2;
    for k in 0..n {
        let a = bits[2 * k];
        let b = bits[2 * k + 1];
        bits.set(2 * k, b);
        bits.set(2 * k + 1, a);
    }
}

/// Parse one line of the form:
/// `(RAW|RWA): <source> <offset_ms> <freq_hz> A:<hex> [IL]:<hex> <pct>% <level> <count> <bits>[ <trailer>]`
pub fn parse_line(line: &str) -> Result<Burst, DecodeError> {
    let mut tokens = line.split_whitespace();

    let tag = tokens.next().ok_or_else(|| ParseErrorSnafu { reason: "empty line".to_string() }.build())?;
    ensure!(
        tag == "RAW:" || tag == "RWA:",
        ParseErrorSnafu { reason: format!("unexpected leading tag {tag:?}") }
    );
    let swapped = tag == "RAW:";

    let source = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing source field".to_string() }.build())?;
    let source_name = if source == "/dev/stdin" { "-".to_string() } else { source.to_string() };

    let offset_ms: f64 = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing offset field".to_string() }.build())?
        .parse()
        .map_err(|_| ParseErrorSnafu { reason: "offset field not numeric".to_string() }.build())?;

    let centre_frequency_hz: u64 = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing frequency field".to_string() }.build())?
        .parse()
        .map_err(|_| ParseErrorSnafu { reason: "frequency field not numeric".to_string() }.build())?;

    let _access_ok = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing A: field".to_string() }.build())?;
    let _leadout_ok = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing I:/L: field".to_string() }.build())?;

    let confidence_tok = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing confidence field".to_string() }.build())?;
    let confidence_pct: u8 = confidence_tok
        .strip_suffix('%')
        .ok_or_else(|| ParseErrorSnafu { reason: "confidence field missing %".to_string() }.build())?
        .parse()
        .map_err(|_| ParseErrorSnafu { reason: "confidence field not numeric".to_string() }.build())?;

    let level_tok = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing level field".to_string() }.build())?;
    let signal_level: f64 = match level_tok {
        "inf" => f64::INFINITY,
        "nan" => f64::NAN,
        other => other
            .parse()
            .map_err(|_| ParseErrorSnafu { reason: "level field not numeric".to_string() }.build())?,
    };

    let _raw_length = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing symbol-count field".to_string() }.build())?;

    let bits_tok = tokens
        .next()
        .ok_or_else(|| ParseErrorSnafu { reason: "missing bitstring field".to_string() }.build())?;
    let cleaned: String = bits_tok.chars().filter(|c| *c == '0' || *c == '1').collect();
    ensure!(
        cleaned.len() == bits_tok.len(),
        ParseErrorSnafu { reason: "bitstring contained unexpected characters".to_string() }
    );
    ensure!(
        cleaned.len() % 2 == 0,
        ParseErrorSnafu { reason: "bitstring has odd length".to_string() }
    );
    let mut symbols = parse_bitstring(&cleaned);
    if swapped {
        reverse_symbol_pairs(&mut symbols);
    }

    let rest: Vec<&str> = tokens.collect();
    let extra_trailer = if rest.is_empty() { None } else { Some(rest.join(" ")) };

    Ok(Burst {
        swapped,
        source_name,
        offset_ms,
        centre_frequency_hz,
        confidence_pct,
        signal_level,
        symbols,
        extra_trailer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_raw_line() {
        let line = "RAW: i-100.0-v1 500 1626270000 A:ok I:ok 80% 12.5 8 0011001100001100";
        let burst = parse_line(line).unwrap();
        assert!(burst.swapped);
        assert_eq!(burst.source_name, "i-100.0-v1");
        assert_eq!(burst.offset_ms, 500.0);
        assert_eq!(burst.centre_frequency_hz, 1626270000);
        assert_eq!(burst.confidence_pct, 80);
        assert_eq!(burst.symbols.len(), 16);
    }

    #[test]
    fn rejects_odd_length_bitstring() {
        let line = "RWA: src 0 0 A:ok I:ok 1% 0.0 1 001";
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn rejects_unrecognised_tag() {
        let line = "XXX: src 0 0 A:ok I:ok 1% 0.0 1 00";
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn captures_trailer_text() {
        let line = "RWA: src 0 0 A:ok I:ok 1% 0.0 1 00 leftover junk";
        let burst = parse_line(line).unwrap();
        assert_eq!(burst.extra_trailer.as_deref(), Some("leftover junk"));
    }
}
