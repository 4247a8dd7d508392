//! CRC and checksum validators used by the VO/IP and DA frame variants.
//!
//! Definitions follow the same `crc::Algorithm<W>` + `crc::Crc<W>` pattern
//! the teacher codebase uses for its own custom CRC-14 in `src/crc.rs`,
//! just with the two polynomials this protocol actually needs.
use crc::{Algorithm, Crc};

/// `crc24_iip`: poly `0x1BBA1B5`, init `0xFFFFFF ^ 0x0C91B6`, reflected,
/// xor-out `0x0C91B6`. A valid IP/VO frame hashes to zero.
const CRC24_IIP_ALGORITHM: Algorithm<u32> = Algorithm {
    width: 24,
    poly: 0x01BB_A1B5,
    init: 0x00FF_FFFF ^ 0x000C_91B6,
    refin: true,
    refout: true,
    xorout: 0x000C_91B6,
    check: 0,
    residue: 0,
};

static CRC24_IIP: Crc<u32> = Crc::<u32>::new(&CRC24_IIP_ALGORITHM);

/// Compute the IP/VO frame-check sequence over `bytes`. A valid frame's
/// last three bytes make this evaluate to zero.
pub fn crc24_iip(bytes: &[u8]) -> u32 {
    CRC24_IIP.checksum(bytes)
}

/// CRC-16/CCITT-FALSE: poly `0x1021`, init `0xFFFF`, not reflected, no
/// xor-out. Used by the DA (SBD) variant.
const CRC16_CCITT_FALSE_ALGORITHM: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x1021,
    init: 0xFFFF,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0x29B1,
    residue: 0x0000,
};

static CRC16_CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC16_CCITT_FALSE_ALGORITHM);

pub fn crc16_ccitt_false(bytes: &[u8]) -> u16 {
    CRC16_CCITT_FALSE.checksum(bytes)
}

/// The 15-word one's-complement checksum used by the legacy messaging
/// format: sum fifteen big-endian 16-bit words with end-around carry, then
/// complement. A valid `message ‖ checksum` pair sums to zero under this
/// rule.
pub fn checksum_16(words: &[u16; 15]) -> u16 {
    let mut sum: u32 = 0;
    for &w in words {
        sum += w as u32;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_ccitt_false_check_vector() {
        assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
    }

    #[test]
    fn crc24_iip_zero_input_not_necessarily_zero() {
        // Establishes the function runs and is deterministic; the actual
        // "valid frame" check is that a real frame's trailing bytes make
        // this zero, exercised by the IP decoder tests.
        let a = crc24_iip(&[0u8; 39]);
        let b = crc24_iip(&[0u8; 39]);
        assert_eq!(a, b);
    }

    #[test]
    fn checksum_16_all_zero_message_is_not_valid() {
        // An all-zero message paired with an all-zero checksum word does
        // not satisfy the checksum (the checksum word itself must be the
        // complement of the message sum).
        let words = [0u16; 15];
        assert_ne!(checksum_16(&words), 0);
    }

    #[test]
    fn checksum_16_validates_correct_complement() {
        let mut words = [0u16; 15];
        words[0] = 5;
        words[1] = 10;
        let partial_sum: u32 = words[..14].iter().map(|&w| w as u32).sum();
        words[14] = !(partial_sum as u16);
        assert_eq!(checksum_16(&words), 0);
    }
}
