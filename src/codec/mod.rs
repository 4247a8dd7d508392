//! Block-code and checksum primitives shared by the frame decoders.
//!
//! Mirrors the way the teacher crate groups its own forward-error-correction
//! math under `src/ldpc/`: one self-contained submodule per algorithm, with
//! only the functions decoders actually call re-exported here.

mod bch;
mod checksum;
mod galois;
mod reed_solomon;

pub use bch::{bch_divide, bch_repair, poly_bit_len, BchRepair};
pub use checksum::{checksum_16, crc16_ccitt_false, crc24_iip};
pub use reed_solomon::{rs_fix_6, rs_fix_8};

/// BCH generator polynomials named in the burst formats, kept together so
/// call sites read as `codec::poly::HEADER` rather than a bare magic number.
pub mod poly {
    pub const HEADER: u32 = 29;
    pub const LCW1: u32 = 41;
    pub const LCW2: u32 = 465;
    pub const RA_BC: u32 = 1207;
    pub const MESSAGING: u32 = 1897;
    pub const LCW_DATA: u32 = 3545;
}
