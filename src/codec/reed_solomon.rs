//! Reed-Solomon error correction over GF(2^8) and GF(2^6).
//!
//! Iridium's VO/IP/DA payloads fall back to Reed-Solomon when the cheaper
//! CRC-24/BCH checks fail. The decoder below follows the standard
//! syndrome / Berlekamp-Massey / Chien-search / Forney pipeline described in
//! "Reed-Solomon codes for coders"; polynomials are `Vec<u16>` with the
//! highest-degree coefficient first.

use super::galois::GaloisField;
use once_cell::sync::Lazy;

pub static GF256: Lazy<GaloisField> = Lazy::new(|| GaloisField::new(8, 0x11D));
pub static GF64: Lazy<GaloisField> = Lazy::new(|| GaloisField::new(6, 0x43));

fn poly_eval(gf: &GaloisField, poly: &[u16], x: u16) -> u16 {
    let mut y = poly[0];
    for &c in &poly[1..] {
        y = gf.mul(y, x) ^ c;
    }
    y
}

fn poly_mul(gf: &GaloisField, a: &[u16], b: &[u16]) -> Vec<u16> {
    let mut out = vec![0u16; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] ^= gf.mul(ai, bj);
        }
    }
    out
}

fn poly_scale(gf: &GaloisField, p: &[u16], s: u16) -> Vec<u16> {
    p.iter().map(|&c| gf.mul(c, s)).collect()
}

fn poly_add(a: &[u16], b: &[u16]) -> Vec<u16> {
    let len = a.len().max(b.len());
    let mut out = vec![0u16; len];
    for (i, &c) in a.iter().rev().enumerate() {
        out[len - 1 - i] ^= c;
    }
    for (i, &c) in b.iter().rev().enumerate() {
        out[len - 1 - i] ^= c;
    }
    out
}

/// Polynomial long division, returning `(quotient, remainder)`.
fn poly_divmod(gf: &GaloisField, dividend: &[u16], divisor: &[u16]) -> (Vec<u16>, Vec<u16>) {
    let mut msg_out = dividend.to_vec();
    let sep = divisor.len() - 1;
    for i in 0..dividend.len().saturating_sub(sep) {
        let coef = msg_out[i];
        if coef != 0 {
            for j in 1..divisor.len() {
                if divisor[j] != 0 {
                    msg_out[i + j] ^= gf.mul(divisor[j], coef);
                }
            }
        }
    }
    let separator = dividend.len().saturating_sub(sep);
    let quotient = msg_out[..separator].to_vec();
    let remainder = msg_out[separator..].to_vec();
    (quotient, remainder)
}

fn calc_syndromes(gf: &GaloisField, msg: &[u16], nsym: usize) -> Vec<u16> {
    (0..nsym).map(|i| poly_eval(gf, msg, gf.pow(2, i as i32))).collect()
}

fn syndromes_all_zero(synd: &[u16]) -> bool {
    synd.iter().all(|&s| s == 0)
}

/// Berlekamp-Massey: derive the error locator polynomial from the syndromes.
/// The result is ordered highest-degree first with a leading `1`.
fn find_error_locator(gf: &GaloisField, synd: &[u16], nsym: usize) -> Option<Vec<u16>> {
    let mut err_loc = vec![1u16];
    let mut old_loc = vec![1u16];
    for i in 0..nsym {
        old_loc.push(0);
        let mut delta = synd[i];
        for j in 1..err_loc.len() {
            delta ^= gf.mul(err_loc[err_loc.len() - 1 - j], synd[i - j]);
        }
        if delta != 0 {
            if old_loc.len() > err_loc.len() {
                let new_loc = poly_scale(gf, &old_loc, delta);
                old_loc = poly_scale(gf, &err_loc, gf.inv(delta));
                err_loc = new_loc;
            }
            err_loc = poly_add(&err_loc, &poly_scale(gf, &old_loc, delta));
        }
    }
    while err_loc.first() == Some(&0) && err_loc.len() > 1 {
        err_loc.remove(0);
    }
    let errs = err_loc.len() - 1;
    if errs * 2 > nsym {
        return None;
    }
    Some(err_loc)
}

/// Chien search over the *reversed* error locator: find the positions (as
/// offsets from the end of the message, matching `err_pos`) where the
/// locator vanishes.
fn find_errors(gf: &GaloisField, err_loc_rev: &[u16], nmess: usize) -> Option<Vec<usize>> {
    let errs = err_loc_rev.len() - 1;
    let mut err_pos = Vec::new();
    for i in 0..nmess {
        if poly_eval(gf, err_loc_rev, gf.pow(2, i as i32)) == 0 {
            err_pos.push(nmess - 1 - i);
        }
    }
    if err_pos.len() != errs {
        return None;
    }
    Some(err_pos)
}

fn find_errata_locator(gf: &GaloisField, coef_pos: &[usize]) -> Vec<u16> {
    let mut e_loc = vec![1u16];
    for &i in coef_pos {
        let term = vec![gf.pow(2, i as i32), 0];
        e_loc = poly_mul(gf, &e_loc, &poly_add(&[1], &term));
    }
    e_loc
}

fn find_error_evaluator(gf: &GaloisField, synd_rev: &[u16], err_loc: &[u16], nsym: usize) -> Vec<u16> {
    let product = poly_mul(gf, synd_rev, err_loc);
    let mut divisor = vec![0u16; nsym + 2];
    divisor[0] = 1;
    let (_, remainder) = poly_divmod(gf, &product, &divisor);
    remainder
}

fn correct_errata(gf: &GaloisField, msg: &[u16], synd: &[u16], err_pos: &[usize]) -> Vec<u16> {
    let n = msg.len();
    let field_charac = gf.size - 1;
    let coef_pos: Vec<usize> = err_pos.iter().map(|&p| n - 1 - p).collect();
    let err_loc = find_errata_locator(gf, &coef_pos);
    let synd_rev: Vec<u16> = synd.iter().rev().cloned().collect();
    let mut err_eval = find_error_evaluator(gf, &synd_rev, &err_loc, err_loc.len() - 1);
    err_eval.reverse();

    let x: Vec<u16> = coef_pos
        .iter()
        .map(|&cp| gf.pow(2, (field_charac as i32) - cp as i32))
        .collect();

    let mut e = vec![0u16; n];
    for (i, &xi) in x.iter().enumerate() {
        let xi_inv = gf.inv(xi);
        let mut err_loc_prime = 1u16;
        for (j, &xj) in x.iter().enumerate() {
            if j != i {
                err_loc_prime = gf.mul(err_loc_prime, gf.add(1, gf.mul(xi_inv, xj)));
            }
        }
        let mut err_eval_rev = err_eval.clone();
        err_eval_rev.reverse();
        let y = poly_eval(gf, &err_eval_rev, xi_inv);
        let y = gf.mul(xi, y);
        let magnitude = gf.div(y, err_loc_prime);
        e[err_pos[i]] = magnitude;
    }
    poly_add(msg, &e)
}

/// Attempt to correct `symbols` (message followed by `nsym` checksum
/// symbols). Returns `(ok, message, checksum)`: `ok` is `true` when the
/// (possibly corrected) codeword now validates.
pub fn rs_fix(gf: &GaloisField, symbols: &[u16], nsym: usize) -> (bool, Vec<u16>, Vec<u16>) {
    let n = symbols.len();
    let synd = calc_syndromes(gf, symbols, nsym);
    if syndromes_all_zero(&synd) {
        let (msg, cks) = symbols.split_at(n - nsym);
        return (true, msg.to_vec(), cks.to_vec());
    }

    let err_loc = match find_error_locator(gf, &synd, nsym) {
        Some(loc) => loc,
        None => {
            let (msg, cks) = symbols.split_at(n - nsym);
            return (false, msg.to_vec(), cks.to_vec());
        }
    };
    let err_loc_rev: Vec<u16> = err_loc.iter().rev().cloned().collect();

    let err_pos = match find_errors(gf, &err_loc_rev, n) {
        Some(p) => p,
        None => {
            let (msg, cks) = symbols.split_at(n - nsym);
            return (false, msg.to_vec(), cks.to_vec());
        }
    };

    let corrected = correct_errata(gf, symbols, &synd, &err_pos);
    let check = calc_syndromes(gf, &corrected, nsym);
    let ok = syndromes_all_zero(&check);
    let (msg, cks) = corrected.split_at(n - nsym);
    (ok, msg.to_vec(), cks.to_vec())
}

/// Reed-Solomon fix over GF(2^8), as used for VO/IP 8-bit symbol payloads.
pub fn rs_fix_8(symbols: &[u16], nsym: usize) -> (bool, Vec<u16>, Vec<u16>) {
    rs_fix(&GF256, symbols, nsym)
}

/// Reed-Solomon fix over GF(2^6), as used for the VO 6-bit symbol grouping.
pub fn rs_fix_6(symbols: &[u16], nsym: usize) -> (bool, Vec<u16>, Vec<u16>) {
    rs_fix(&GF64, symbols, nsym)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(gf: &GaloisField, msg: &[u16], nsym: usize) -> Vec<u16> {
        let mut generator = vec![1u16];
        for i in 0..nsym {
            generator = poly_mul(gf, &generator, &[1, gf.pow(2, i as i32)]);
        }
        let mut padded = msg.to_vec();
        padded.extend(std::iter::repeat(0).take(nsym));
        let mut remainder = padded.clone();
        for i in 0..msg.len() {
            let coef = remainder[i];
            if coef != 0 {
                for (j, &g) in generator.iter().enumerate() {
                    remainder[i + j] ^= gf.mul(g, coef);
                }
            }
        }
        let mut out = msg.to_vec();
        out.extend_from_slice(&remainder[msg.len()..]);
        out
    }

    #[test]
    fn rs8_no_errors_validates() {
        let msg = vec![1u16, 2, 3, 4, 5];
        let codeword = encode(&GF256, &msg, 4);
        let (ok, m, _) = rs_fix_8(&codeword, 4);
        assert!(ok);
        assert_eq!(m, msg);
    }

    #[test]
    fn rs8_corrects_single_symbol_error() {
        let msg = vec![10u16, 20, 30, 40, 50];
        let mut codeword = encode(&GF256, &msg, 4);
        codeword[2] ^= 0x55;
        let (ok, m, _) = rs_fix_8(&codeword, 4);
        assert!(ok);
        assert_eq!(m, msg);
    }

    #[test]
    fn rs6_corrects_single_symbol_error() {
        let msg = vec![1u16, 2, 3];
        let mut codeword = encode(&GF64, &msg, 4);
        codeword[0] ^= 0x15;
        let (ok, m, _) = rs_fix_6(&codeword, 4);
        assert!(ok);
        assert_eq!(m, msg);
    }
}
