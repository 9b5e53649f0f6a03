//! Constellation mapping: BPSK/QPSK/16-QAM/64-QAM bit<->point conversion.
//!
//! Kept as an external collaborator, distinct from `symbol_mapper`'s job
//! of placing points and pilots onto the 64-bin frequency grid.
//! [`Modulator`] is the injected capability; [`GrayQamModulator`] is the
//! built-in default.

use num_complex::Complex32;

use crate::rate::Modulation;

/// Bit<->constellation-point mapping for one [`Modulation`] order.
pub trait Modulator: Send + Sync {
    /// Maps `n_bpsc` bits (MSB-first) to one unit-average-power point.
    fn map(&self, modulation: Modulation, bits: &[u8]) -> Complex32;

    /// Demaps one received point into `n_bpsc` soft bits, `0..=255` with
    /// `127` as erasure.
    fn demap(&self, modulation: Modulation, point: Complex32) -> Vec<u8>;
}

fn n_bpsc(modulation: Modulation) -> usize {
    match modulation {
        Modulation::Bpsk => 1,
        Modulation::Qpsk => 2,
        Modulation::Qam16 => 4,
        Modulation::Qam64 => 6,
    }
}

/// Standard 802.11 Gray-coded PAM level for a bit group: binary-reflected
/// Gray decode, then symmetric integer levels `-(2^n-1) ..= (2^n-1)` in
/// steps of 2 (so `n=1` gives `{-1,1}`, `n=2` gives `{-3,-1,1,3}`, ...).
fn gray_to_pam_level(bits: &[u8]) -> i32 {
    let n = bits.len();
    let mut gray: u32 = 0;
    for &b in bits {
        gray = (gray << 1) | b as u32;
    }
    let mut m = gray;
    let mut shift = 1;
    while shift < n {
        m ^= m >> shift;
        shift <<= 1;
    }
    2 * m as i32 - ((1 << n) - 1)
}

/// Inverse of [`gray_to_pam_level`]'s decode half: standard binary to Gray.
fn level_to_gray_bits(level_index: u32, n: usize) -> Vec<u8> {
    let gray = level_index ^ (level_index >> 1);
    (0..n).rev().map(|i| ((gray >> i) & 1) as u8).collect()
}

/// Average-power normalization applied to the full complex point, so
/// every modulation order has unit average constellation power.
fn power_norm(modulation: Modulation) -> f32 {
    match modulation {
        Modulation::Bpsk => 1.0,
        Modulation::Qpsk => 1.0 / 2.0f32.sqrt(),
        Modulation::Qam16 => 1.0 / 10.0f32.sqrt(),
        Modulation::Qam64 => 1.0 / 42.0f32.sqrt(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GrayQamModulator;

impl Modulator for GrayQamModulator {
    fn map(&self, modulation: Modulation, bits: &[u8]) -> Complex32 {
        let norm = power_norm(modulation);
        match modulation {
            Modulation::Bpsk => {
                let level = gray_to_pam_level(&bits[0..1]) as f32;
                Complex32::new(level * norm, 0.0)
            }
            Modulation::Qpsk => {
                let i = gray_to_pam_level(&bits[0..1]) as f32;
                let q = gray_to_pam_level(&bits[1..2]) as f32;
                Complex32::new(i * norm, q * norm)
            }
            Modulation::Qam16 => {
                let i = gray_to_pam_level(&bits[0..2]) as f32;
                let q = gray_to_pam_level(&bits[2..4]) as f32;
                Complex32::new(i * norm, q * norm)
            }
            Modulation::Qam64 => {
                let i = gray_to_pam_level(&bits[0..3]) as f32;
                let q = gray_to_pam_level(&bits[3..6]) as f32;
                Complex32::new(i * norm, q * norm)
            }
        }
    }

    fn demap(&self, modulation: Modulation, point: Complex32) -> Vec<u8> {
        let norm = power_norm(modulation);
        match modulation {
            Modulation::Bpsk => pam_axis_softs(point.re / norm, 1),
            Modulation::Qpsk => {
                let mut out = pam_axis_softs(point.re / norm, 1);
                out.extend(pam_axis_softs(point.im / norm, 1));
                out
            }
            Modulation::Qam16 => {
                let mut out = pam_axis_softs(point.re / norm, 2);
                out.extend(pam_axis_softs(point.im / norm, 2));
                out
            }
            Modulation::Qam64 => {
                let mut out = pam_axis_softs(point.re / norm, 3);
                out.extend(pam_axis_softs(point.im / norm, 3));
                out
            }
        }
    }
}

/// Soft-demaps one PAM axis value (already de-normalized to the integer
/// level domain) into `n` soft bits. Hard-decides the nearest level, then
/// derives a confidence from the distance to the nearest decision
/// boundary (the even integers between levels), an approximation of a
/// per-bit LLR, not an exact one, but monotonic in the right direction and
/// shared by every bit of the group.
fn pam_axis_softs(v: f32, n: usize) -> Vec<u8> {
    let max_level = (1i32 << n) - 1;
    let m = (((v + max_level as f32) / 2.0).round() as i32).clamp(0, max_level);
    let hard_bits = level_to_gray_bits(m as u32, n);

    let level = 2 * m - max_level;
    let nearest_boundary = if v >= level as f32 {
        level as f32 + 1.0
    } else {
        level as f32 - 1.0
    };
    let dist = (v - nearest_boundary).abs().min(1.0);
    let confidence = (dist * 127.0).round() as i32;

    hard_bits
        .into_iter()
        .map(|b| {
            if b == 1 {
                (128 + confidence).clamp(0, 255) as u8
            } else {
                (127 - confidence).clamp(0, 255) as u8
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard_bits(modulation: Modulation, soft: &[u8]) -> Vec<u8> {
        soft.iter().map(|&s| if s >= 128 { 1 } else { 0 }).take(n_bpsc(modulation)).collect()
    }

    #[test]
    fn map_demap_roundtrip_for_every_order() {
        let m = GrayQamModulator;
        for modulation in [
            Modulation::Bpsk,
            Modulation::Qpsk,
            Modulation::Qam16,
            Modulation::Qam64,
        ] {
            let n = n_bpsc(modulation);
            for combo in 0u32..(1 << n) {
                let bits: Vec<u8> = (0..n).rev().map(|i| ((combo >> i) & 1) as u8).collect();
                let point = m.map(modulation, &bits);
                let soft = m.demap(modulation, point);
                assert_eq!(hard_bits(modulation, &soft), bits, "{modulation:?} combo {combo}");
            }
        }
    }

    #[test]
    fn unit_average_power() {
        let m = GrayQamModulator;
        for modulation in [Modulation::Bpsk, Modulation::Qpsk, Modulation::Qam16, Modulation::Qam64] {
            let n = n_bpsc(modulation);
            let mut total = 0.0f32;
            let count = 1u32 << n;
            for combo in 0..count {
                let bits: Vec<u8> = (0..n).rev().map(|i| ((combo >> i) & 1) as u8).collect();
                total += m.map(modulation, &bits).norm_sqr();
            }
            let avg = total / count as f32;
            assert!((avg - 1.0).abs() < 1e-3, "{modulation:?} avg power {avg}");
        }
    }
}
