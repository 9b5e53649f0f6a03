//! The r1/2 mother convolutional code (K=7, generators 0x6d/0x4f) and the
//! puncturing that raises it to r2/3 or r3/4.

use crate::rate::Coding;

/// Convolutional code constants: constraint length 7, native rate 1/2.
pub const CONSTRAINT_LENGTH: usize = 7;
pub const GENERATOR_A: u8 = 0x6d;
pub const GENERATOR_B: u8 = 0x4f;

/// Number of trellis states for K=7: `2^(K-1)`.
pub const N_STATES: usize = 64;

fn parity(x: u8) -> u8 {
    x.count_ones() as u8 & 1
}

/// Trellis transition: given a 6-bit state (the previous K-1 input bits)
/// and a new input bit, returns `(A, B, next_state)`, the two coded
/// output bits and the resulting 6-bit state. Shared by the encoder and
/// the Viterbi decoder so both sides of the trellis agree bit-for-bit.
pub fn parity_pair(state: u8, bit: u8) -> (u8, u8, u8) {
    let reg = ((state << 1) | (bit & 1)) & 0x7f;
    let a = parity(reg & GENERATOR_A);
    let b = parity(reg & GENERATOR_B);
    (a, b, reg & 0x3f)
}

/// Encodes `bits` (consumed MSB-first, i.e. in the order given) with the
/// r1/2 mother code. The shift register starts at zero for every call;
/// encoding one continuous DATA blob (SERVICE+payload+tail+pad) as a single
/// slice keeps the register state correct across symbol boundaries.
///
/// Output is `2 * bits.len()` bits: `A0 B0 A1 B1 ...`.
pub fn mother_encode(bits: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len() * 2);
    let mut state: u8 = 0;
    for &b in bits {
        let (a, bb, next_state) = parity_pair(state, b);
        out.push(a);
        out.push(bb);
        state = next_state;
    }
    out
}

/// A puncture matrix: `flags.len() == 2 * period`, row-major (row A then
/// row B), `true` keeps the bit at that position within the period.
#[derive(Debug, Clone)]
pub struct PunctureMatrix {
    pub period: usize,
    pub flags: Vec<bool>,
}

impl PunctureMatrix {
    fn tiled(base_a: &[bool], base_b: &[bool], repeats: usize) -> Self {
        let mut row_a = Vec::with_capacity(base_a.len() * repeats);
        let mut row_b = Vec::with_capacity(base_b.len() * repeats);
        for _ in 0..repeats {
            row_a.extend_from_slice(base_a);
            row_b.extend_from_slice(base_b);
        }
        let period = row_a.len();
        let mut flags = row_a;
        flags.extend(row_b);
        PunctureMatrix { period, flags }
    }

    fn kept_in_period(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// `true` if the raw (pre-puncture) bit at `pos` within a full 2*period
    /// cycle is retained.
    fn keep(&self, pos: usize) -> bool {
        self.flags[pos % (2 * self.period)]
    }
}

/// Returns the puncture matrix for `coding`, or `None` for `R1_2` (no
/// puncturing). Matrices are the standard 802.11a/g patterns, tiled to a
/// period of P=6 for R2_3 and P=9 for R3_4, an integer multiple of the
/// underlying base period (2 for R2_3, 3 for R3_4).
pub fn puncture_matrix(coding: Coding) -> Option<PunctureMatrix> {
    match coding {
        Coding::R1_2 => None,
        Coding::R2_3 => Some(PunctureMatrix::tiled(
            &[true, true],
            &[true, false],
            3,
        )),
        Coding::R3_4 => Some(PunctureMatrix::tiled(
            &[true, true, false],
            &[true, false, true],
            3,
        )),
    }
}

/// Discards bits at punctured positions. `raw` must be a whole number of
/// `2*matrix.period`-length cycles.
pub fn puncture(raw: &[u8], matrix: &PunctureMatrix) -> Vec<u8> {
    debug_assert_eq!(raw.len() % (2 * matrix.period), 0);
    raw.iter()
        .enumerate()
        .filter(|(i, _)| matrix.keep(*i))
        .map(|(_, &b)| b)
        .collect()
}

/// Inserts erasure soft values (127) at punctured positions, restoring a
/// soft-bit stream of length `original_len` (a multiple of
/// `2*matrix.period`) for Viterbi decoding.
pub fn depuncture(soft: &[u8], matrix: &PunctureMatrix, original_len: usize) -> Vec<u8> {
    debug_assert_eq!(original_len % (2 * matrix.period), 0);
    let mut out = Vec::with_capacity(original_len);
    let mut src = soft.iter();
    for i in 0..original_len {
        if matrix.keep(i) {
            out.push(*src.next().expect("depuncture: soft buffer too short"));
        } else {
            out.push(127);
        }
    }
    out
}

/// Number of coded bits produced per `matrix.period` information bits,
/// i.e. `kept` of the raw `2*period`.
pub fn kept_per_cycle(matrix: &PunctureMatrix) -> usize {
    matrix.kept_in_period()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::RATE_TABLE;

    #[test]
    fn r2_3_matches_rate_table_ratio() {
        let m = puncture_matrix(Coding::R2_3).unwrap();
        // 2*period raw bits correspond to `period` info bits; kept/period
        // must equal n_cbps/n_dbps for every R2_3 row.
        let row = RATE_TABLE.iter().find(|r| r.coding == Coding::R2_3).unwrap();
        let kept = kept_per_cycle(&m);
        assert_eq!(kept as u32 * row.n_dbps as u32, m.period as u32 * row.n_cbps as u32);
    }

    #[test]
    fn r3_4_matches_rate_table_ratio() {
        let m = puncture_matrix(Coding::R3_4).unwrap();
        let row = RATE_TABLE.iter().find(|r| r.coding == Coding::R3_4).unwrap();
        let kept = kept_per_cycle(&m);
        assert_eq!(kept as u32 * row.n_dbps as u32, m.period as u32 * row.n_cbps as u32);
    }

    #[test]
    fn puncture_depuncture_restores_kept_and_erases_rest() {
        let matrix = puncture_matrix(Coding::R3_4).unwrap();
        let cycle = 2 * matrix.period;
        let raw: Vec<u8> = (0..cycle as u8).map(|i| i % 2).collect();
        let kept = puncture(&raw, &matrix);
        let restored = depuncture(&kept, &matrix, cycle);
        for i in 0..cycle {
            if matrix.keep(i) {
                assert_eq!(restored[i], raw[i]);
            } else {
                assert_eq!(restored[i], 127);
            }
        }
    }

    #[test]
    fn mother_code_doubles_length() {
        let bits = [1u8, 0, 1, 1, 0, 0, 1];
        let out = mother_encode(&bits);
        assert_eq!(out.len(), bits.len() * 2);
    }
}
