//! The Viterbi decoder capability. Per the design notes this is an
//! "injected capability": [`Viterbi`] is the contract, [`Viterbi64`] the
//! built-in fallback implementation a host can swap for a faster native
//! one. `BitPipe` is responsible only for framing the soft-bit buffer and
//! requesting a traceback length; it never implements the trellis itself.

use crate::conv::{parity_pair, N_STATES};

/// Soft-decision Viterbi decoder contract: constraint length 7, r1/2,
/// 8-bit soft metrics in `[0, 255]` with `127` meaning erasure.
pub trait Viterbi {
    /// Decodes `soft` (length must be even: `A0 B0 A1 B1 ...`) into
    /// `soft.len()/2` hard bits. `traceback_len` bounds how far back the
    /// decoder commits to a decision before the full sequence is consumed;
    /// implementations that do a full backtrace (like [`Viterbi64`]) may
    /// ignore it.
    fn decode(&self, soft: &[u8], traceback_len: usize) -> Vec<u8>;
}

/// Standard add-compare-select Viterbi decoder over the 64-state trellis
/// for generators `(0x6d, 0x4f)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Viterbi64;

impl Viterbi for Viterbi64 {
    fn decode(&self, soft: &[u8], _traceback_len: usize) -> Vec<u8> {
        assert!(soft.len() % 2 == 0, "soft-bit buffer must have even length");
        let n_steps = soft.len() / 2;
        if n_steps == 0 {
            return Vec::new();
        }

        const UNREACHABLE: u32 = u32::MAX;
        const NO_PRED: u8 = 0xff;
        let mut metric = [UNREACHABLE; N_STATES];
        metric[0] = 0;
        // history[step][state] = predecessor state that survived into
        // `state` at `step` (0xff if `state` was never reached).
        let mut history: Vec<[u8; N_STATES]> = Vec::with_capacity(n_steps);

        for step in 0..n_steps {
            let ra = soft[2 * step] as i32;
            let rb = soft[2 * step + 1] as i32;
            let mut next_metric = [UNREACHABLE; N_STATES];
            let mut next_hist = [NO_PRED; N_STATES];

            for state in 0..N_STATES {
                if metric[state] == UNREACHABLE {
                    continue;
                }
                for bit in 0..2u8 {
                    let (a, b, next_state) = parity_pair(state as u8, bit);
                    let exp_a = if a == 1 { 255 } else { 0 };
                    let exp_b = if b == 1 { 255 } else { 0 };
                    let bm = (ra - exp_a).unsigned_abs() + (rb - exp_b).unsigned_abs();
                    let cand = metric[state].saturating_add(bm);
                    if cand < next_metric[next_state as usize] {
                        next_metric[next_state as usize] = cand;
                        next_hist[next_state as usize] = state as u8;
                    }
                }
            }
            metric = next_metric;
            history.push(next_hist);
        }

        let mut state = metric
            .iter()
            .enumerate()
            .min_by_key(|&(_, &m)| m)
            .map(|(s, _)| s)
            .unwrap_or(0) as u8;

        // The info bit fed in at `step` is the low bit of the state that
        // step produced (`next_state = ((prev << 1) | bit) & 0x3f`).
        let mut bits = vec![0u8; n_steps];
        for step in (0..n_steps).rev() {
            bits[step] = state & 1;
            state = history[step][state as usize];
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::mother_encode;

    fn to_soft(bits: &[u8]) -> Vec<u8> {
        bits.iter().map(|&b| if b == 1 { 255 } else { 0 }).collect()
    }

    #[test]
    fn decodes_clean_codeword() {
        let msg = [1u8, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0];
        let coded = mother_encode(&msg);
        let soft = to_soft(&coded);
        let decoded = Viterbi64.decode(&soft, coded.len());
        assert_eq!(decoded, msg);
    }

    #[test]
    fn corrects_a_single_bit_error() {
        let msg = [0u8, 1, 1, 0, 1, 0, 0, 1, 1, 1, 0, 0, 0, 0];
        let coded = mother_encode(&msg);
        let mut soft = to_soft(&coded);
        soft[5] = 255 - soft[5]; // flip one bit hard
        let decoded = Viterbi64.decode(&soft, coded.len());
        assert_eq!(decoded, msg);
    }

    #[test]
    fn tolerates_erasures() {
        let msg = [1u8, 1, 0, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 0];
        let coded = mother_encode(&msg);
        let mut soft = to_soft(&coded);
        soft[3] = 127;
        soft[9] = 127;
        let decoded = Viterbi64.decode(&soft, coded.len());
        assert_eq!(decoded, msg);
    }
}
