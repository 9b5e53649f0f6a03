//! The two-step block interleaver (802.11a/g §17.3.5.7), precomputed once
//! per rate into a permutation table.

use std::sync::OnceLock;

use crate::rate::RATE_TABLE;

/// `k -> j` permutation for one rate's `N_CBPS`. Interleave writes input
/// bit `k` to output position `table[k]`; deinterleave is its inverse.
#[derive(Debug, Clone)]
pub struct InterleaverTable {
    pub n_cbps: usize,
    /// `forward[k]` is the output position for input bit `k`.
    forward: Vec<u16>,
    /// `inverse[j]` is the input position for output bit `j`.
    inverse: Vec<u16>,
}

fn s_for(n_bpsc: u8) -> usize {
    std::cmp::max(n_bpsc as usize / 2, 1)
}

fn forward_index(k: usize, n_cbps: usize, n_bpsc: u8) -> usize {
    let i = (n_cbps / 16) * (k % 16) + k / 16;
    let s = s_for(n_bpsc);
    s * (i / s) + (i + n_cbps - (16 * i) / n_cbps) % s
}

impl InterleaverTable {
    fn build(n_cbps: usize, n_bpsc: u8) -> Self {
        let mut forward = vec![0u16; n_cbps];
        let mut inverse = vec![0u16; n_cbps];
        for k in 0..n_cbps {
            let j = forward_index(k, n_cbps, n_bpsc);
            forward[k] = j as u16;
            inverse[j] = k as u16;
        }
        InterleaverTable {
            n_cbps,
            forward,
            inverse,
        }
    }

    /// Interleaves exactly `n_cbps` bits of one OFDM symbol.
    pub fn interleave(&self, bits: &[u8]) -> Vec<u8> {
        assert_eq!(bits.len(), self.n_cbps);
        let mut out = vec![0u8; self.n_cbps];
        for (k, &b) in bits.iter().enumerate() {
            out[self.forward[k] as usize] = b;
        }
        out
    }

    /// Inverse of [`Self::interleave`].
    pub fn deinterleave(&self, bits: &[u8]) -> Vec<u8> {
        assert_eq!(bits.len(), self.n_cbps);
        let mut out = vec![0u8; self.n_cbps];
        for (j, &b) in bits.iter().enumerate() {
            out[self.inverse[j] as usize] = b;
        }
        out
    }
}

/// One cached table per rate index, built lazily on first use and shared
/// read-only thereafter.
static TABLES: [OnceLock<InterleaverTable>; 8] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

/// Returns the shared interleaver table for rate index `rate` (0..=7).
pub fn table_for_rate(rate: u8) -> &'static InterleaverTable {
    let row = &RATE_TABLE[rate as usize];
    TABLES[rate as usize]
        .get_or_init(|| InterleaverTable::build(row.n_cbps as usize, row.n_bpsc))
}

/// The interleaver table for the fixed SIGNAL-field parameters
/// (`N_CBPS=48, N_BPSC=1`), used by `signal::encode`/`decode`.
static SIGNAL_TABLE: OnceLock<InterleaverTable> = OnceLock::new();

pub fn signal_table() -> &'static InterleaverTable {
    SIGNAL_TABLE.get_or_init(|| InterleaverTable::build(48, 1))
}
