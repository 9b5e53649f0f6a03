//! Subcarrier mapping: places one OFDM symbol's data bits and pilots onto
//! the 64-bin frequency grid, and the inverse extraction on receive.

use num_complex::Complex32;

use crate::dft::FFT_SIZE;
use crate::mls::PilotPolaritySequence;
use crate::modulator::Modulator;
use crate::rate::Modulation;
use crate::tables::{data_bin_order, PILOT_BINS};

/// Maps `n_cbps` interleaved bits (one symbol's worth) into a 64-bin
/// frequency-domain buffer: 48 data subcarriers via `modulator`, 4 pilots
/// at the current polarity, DC and 11 guard bins left null.
pub fn map_symbol(
    bits: &[u8],
    modulation: Modulation,
    n_bpsc: usize,
    modulator: &dyn Modulator,
    pilots: &mut PilotPolaritySequence,
) -> [Complex32; FFT_SIZE] {
    assert_eq!(bits.len(), data_bin_order().len() * n_bpsc);

    let mut bins = [Complex32::new(0.0, 0.0); FFT_SIZE];
    for (point_idx, &bin) in data_bin_order().iter().enumerate() {
        let group = &bits[point_idx * n_bpsc..(point_idx + 1) * n_bpsc];
        bins[bin] = modulator.map(modulation, group);
    }

    let polarity = pilots.next_polarity();
    for &(_, bin, pattern) in PILOT_BINS.iter() {
        bins[bin] = Complex32::new(polarity * pattern, 0.0);
    }

    bins
}

/// Inverse of [`map_symbol`]: reads the 48 data bins (already channel- and
/// phase-corrected by the caller) and demaps each into `n_bpsc` soft bits.
/// Pilot and null bins are not inspected.
pub fn demap_symbol(
    bins: &[Complex32; FFT_SIZE],
    modulation: Modulation,
    n_bpsc: usize,
    modulator: &dyn Modulator,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(data_bin_order().len() * n_bpsc);
    for &bin in data_bin_order().iter() {
        out.extend(modulator.demap(modulation, bins[bin]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulator::GrayQamModulator;

    #[test]
    fn pilots_alternate_polarity_across_symbols() {
        let modulator = GrayQamModulator;
        let bits = vec![0u8; 48];
        let mut pilots = PilotPolaritySequence::new();
        let first = map_symbol(&bits, Modulation::Bpsk, 1, &modulator, &mut pilots);
        let second = map_symbol(&bits, Modulation::Bpsk, 1, &modulator, &mut pilots);
        let (_, bin0, _) = PILOT_BINS[0];
        assert_eq!(first[bin0], -second[bin0]);
    }

    #[test]
    fn dc_and_guard_bins_stay_null() {
        let modulator = GrayQamModulator;
        let bits = vec![1u8; 48 * 6];
        let mut pilots = PilotPolaritySequence::new();
        let bins = map_symbol(&bits, Modulation::Qam64, 6, &modulator, &mut pilots);
        assert_eq!(bins[0], Complex32::new(0.0, 0.0));
        for b in crate::tables::GUARD_BINS {
            assert_eq!(bins[b], Complex32::new(0.0, 0.0));
        }
    }

    #[test]
    fn map_then_demap_roundtrips_for_every_modulation() {
        let modulator = GrayQamModulator;
        for (modulation, n_bpsc) in [
            (Modulation::Bpsk, 1),
            (Modulation::Qpsk, 2),
            (Modulation::Qam16, 4),
            (Modulation::Qam64, 6),
        ] {
            let bits: Vec<u8> = (0..48 * n_bpsc).map(|i| (i % 2) as u8).collect();
            let mut pilots = PilotPolaritySequence::new();
            let bins = map_symbol(&bits, modulation, n_bpsc, &modulator, &mut pilots);
            let soft = demap_symbol(&bins, modulation, n_bpsc, &modulator);
            let hard: Vec<u8> = soft.iter().map(|&s| if s >= 128 { 1 } else { 0 }).collect();
            assert_eq!(hard, bits, "{modulation:?} roundtrip");
        }
    }
}
