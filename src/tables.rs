//! Immutable, process-wide frequency-grid constants: bin classification,
//! pilot definitions, and the short/long training sequences (`S0`/`S1`),
//! both in frequency and (lazily, once) in time domain.

use std::sync::OnceLock;

use num_complex::Complex32;

use crate::dft::{Dft64, RustFftDft64, FFT_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinClass {
    Null,
    Pilot,
    Data,
}

pub const DC_BIN: usize = 0;
pub const GUARD_BINS: [usize; 11] = [27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37];

/// Pilot bins in `(subcarrier, bin, polarity-pattern value)` order:
/// subcarriers `{-21,-7,+7,+21}` map to bins `{43,57,7,21}` with fixed
/// pattern `{+1,+1,+1,-1}`.
pub const PILOT_BINS: [(i32, usize, f32); 4] = [(-21, 43, 1.0), (-7, 57, 1.0), (7, 7, 1.0), (21, 21, -1.0)];

pub fn bin_class(bin: usize) -> BinClass {
    if bin == DC_BIN || GUARD_BINS.contains(&bin) {
        BinClass::Null
    } else if PILOT_BINS.iter().any(|&(_, b, _)| b == bin) {
        BinClass::Pilot
    } else {
        BinClass::Data
    }
}

/// The 48 data bins in mapping order: positive subcarriers `+1..=+26` (bins
/// `1..=26`), then negative subcarriers `-26..=-1` (bins `38..=63`), with
/// pilot bins skipped in both passes.
pub fn data_bin_order() -> &'static [usize; 48] {
    static ORDER: OnceLock<[usize; 48]> = OnceLock::new();
    ORDER.get_or_init(|| {
        let mut order = [0usize; 48];
        let mut idx = 0;
        for bin in 1..=26usize {
            if bin_class(bin) == BinClass::Data {
                order[idx] = bin;
                idx += 1;
            }
        }
        for bin in 38..=63usize {
            if bin_class(bin) == BinClass::Data {
                order[idx] = bin;
                idx += 1;
            }
        }
        debug_assert_eq!(idx, 48);
        order
    })
}

/// Converts a subcarrier-indexed array (`index 0` = subcarrier `-26`,
/// `index 52` = subcarrier `+26`) into the 64-bin frequency grid.
fn subcarriers_to_bins(values: &[Complex32; 53]) -> [Complex32; FFT_SIZE] {
    let mut bins = [Complex32::new(0.0, 0.0); FFT_SIZE];
    for (i, &v) in values.iter().enumerate() {
        let sc = i as i32 - 26;
        if sc == 0 {
            continue; // DC stays null
        }
        let bin = if sc > 0 { sc as usize } else { (64 + sc) as usize };
        bins[bin] = v;
    }
    bins
}

/// Short training sequence, frequency domain (802.11a Clause 17.3.3,
/// `S_{-26,26}`), non-null only on every fourth bin: bins
/// `{4,8,12,16,20,24,40,44,48,52,56,60}`.
pub fn s0_freq() -> [Complex32; FFT_SIZE] {
    let scale = (13.0f32 / 6.0).sqrt();
    let u = Complex32::new(scale, scale); // scale * (1 + j)
    let d = -u;
    let mut sc = [Complex32::new(0.0, 0.0); 53];
    // subcarrier -> value, index = subcarrier + 26
    for (subcarrier, value) in [
        (-24, u),
        (-20, d),
        (-16, u),
        (-12, d),
        (-8, d),
        (-4, u),
        (4, d),
        (8, d),
        (12, u),
        (16, u),
        (20, u),
        (24, u),
    ] {
        sc[(subcarrier + 26) as usize] = value;
    }
    subcarriers_to_bins(&sc)
}

/// Long training sequence, frequency domain (802.11a Clause 17.3.3,
/// `L_{-26,26}`): all 52 non-null, non-DC bins carry `+-1`.
pub fn s1_freq() -> [Complex32; FFT_SIZE] {
    const L: [i8; 53] = [
        1, 1, -1, -1, 1, 1, -1, 1, -1, 1, 1, 1, 1, 1, 1, -1, -1, 1, 1, -1, 1, -1, 1, 1, 1, 1, 0, 1, -1, -1, 1, 1, -1,
        1, -1, 1, -1, -1, -1, -1, -1, 1, 1, -1, -1, 1, -1, 1, -1, 1, 1, 1, 1,
    ];
    let mut sc = [Complex32::new(0.0, 0.0); 53];
    for (i, &v) in L.iter().enumerate() {
        sc[i] = Complex32::new(v as f32, 0.0);
    }
    subcarriers_to_bins(&sc)
}

/// The 12 non-null `S0` bins in ascending order, `{4,8,...,60}`, used by
/// `FrameSynchronizer`'s short-training gain/CFO estimation.
pub fn s0_active_bins() -> &'static [usize; 12] {
    static BINS: OnceLock<[usize; 12]> = OnceLock::new();
    BINS.get_or_init(|| {
        let freq = s0_freq();
        let mut bins = [0usize; 12];
        let mut idx = 0;
        for (b, v) in freq.iter().enumerate() {
            if v.norm() > 1e-6 {
                bins[idx] = b;
                idx += 1;
            }
        }
        debug_assert_eq!(idx, 12);
        bins
    })
}

/// The 52 non-null, non-DC `S1` bins in ascending order, used by
/// `FrameSynchronizer`'s long-training channel estimation.
pub fn s1_active_bins() -> &'static [usize; 52] {
    static BINS: OnceLock<[usize; 52]> = OnceLock::new();
    BINS.get_or_init(|| {
        let freq = s1_freq();
        let mut bins = [0usize; 52];
        let mut idx = 0;
        for (b, v) in freq.iter().enumerate() {
            if v.norm() > 1e-6 {
                bins[idx] = b;
                idx += 1;
            }
        }
        debug_assert_eq!(idx, 52);
        bins
    })
}

/// Time-domain image of `S0`: a 64-sample IDFT of [`s0_freq`], computed
/// once and shared. Its defining property is an exact 16-sample period.
pub fn s0_time() -> &'static [Complex32; FFT_SIZE] {
    static S0_TIME: OnceLock<[Complex32; FFT_SIZE]> = OnceLock::new();
    S0_TIME.get_or_init(|| {
        let mut buf = s0_freq();
        RustFftDft64::default().inverse(&mut buf);
        buf
    })
}

/// Time-domain image of `S1`: a 64-sample IDFT of [`s1_freq`].
pub fn s1_time() -> &'static [Complex32; FFT_SIZE] {
    static S1_TIME: OnceLock<[Complex32; FFT_SIZE]> = OnceLock::new();
    S1_TIME.get_or_init(|| {
        let mut buf = s1_freq();
        RustFftDft64::default().inverse(&mut buf);
        buf
    })
}
