//! Drives `bitpipe` + `symbol_mapper` + the injected `Dft64`/`Modulator`
//! capabilities to emit a full PLCP + DATA sample stream.

use num_complex::Complex32;
use smart_default::SmartDefault;

use crate::bitpipe::encode as encode_data;
use crate::dft::{Dft64, RustFftDft64, FFT_SIZE};
use crate::error::PhyResult;
use crate::mls::PilotPolaritySequence;
use crate::modulator::{GrayQamModulator, Modulator};
use crate::rate::by_index;
use crate::signal::encode_symbol_bits;
use crate::symbol_mapper::map_symbol;
use crate::tables::{s0_time, s1_time};

/// Construction parameters for one generated frame: plain data,
/// `smart_default`-derived.
#[derive(Debug, Clone, Copy, SmartDefault)]
pub struct FrameGeneratorConfig {
    #[default(0)]
    pub rate: u8,
    #[default(0)]
    pub length: u16,
    /// No meaningful default exists; 0 is rejected at encode time with
    /// `PhyError::ZeroSeed`, forcing the caller to supply one.
    pub scrambler_seed: u8,
    #[default(1)]
    pub postfix_len: usize,
}

/// Raised-cosine ramp of length `p`, strictly increasing from just above 0
/// to just below 1.
fn raised_cosine_ramp(p: usize) -> Vec<f32> {
    (0..p)
        .map(|i| {
            let x = (i + 1) as f32 / (p + 1) as f32;
            0.5 * (1.0 - (std::f32::consts::PI * x).cos())
        })
        .collect()
}

/// Appends `symbol` (80 samples) to `out`, blending its first `window.len()`
/// samples against whatever is already at the tail of `out` via the
/// raised-cosine ramp. `out` must already hold at least `window.len()`
/// samples.
fn append_overlapped(out: &mut Vec<Complex32>, symbol: &[Complex32], window: &[f32]) {
    let p = window.len();
    let overlap_start = out.len() - p;
    for i in 0..p {
        let r = window[i];
        out[overlap_start + i] = r * symbol[i] + (1.0 - r) * out[overlap_start + i];
    }
    out.extend_from_slice(&symbol[p..]);
}

/// Builds the very first symbol of the stream (S0a), blending its own
/// ramp-up against the wrap of its own periodic tail: with no previous
/// symbol to ramp down from, the ramp-down side uses the S0 tail instead.
fn first_symbol_with_wrap(symbol: &[Complex32], wrap_tail: &[Complex32], window: &[f32]) -> Vec<Complex32> {
    let p = window.len();
    let mut out = symbol.to_vec();
    for i in 0..p {
        let r = window[i];
        out[i] = r * symbol[i] + (1.0 - r) * wrap_tail[i];
    }
    out
}

fn cp_symbol(mut bins: [Complex32; FFT_SIZE], dft: &dyn Dft64) -> Vec<Complex32> {
    dft.inverse(&mut bins);
    let mut out = Vec::with_capacity(80);
    out.extend_from_slice(&bins[48..64]);
    out.extend_from_slice(&bins);
    out
}

/// Tiles the 16-sample short-training pattern into one 80-sample symbol
/// (5 repetitions; S0a covers repetitions 1..5 of the short-training field).
fn short_training_symbol() -> Vec<Complex32> {
    let pattern = &s0_time()[0..16];
    let mut out = Vec::with_capacity(80);
    for _ in 0..5 {
        out.extend_from_slice(pattern);
    }
    out
}

/// Flat 160-sample long-training field (32-sample doubled guard + two
/// 64-sample copies), split into two 80-sample symbols S1a/S1b.
fn long_training_symbols() -> (Vec<Complex32>, Vec<Complex32>) {
    let body = s1_time();
    let mut flat = Vec::with_capacity(160);
    flat.extend_from_slice(&body[32..64]);
    flat.extend_from_slice(body);
    flat.extend_from_slice(body);
    let s1b = flat.split_off(80);
    (flat, s1b)
}

/// Generates the complete PLCP + DATA sample stream for one frame: 2 short-
/// training symbols, 2 long-training symbols, 1 SIGNAL symbol, and
/// `N_SYM` DATA symbols, windowed across every inter-symbol boundary.
pub struct FrameGenerator {
    config: FrameGeneratorConfig,
    dft: Box<dyn Dft64>,
    modulator: Box<dyn Modulator>,
}

impl FrameGenerator {
    pub fn new(config: FrameGeneratorConfig) -> Self {
        Self {
            config,
            dft: Box::new(RustFftDft64::default()),
            modulator: Box::new(GrayQamModulator),
        }
    }

    pub fn with_capabilities(config: FrameGeneratorConfig, dft: Box<dyn Dft64>, modulator: Box<dyn Modulator>) -> Self {
        Self { config, dft, modulator }
    }

    /// Encodes `payload` and renders the full sample stream. `payload.len()`
    /// must equal `config.length`.
    pub fn generate(&self, payload: &[u8]) -> PhyResult<Vec<Complex32>> {
        if payload.len() != self.config.length as usize {
            return Err(crate::error::PhyError::BufferLength {
                expected: self.config.length as usize,
                actual: payload.len(),
            });
        }
        let row = by_index(self.config.rate)?;
        let (_framing, coded) = encode_data(self.config.rate, row, self.config.scrambler_seed, payload)?;

        let window = raised_cosine_ramp(self.config.postfix_len);
        let mut pilots = PilotPolaritySequence::new();

        let s0a = short_training_symbol();
        let wrap_tail = s0_time()[48..64].to_vec();
        let mut out = first_symbol_with_wrap(&s0a, &wrap_tail, &window);

        let s0b = short_training_symbol();
        append_overlapped(&mut out, &s0b, &window);

        let (s1a, s1b) = long_training_symbols();
        append_overlapped(&mut out, &s1a, &window);
        append_overlapped(&mut out, &s1b, &window);

        let signal_bits = encode_symbol_bits(self.config.rate, payload.len() as u16)?;
        let signal_bins = map_symbol(&signal_bits, crate::rate::Modulation::Bpsk, 1, self.modulator.as_ref(), &mut pilots);
        let signal_symbol = cp_symbol(signal_bins, self.dft.as_ref());
        append_overlapped(&mut out, &signal_symbol, &window);

        for symbol_bits in coded.chunks(row.n_cbps as usize) {
            let bins = map_symbol(symbol_bits, row.modulation, row.n_bpsc as usize, self.modulator.as_ref(), &mut pilots);
            let symbol = cp_symbol(bins, self.dft.as_ref());
            append_overlapped(&mut out, &symbol, &window);
        }

        Ok(out)
    }
}
