//! The receive-side state machine: PLCP detection through DATA decode.
//! Expressed as a tagged enum dispatched by `match`, never as dynamic
//! dispatch, so each variant carries exactly the accumulators that state
//! needs.
//!
//! Acquisition anchors on the long-training field rather than chaining
//! fixed-size block consumption after the coarse PLCP gate: the coarse
//! gate alone needs a full 80-sample correlation window to confirm
//! periodicity, which already consumes most of the 160-sample
//! short-training field, leaving no room to walk through short-training
//! refinement, a guard skip, and two long-training bodies as separate
//! fixed-length stages. Instead, once the coarse gate fires, incoming
//! samples are buffered and matched-filtered against the known
//! long-training waveform to locate its offset; every later symbol
//! boundary (SIGNAL, then each DATA symbol) follows by fixed arithmetic
//! from that one anchor.

use std::collections::VecDeque;

use num_complex::Complex32;
use smart_default::SmartDefault;
use tracing::{debug, info, trace, warn};

use crate::bitpipe::{decode as decode_data, derive_framing, DataFraming};
use crate::dft::{Dft64, RustFftDft64, FFT_SIZE};
use crate::interleaver::table_for_rate;
use crate::mls::PilotPolaritySequence;
use crate::modulator::{GrayQamModulator, Modulator};
use crate::nco::{DdsNco, Nco};
use crate::rate::{by_index, Modulation, RateDescriptor};
use crate::signal::{decode_symbol_bits, SignalFields};
use crate::tables::{data_bin_order, s0_active_bins, s0_freq, s1_active_bins, s1_freq, s1_time, PILOT_BINS};
use crate::viterbi::{Viterbi, Viterbi64};

/// Nominal sample rate of the baseband stream: 20 Msamples/s.
pub const SAMPLE_RATE_HZ: f32 = 20_000_000.0;

/// How many raw samples to buffer, starting right after the coarse PLCP
/// gate fires, before searching for the long-training anchor. Generous
/// relative to the ~125-sample worst-case gap between gate and anchor at
/// the standard's sample rate, so the search window always contains a
/// full copy of the long-training body regardless of exactly when within
/// the short-training field the gate happened to fire.
const ACQUIRE_TARGET: usize = 320;

/// Minimum normalized correlation (of 1.0 == perfect match) against the
/// known long-training waveform to accept a candidate anchor.
const ANCHOR_SCORE_THRESHOLD: f32 = 0.9;

/// Construction parameters for [`FrameSynchronizer`].
#[derive(Debug, Clone, Copy, SmartDefault)]
pub struct FrameSynchronizerConfig {
    #[default(0.3)]
    pub detect_threshold: f32,
    #[default(1e-4)]
    pub squelch_floor: f32,
    #[default(None)]
    pub equalizer_smoothing_order: Option<usize>,
    /// Must match the generator's `postfix_len`: the number of samples
    /// collapsed at every inter-symbol raised-cosine join, which shifts
    /// every symbol boundary after the long-training anchor.
    #[default(1)]
    pub postfix_len: usize,
}

/// Payload handed to the host callback on frame completion, enriched
/// with an SNR diagnostic.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub rate_index: u8,
    pub length: u16,
    pub payload: Vec<u8>,
    pub valid: bool,
    pub snr_db: f32,
}

struct AcquireAccum {
    buf: Vec<Complex32>,
}

struct SignalAccum {
    buf: Vec<Complex32>,
    channel: [Complex32; FFT_SIZE],
    body_start: usize,
    stride: usize,
}

struct DataAccum {
    buf: Vec<Complex32>,
    channel: [Complex32; FFT_SIZE],
    next_body_start: usize,
    stride: usize,
    fields: SignalFields,
    row: &'static RateDescriptor,
    framing: DataFraming,
    symbols_done: usize,
    soft_deinterleaved: Vec<u8>,
}

enum State {
    SeekPlcp,
    Acquiring(AcquireAccum),
    RxSignal(SignalAccum),
    RxData(DataAccum),
}

/// Sample-driven receiver state machine. Not safe for concurrent use; one
/// instance tracks one contiguous baseband stream.
pub struct FrameSynchronizer {
    config: FrameSynchronizerConfig,
    state: State,
    ring: VecDeque<Complex32>,
    block: Vec<Complex32>,
    nco: Box<dyn Nco>,
    cfo_hz: f32,
    dft: Box<dyn Dft64>,
    modulator: Box<dyn Modulator>,
    viterbi: Box<dyn Viterbi>,
    pilots: PilotPolaritySequence,
}

impl FrameSynchronizer {
    pub fn new(config: FrameSynchronizerConfig) -> Self {
        Self {
            config,
            state: State::SeekPlcp,
            ring: VecDeque::with_capacity(80),
            block: Vec::with_capacity(64),
            nco: Box::new(DdsNco::default()),
            cfo_hz: 0.0,
            dft: Box::new(RustFftDft64::default()),
            modulator: Box::new(GrayQamModulator),
            viterbi: Box::new(Viterbi64),
            pilots: PilotPolaritySequence::new(),
        }
    }

    /// Discards in-progress frame state and returns to `SeekPlcp`. No
    /// callback is invoked for a discarded frame.
    pub fn reset(&mut self) {
        self.state = State::SeekPlcp;
        self.ring.clear();
        self.block.clear();
        self.nco.reset();
        self.cfo_hz = 0.0;
    }

    /// Pushes an arbitrary-size block of baseband samples through the
    /// state machine, invoking `on_packet` for each frame that completes
    /// within this call. Processes one sample at a time internally rather
    /// than vectorizing the state transitions.
    pub fn process_samples(&mut self, samples: &[Complex32], mut on_packet: impl FnMut(PacketEvent)) {
        for &raw in samples {
            if let Some(event) = self.process_one(raw) {
                on_packet(event);
            }
        }
    }

    fn process_one(&mut self, raw: Complex32) -> Option<PacketEvent> {
        let unmixed = matches!(self.state, State::SeekPlcp | State::Acquiring(_));
        let mixed = if unmixed {
            raw
        } else {
            let mut buf = [raw];
            self.nco.mix(&mut buf, self.cfo_hz, SAMPLE_RATE_HZ);
            buf[0]
        };

        trace!(re = mixed.re, im = mixed.im, "sample");

        match &mut self.state {
            State::SeekPlcp => {
                if self.ring.len() == 80 {
                    self.ring.pop_front();
                }
                self.ring.push_back(mixed);
                self.block.push(mixed);
                if self.block.len() != 64 {
                    return None;
                }
                self.block.clear();
                self.try_detect()
            }
            State::Acquiring(accum) => {
                accum.buf.push(mixed);
                if accum.buf.len() < ACQUIRE_TARGET {
                    return None;
                }
                self.try_anchor()
            }
            State::RxSignal(accum) => {
                accum.buf.push(mixed);
                if accum.buf.len() < accum.body_start + 64 {
                    return None;
                }
                self.decode_signal_symbol()
            }
            State::RxData(accum) => {
                accum.buf.push(mixed);
                if accum.buf.len() < accum.next_body_start + 64 {
                    return None;
                }
                self.decode_data_symbol()
            }
        }
    }

    /// SEEK_PLCP: delay-16 autocorrelation + short-training gain estimate
    /// over the ring buffer's most recent 64 samples (`ring[16..80)`).
    fn try_detect(&mut self) -> Option<PacketEvent> {
        if self.ring.len() < 80 {
            return None;
        }
        let recent: Vec<Complex32> = self.ring.iter().skip(16).copied().collect();
        debug_assert_eq!(recent.len(), 64);

        let energy: f32 = recent.iter().map(|s| s.norm_sqr()).sum::<f32>() / 64.0;
        if energy < self.config.squelch_floor {
            return None;
        }

        let mut body: [Complex32; FFT_SIZE] = recent.clone().try_into().unwrap();
        self.dft.forward(&mut body);

        let scale = (12.0f32).sqrt() / 64.0;
        let freq = s0_freq();
        let bins = s0_active_bins();
        let mut g0: [Complex32; 12] = [Complex32::new(0.0, 0.0); 12];
        for (i, &bin) in bins.iter().enumerate() {
            g0[i] = body[bin] * freq[bin].conj() * scale;
        }

        let mut s_hat = Complex32::new(0.0, 0.0);
        for i in 0..12 {
            s_hat += g0[(i + 1) % 12] * g0[i].conj();
        }

        if s_hat.norm() <= self.config.detect_threshold {
            return None;
        }

        let cfo_coarse_hz = s_hat.arg() / (2.0 * std::f32::consts::PI * 16.0) * SAMPLE_RATE_HZ;
        info!(cfo_coarse_hz, energy, "plcp candidate detected");

        self.pilots.reset();
        self.state = State::Acquiring(AcquireAccum { buf: Vec::new() });
        None
    }

    /// Matched-filters the buffered samples against the known
    /// long-training waveform to anchor the frame's exact timing, derives
    /// the fine CFO and channel estimate from the two long-training
    /// repetitions, and transitions to `RxSignal`. Abandons the candidate
    /// frame (back to `SeekPlcp`) if no confident anchor is found.
    fn try_anchor(&mut self) -> Option<PacketEvent> {
        let State::Acquiring(accum) = std::mem::replace(&mut self.state, State::SeekPlcp) else {
            unreachable!("try_anchor only reachable from Acquiring");
        };
        let buf = accum.buf;
        let p = self.config.postfix_len;

        let Some(body2_start) = find_long_training_anchor(&buf) else {
            warn!("long-training anchor not found; abandoning candidate frame");
            self.reset();
            return None;
        };

        if body2_start < 64 - p {
            warn!("long-training anchor too close to buffer start; abandoning candidate frame");
            self.reset();
            return None;
        }
        let body1_start = body2_start - (64 - p);

        let g1a = self.dft_s1_gain(&buf[body1_start..body1_start + 64]);
        let g1b = self.dft_s1_gain(&buf[body2_start..body2_start + 64]);

        let active = s1_active_bins();
        let mut corr = Complex32::new(0.0, 0.0);
        for &bin in active {
            corr += g1b[bin] * g1a[bin].conj();
        }
        let sample_gap = (64 - p) as f32; // true elapsed samples between the two repeats
        let fine_hz = corr.arg() / (2.0 * std::f32::consts::PI * sample_gap) * SAMPLE_RATE_HZ;
        self.cfo_hz = fine_hz;

        let mut channel = [Complex32::new(0.0, 0.0); FFT_SIZE];
        for &bin in active {
            channel[bin] = (g1a[bin] + g1b[bin]) * 0.5;
        }
        if let Some(order) = self.config.equalizer_smoothing_order {
            smooth_channel(&mut channel, order);
        }
        debug!(cfo_hz = self.cfo_hz, body2_start, "long-training anchor locked");

        let stride = 80 - p;
        let body_start = body2_start + stride;

        let mut buf = buf;
        self.nco.reset();
        self.nco.mix(&mut buf, self.cfo_hz, SAMPLE_RATE_HZ);

        self.state = State::RxSignal(SignalAccum { buf, channel, body_start, stride });

        let State::RxSignal(accum) = &self.state else {
            unreachable!();
        };
        if accum.buf.len() >= accum.body_start + 64 {
            return self.decode_signal_symbol();
        }
        None
    }

    /// DFTs a 64-sample window and returns the per-bin channel gain
    /// against the known long-training spectrum (`s1_freq`), non-null
    /// only at `s1_active_bins`.
    fn dft_s1_gain(&self, window: &[Complex32]) -> [Complex32; FFT_SIZE] {
        let mut buf: [Complex32; FFT_SIZE] = window.try_into().expect("window must be 64 samples");
        self.dft.forward(&mut buf);
        let freq = s1_freq();
        let mut g = [Complex32::new(0.0, 0.0); FFT_SIZE];
        for &bin in s1_active_bins() {
            g[bin] = buf[bin] * freq[bin]; // conj(+-1) == itself
        }
        g
    }

    /// Equalizes a 64-bin DFT output against `channel`, then corrects
    /// common pilot phase using `polarity`. Returns the 48 equalized data
    /// bins in [`data_bin_order`] order, and `None` at any bin where the
    /// channel estimate is too weak to trust (erasure).
    fn equalize(channel: &[Complex32; FFT_SIZE], bins: &[Complex32; FFT_SIZE], polarity: f32) -> Vec<Option<Complex32>> {
        let mut eq = [Complex32::new(0.0, 0.0); FFT_SIZE];
        let mut reliable = [false; FFT_SIZE];
        let active_bins: Vec<usize> = PILOT_BINS
            .iter()
            .map(|&(_, bin, _)| bin)
            .chain(data_bin_order().iter().copied())
            .collect();
        for bin in active_bins {
            if channel[bin].norm() >= 1e-6 {
                eq[bin] = bins[bin] / channel[bin];
                reliable[bin] = true;
            }
        }

        let mut phase_acc = Complex32::new(0.0, 0.0);
        for &(_, bin, pattern) in PILOT_BINS.iter() {
            if reliable[bin] {
                let expected = Complex32::new(pattern * polarity, 0.0);
                phase_acc += eq[bin] * expected.conj();
            }
        }
        let phi = phase_acc.arg();
        let correction = Complex32::new(phi.cos(), -phi.sin());

        data_bin_order()
            .iter()
            .map(|&bin| {
                if reliable[bin] {
                    Some(eq[bin] * correction)
                } else {
                    None
                }
            })
            .collect()
    }

    fn demap_equalized(points: &[Option<Complex32>], modulation: Modulation, n_bpsc: usize, modulator: &dyn Modulator) -> Vec<u8> {
        let mut out = Vec::with_capacity(points.len() * n_bpsc);
        for point in points {
            match point {
                Some(p) => out.extend(modulator.demap(modulation, *p)),
                None => out.extend(std::iter::repeat(127u8).take(n_bpsc)),
            }
        }
        out
    }

    fn decode_signal_symbol(&mut self) -> Option<PacketEvent> {
        let State::RxSignal(accum) = std::mem::replace(&mut self.state, State::SeekPlcp) else {
            unreachable!("decode_signal_symbol only reachable from RxSignal");
        };
        let mut body: [Complex32; FFT_SIZE] = accum.buf[accum.body_start..accum.body_start + 64].try_into().unwrap();
        self.dft.forward(&mut body);

        let polarity = self.pilots.next_polarity();
        let points = Self::equalize(&accum.channel, &body, polarity);
        let soft48 = Self::demap_equalized(&points, Modulation::Bpsk, 1, self.modulator.as_ref());

        let Some(fields) = decode_symbol_bits(&soft48, self.viterbi.as_ref()) else {
            warn!("SIGNAL field rejected");
            self.reset();
            return None;
        };

        let Ok(row) = by_index(fields.rate_index) else {
            warn!(rate_index = fields.rate_index, "SIGNAL named an invalid rate");
            self.reset();
            return None;
        };
        let framing = derive_framing(row, fields.length);
        debug!(rate = row.rate_mbps, length = fields.length, n_sym = framing.n_sym, "SIGNAL decoded");

        self.state = State::RxData(DataAccum {
            buf: accum.buf,
            channel: accum.channel,
            next_body_start: accum.body_start + accum.stride,
            stride: accum.stride,
            fields,
            row,
            framing,
            symbols_done: 0,
            soft_deinterleaved: Vec::with_capacity(framing.n_sym * row.n_cbps as usize),
        });

        let State::RxData(accum) = &self.state else {
            unreachable!();
        };
        if accum.buf.len() >= accum.next_body_start + 64 {
            return self.decode_data_symbol();
        }
        None
    }

    /// Decodes every DATA symbol already fully buffered, looping in case
    /// `Acquiring`'s lookahead (or a single large `process_samples` call)
    /// already supplied more than one symbol's worth of samples at once.
    fn decode_data_symbol(&mut self) -> Option<PacketEvent> {
        loop {
            let State::RxData(peek) = &self.state else {
                unreachable!("decode_data_symbol only reachable from RxData");
            };
            if peek.buf.len() < peek.next_body_start + 64 {
                return None;
            }

            let State::RxData(mut accum) = std::mem::replace(&mut self.state, State::SeekPlcp) else {
                unreachable!();
            };
            let mut body: [Complex32; FFT_SIZE] = accum.buf[accum.next_body_start..accum.next_body_start + 64].try_into().unwrap();
            self.dft.forward(&mut body);

            let polarity = self.pilots.next_polarity();
            let points = Self::equalize(&accum.channel, &body, polarity);
            let soft = Self::demap_equalized(&points, accum.row.modulation, accum.row.n_bpsc as usize, self.modulator.as_ref());
            let deinterleaved = table_for_rate(row_index(accum.row)).deinterleave(&soft);
            accum.soft_deinterleaved.extend(deinterleaved);
            accum.symbols_done += 1;

            if accum.symbols_done < accum.framing.n_sym {
                accum.next_body_start += accum.stride;
                self.state = State::RxData(accum);
                continue;
            }

            let decoded = decode_data(
                row_index(accum.row),
                accum.row,
                &accum.framing,
                accum.fields.length,
                &accum.soft_deinterleaved,
                self.viterbi.as_ref(),
            );

            let snr_db = estimate_snr_db(&accum.channel);
            info!(rate = accum.row.rate_mbps, length = accum.fields.length, valid = decoded.valid, "frame complete");

            self.reset();

            return Some(PacketEvent {
                rate_index: accum.fields.rate_index,
                length: accum.fields.length,
                payload: decoded.payload,
                valid: decoded.valid,
                snr_db,
            });
        }
    }
}

/// Searches `buf` for the 64-sample window that best matches the known
/// long-training waveform, returning its offset. The field transmits the
/// same 64-sample body twice back to back, and neither copy is bit-exact
/// on the wire: the raised-cosine join at every symbol boundary collapses
/// one sample into its neighbor, so the first copy has one sample altered
/// at its own internal s1a/s1b split and the second has its very last
/// sample blended with SIGNAL's first sample. With only one sample out of
/// 64 off from the reference either way, both copies still correlate far
/// better against `s1_time()` than any other offset in the buffer, and the
/// scan keeps whichever scores higher. Returns `None` if no candidate
/// clears [`ANCHOR_SCORE_THRESHOLD`].
fn find_long_training_anchor(buf: &[Complex32]) -> Option<usize> {
    if buf.len() < 64 {
        return None;
    }
    let reference = s1_time();
    let ref_energy: f32 = reference.iter().map(|s| s.norm_sqr()).sum();
    if ref_energy < 1e-9 {
        return None;
    }

    let mut best: Option<(f32, usize)> = None;
    for offset in 0..=(buf.len() - 64) {
        let window = &buf[offset..offset + 64];
        let mut corr = Complex32::new(0.0, 0.0);
        let mut win_energy = 0.0f32;
        for (w, r) in window.iter().zip(reference.iter()) {
            corr += w * r.conj();
            win_energy += w.norm_sqr();
        }
        if win_energy < 1e-9 {
            continue;
        }
        let score = corr.norm() / (ref_energy * win_energy).sqrt();
        let better = match best {
            Some((s, _)) => score > s,
            None => true,
        };
        if better {
            best = Some((score, offset));
        }
    }
    best.filter(|&(score, _)| score > ANCHOR_SCORE_THRESHOLD).map(|(_, offset)| offset)
}

fn row_index(row: &RateDescriptor) -> u8 {
    crate::rate::RATE_TABLE
        .iter()
        .position(|r| r.rate_mbps == row.rate_mbps)
        .expect("row always comes from RATE_TABLE") as u8
}

/// SNR estimate derived from the channel-estimate magnitude variance
/// across the 52 long-training bins: a cheap, already-available byproduct
/// of the long-training channel estimation step.
fn estimate_snr_db(channel: &[Complex32; FFT_SIZE]) -> f32 {
    let bins = s1_active_bins();
    let mags: Vec<f32> = bins.iter().map(|&b| channel[b].norm()).collect();
    let mean = mags.iter().sum::<f32>() / mags.len() as f32;
    if mean < 1e-9 {
        return f32::NEG_INFINITY;
    }
    let variance = mags.iter().map(|m| (m - mean).powi(2)).sum::<f32>() / mags.len() as f32;
    let snr_linear = (mean * mean) / variance.max(1e-12);
    10.0 * snr_linear.log10()
}

/// Least-squares polynomial smoothing of the channel estimate, fit
/// separately over the two subcarrier clusters (positive bins `1..=26`,
/// negative bins `38..=63`) and independently across real/imaginary parts.
fn smooth_channel(channel: &mut [Complex32; FFT_SIZE], order: usize) {
    smooth_cluster(channel, &(1..=26).collect::<Vec<_>>(), order);
    smooth_cluster(channel, &(38..=63).collect::<Vec<_>>(), order);
}

fn smooth_cluster(channel: &mut [Complex32; FFT_SIZE], bins: &[usize], order: usize) {
    let active: Vec<usize> = bins.iter().copied().filter(|&b| channel[b].norm() > 0.0).collect();
    if active.len() <= order {
        return; // not enough points to fit this order; leave the raw estimate
    }
    let xs: Vec<f32> = active.iter().map(|&b| b as f32).collect();
    let re: Vec<f32> = active.iter().map(|&b| channel[b].re).collect();
    let im: Vec<f32> = active.iter().map(|&b| channel[b].im).collect();

    let Some(coef_re) = fit_polynomial(&xs, &re, order) else {
        return;
    };
    let Some(coef_im) = fit_polynomial(&xs, &im, order) else {
        return;
    };

    for &b in &active {
        let x = b as f32;
        channel[b] = Complex32::new(eval_polynomial(&coef_re, x), eval_polynomial(&coef_im, x));
    }
}

fn eval_polynomial(coef: &[f32], x: f32) -> f32 {
    coef.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Solves a degree-`order` least-squares fit via the normal equations,
/// Gaussian-eliminated with partial pivoting. Returns `None` if the normal
/// matrix is singular.
fn fit_polynomial(xs: &[f32], ys: &[f32], order: usize) -> Option<Vec<f32>> {
    let n = order + 1;
    let mut a = vec![vec![0.0f32; n + 1]; n];
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let powers: Vec<f32> = (0..=2 * order).map(|p| x.powi(p as i32)).collect();
        for row in 0..n {
            for col in 0..n {
                a[row][col] += powers[row + col];
            }
            a[row][n] += powers[row] * y;
        }
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() < 1e-9 {
            return None;
        }
        a.swap(col, pivot);
        let pv = a[col][col];
        for v in a[col].iter_mut() {
            *v /= pv;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            for c in 0..=n {
                a[row][c] -= factor * a[col][c];
            }
        }
    }
    Some((0..n).map(|row| a[row][n]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_generator::{FrameGenerator, FrameGeneratorConfig};

    #[test]
    fn noise_only_stream_produces_no_callbacks() {
        let mut sync = FrameSynchronizer::new(FrameSynchronizerConfig::default());
        let noise: Vec<Complex32> = (0..200_000)
            .map(|i| Complex32::new(((i * 97) % 13) as f32 * 1e-5, ((i * 53) % 7) as f32 * 1e-5))
            .collect();
        let mut events = Vec::new();
        sync.process_samples(&noise, |e| events.push(e));
        assert!(events.is_empty());
    }

    #[test]
    fn loopback_through_generator_and_synchronizer() {
        let config = FrameGeneratorConfig {
            rate: 0,
            length: 10,
            scrambler_seed: 0x5d,
            ..Default::default()
        };
        let gen = FrameGenerator::new(config);
        let payload = vec![0xAAu8; 10];
        let samples = gen.generate(&payload).unwrap();

        let mut sync = FrameSynchronizer::new(FrameSynchronizerConfig::default());
        let mut events = Vec::new();
        sync.process_samples(&samples, |e| events.push(e));

        assert_eq!(events.len(), 1);
        assert!(events[0].valid);
        assert_eq!(events[0].payload, payload);
    }

    #[test]
    fn anchor_is_found_at_the_exact_second_long_training_repeat() {
        let config = FrameGeneratorConfig {
            rate: 0,
            length: 1,
            scrambler_seed: 0x5d,
            ..Default::default()
        };
        let gen = FrameGenerator::new(config);
        let samples = gen.generate(&[0x00]).unwrap();

        // Replays the exact buffering this module does: the coarse gate
        // fires once the ring first sees a clean 64-sample window inside
        // short training, after which everything from that point on is
        // handed to the anchor search.
        let mut probe = FrameSynchronizer::new(FrameSynchronizerConfig::default());
        let mut gate_fire_idx = None;
        for (i, &s) in samples.iter().enumerate() {
            probe.process_one(s);
            if matches!(probe.state, State::Acquiring(_)) {
                gate_fire_idx = Some(i);
                break;
            }
        }
        let gate_fire_idx = gate_fire_idx.expect("coarse gate should fire within short training");

        let acquired: Vec<Complex32> = samples[gate_fire_idx + 1..].to_vec();
        let body2_start = find_long_training_anchor(&acquired).expect("anchor should be found");

        // The window found matches the known long-training body
        // sample-for-sample, except for whichever single sample the
        // raised-cosine join into the next symbol collapsed (index 63 for
        // the second repeat, which is what a clean acquisition should
        // land on here).
        let reference = s1_time();
        let window = &acquired[body2_start..body2_start + 64];
        for i in 0..63 {
            assert!((window[i] - reference[i]).norm() < 1e-4, "sample {i} should match exactly");
        }
    }

    #[test]
    fn polynomial_fit_recovers_exact_line() {
        let xs = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f32> = xs.iter().map(|&x| 2.0 * x + 1.0).collect();
        let coef = fit_polynomial(&xs, &ys, 1).unwrap();
        assert!((coef[0] - 1.0).abs() < 1e-3);
        assert!((coef[1] - 2.0).abs() < 1e-3);
    }
}
