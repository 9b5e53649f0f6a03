//! The 64-point complex DFT/IDFT capability, kept as an injectable
//! collaborator rather than called inline throughout the PHY. [`Dft64`]
//! is the contract and [`RustFftDft64`] the built-in fallback.

use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

pub const FFT_SIZE: usize = 64;

/// A 64-point complex forward/inverse transform.
pub trait Dft64: Send + Sync {
    /// In-place forward DFT (time domain -> frequency domain).
    fn forward(&self, buf: &mut [Complex32; FFT_SIZE]);
    /// In-place inverse DFT (frequency domain -> time domain), normalized
    /// so that `forward(inverse(x)) == x`.
    fn inverse(&self, buf: &mut [Complex32; FFT_SIZE]);
}

/// `rustfft`-backed default implementation, built once and reused; the
/// planner amortizes the twiddle-factor setup across every symbol.
pub struct RustFftDft64 {
    fwd: Arc<dyn Fft<f32>>,
    inv: Arc<dyn Fft<f32>>,
}

impl Default for RustFftDft64 {
    fn default() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fwd: planner.plan_fft_forward(FFT_SIZE),
            inv: planner.plan_fft_inverse(FFT_SIZE),
        }
    }
}

impl Dft64 for RustFftDft64 {
    fn forward(&self, buf: &mut [Complex32; FFT_SIZE]) {
        self.fwd.process(buf);
    }

    fn inverse(&self, buf: &mut [Complex32; FFT_SIZE]) {
        self.inv.process(buf);
        let scale = 1.0 / FFT_SIZE as f32;
        for s in buf.iter_mut() {
            *s *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_undoes_forward() {
        let dft = RustFftDft64::default();
        let mut original = [Complex32::new(0.0, 0.0); FFT_SIZE];
        for (i, s) in original.iter_mut().enumerate() {
            *s = Complex32::new((i as f32 * 0.13).sin(), (i as f32 * 0.07).cos());
        }
        let mut buf = original;
        dft.forward(&mut buf);
        dft.inverse(&mut buf);
        for (a, b) in buf.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-3);
        }
    }
}
