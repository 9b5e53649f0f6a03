use thiserror::Error;

/// Errors surfaced by the public encode/decode entry points.
///
/// Frame rejection (bad SIGNAL parity, out-of-range length, ...) is *not*
/// represented here: per the synchronizer's propagation policy the sample
/// path never fails, it only transitions state. See
/// [`crate::frame_synchronizer::PacketEvent`] for the decode-side validity
/// signal.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PhyError {
    #[error("rate index {0} is out of range 0..=7")]
    InvalidRate(u8),

    #[error("length {0} is out of range 1..=4095")]
    InvalidLength(u16),

    #[error("scrambler seed must be nonzero (0 stalls the generator)")]
    ZeroSeed,

    #[error("expected buffer of {expected} samples/bits, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}

pub type PhyResult<T> = Result<T, PhyError>;
