//! IEEE 802.11a/g OFDM baseband PHY: the bit-processing pipeline, the PLCP
//! frame generator, and the receive-side acquisition state machine.
//!
//! This crate is the transmit/receive data plane only. MAC framing, the
//! RF front end, retransmission, and carrier sense are out of scope; see
//! each module's documentation for the external capabilities (DFT,
//! Viterbi decoder, NCO, constellation mapper, sequence generator) a host
//! can override with optimized native implementations.

pub mod bitpipe;
pub mod bits;
pub mod conv;
pub mod dft;
pub mod error;
pub mod frame_generator;
pub mod frame_synchronizer;
pub mod interleaver;
pub mod mls;
pub mod modulator;
pub mod nco;
pub mod rate;
pub mod signal;
pub mod symbol_mapper;
pub mod tables;
pub mod viterbi;

pub use error::{PhyError, PhyResult};
pub use frame_generator::{FrameGenerator, FrameGeneratorConfig};
pub use frame_synchronizer::{FrameSynchronizer, FrameSynchronizerConfig, PacketEvent};
pub use rate::{by_index, by_signal_nibble, Coding, Modulation, RateDescriptor, RATE_TABLE};
