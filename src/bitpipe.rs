//! The bit-level codec: scrambler, SERVICE/tail/pad framing, and the glue
//! that drives `conv` + puncturing + `interleaver` over a whole DATA blob.

use crate::bits::{pack_msb, unpack_msb};
use crate::conv::{mother_encode, puncture, puncture_matrix};
use crate::error::{PhyError, PhyResult};
use crate::interleaver::table_for_rate;
use crate::mls::Lfsr7;
use crate::rate::RateDescriptor;
use crate::viterbi::Viterbi;

/// The additive data scrambler: a 7-bit LFSR (x^7 + x^4 + 1) whose output
/// stream is XORed bitwise (MSB-first within each byte) with the message.
/// Scrambling is its own inverse.
pub struct Scrambler {
    lfsr: Lfsr7,
}

impl Scrambler {
    /// `seed` is masked to 7 bits; an all-zero seed is rejected because the
    /// generator would stall.
    pub fn new(seed: u8) -> PhyResult<Self> {
        let seed = seed & 0x7f;
        if seed == 0 {
            return Err(PhyError::ZeroSeed);
        }
        Ok(Self {
            lfsr: Lfsr7::new(seed),
        })
    }

    /// XORs `bits` with the generator stream; identical in both directions.
    pub fn apply(&mut self, bits: &[u8]) -> Vec<u8> {
        bits.iter().map(|&b| b ^ self.lfsr.next_bit()).collect()
    }

    /// Recovers the 7-bit seed from the first 7 *scrambled* SERVICE bits,
    /// exploiting that the SERVICE field's corresponding plaintext bits are
    /// always zero: the scrambled bits there equal the keystream itself.
    /// Every nonzero seed produces a distinct 7-bit output window (a
    /// maximal-length sequence's defining "distinct window" property), so
    /// the match is unique.
    pub fn recover_seed(scrambled_service_prefix: &[u8]) -> Option<u8> {
        debug_assert!(scrambled_service_prefix.len() >= 7);
        (1u8..=0x7f).find(|&seed| {
            let mut probe = Lfsr7::new(seed);
            scrambled_service_prefix[..7]
                .iter()
                .all(|&b| probe.next_bit() == b)
        })
    }
}

/// Per-packet sizing derived from the rate and declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFraming {
    pub n_sym: usize,
    pub n_data: usize,
    pub n_pad: usize,
}

const SERVICE_BITS: usize = 16;
const TAIL_BITS: usize = 6;

pub fn derive_framing(row: &RateDescriptor, length: u16) -> DataFraming {
    let payload_bits = 8 * length as usize;
    let n_dbps = row.n_dbps as usize;
    let raw_bits = SERVICE_BITS + payload_bits + TAIL_BITS;
    let n_sym = raw_bits.div_ceil(n_dbps);
    let n_data = n_sym * n_dbps;
    let n_pad = n_data - raw_bits;
    DataFraming {
        n_sym,
        n_data,
        n_pad,
    }
}

/// Builds the SERVICE(16, zero) + payload + tail(6, zero) + pad(zero) bit
/// vector, length `framing.n_data`.
fn assemble(payload: &[u8], framing: &DataFraming) -> Vec<u8> {
    let mut bits = vec![0u8; framing.n_data];
    let payload_bits = unpack_msb(payload, payload.len() * 8);
    bits[SERVICE_BITS..SERVICE_BITS + payload_bits.len()].copy_from_slice(&payload_bits);
    bits
}

/// Encodes one DATA payload into the interleaved, punctured bit stream
/// ready for per-symbol subcarrier mapping: `n_sym` groups of `n_cbps` bits.
pub fn encode(
    rate_index: u8,
    row: &RateDescriptor,
    seed: u8,
    payload: &[u8],
) -> PhyResult<(DataFraming, Vec<u8>)> {
    let framing = derive_framing(row, payload.len() as u16);
    let mut raw = assemble(payload, &framing);

    let mut scrambler = Scrambler::new(seed)?;
    raw = scrambler.apply(&raw);
    // Tail bits must reach the convolutional encoder as zero regardless of
    // what scrambling did to them, so the trellis is driven back to the
    // all-zero state at the end of the message.
    let tail_start = framing.n_data - framing.n_pad - TAIL_BITS;
    for b in &mut raw[tail_start..tail_start + TAIL_BITS] {
        *b = 0;
    }

    let coded = mother_encode(&raw);
    let punctured = match puncture_matrix(row.coding) {
        Some(matrix) => puncture(&coded, &matrix),
        None => coded,
    };

    let table = table_for_rate(rate_index);
    let mut out = Vec::with_capacity(punctured.len());
    for symbol in punctured.chunks(row.n_cbps as usize) {
        out.extend(table.interleave(symbol));
    }
    Ok((framing, out))
}

/// Decoded DATA payload plus a best-effort validity signal: the Viterbi
/// decode can complete even when the received frame was corrupt, so
/// `valid` reflects a check of the descrambled SERVICE bits, which are
/// always zero on the transmit side. The tail bits aren't usable for this:
/// the transmitter forces them to zero only *after* scrambling (see
/// `encode` above), so descrambling the received tail recovers the
/// scrambler keystream, not zero.
pub struct Decoded {
    pub payload: Vec<u8>,
    pub valid: bool,
}

/// Decodes one DATA payload from the per-symbol soft bits the synchronizer
/// accumulated (already de-interleaved, concatenated symbol by symbol).
pub fn decode(
    rate_index: u8,
    row: &RateDescriptor,
    framing: &DataFraming,
    length: u16,
    deinterleaved_soft: &[u8],
    viterbi: &dyn Viterbi,
) -> Decoded {
    let _ = rate_index; // table already baked into `row`/`framing` by the caller

    let soft_raw: Vec<u8> = match puncture_matrix(row.coding) {
        Some(matrix) => {
            let original_len = framing.n_data * 2;
            crate::conv::depuncture(deinterleaved_soft, &matrix, original_len)
        }
        None => deinterleaved_soft.to_vec(),
    };

    let hard = viterbi.decode(&soft_raw, soft_raw.len());
    debug_assert_eq!(hard.len(), framing.n_data);

    let seed = Scrambler::recover_seed(&hard[0..7]);
    let Some(seed) = seed else {
        return Decoded {
            payload: Vec::new(),
            valid: false,
        };
    };
    let mut scrambler = Scrambler::new(seed).expect("recovered seed is always nonzero");
    let plain = scrambler.apply(&hard);

    let payload_bits = 8 * length as usize;
    let payload_start = SERVICE_BITS;
    let payload_end = payload_start + payload_bits;
    let payload = pack_msb(&plain[payload_start..payload_end]);

    let valid = plain[0..SERVICE_BITS].iter().all(|&b| b == 0);

    Decoded { payload, valid }
}
