//! Per-rate constant metadata (802.11a/g Table 78/80), read-only and
//! shared process-wide.

use crate::error::PhyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    Bpsk,
    Qpsk,
    Qam16,
    Qam64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coding {
    R1_2,
    R2_3,
    R3_4,
}

impl Coding {
    /// `(numerator, denominator)` of the coding rate.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            Coding::R1_2 => (1, 2),
            Coding::R2_3 => (2, 3),
            Coding::R3_4 => (3, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDescriptor {
    pub rate_mbps: u8,
    pub modulation: Modulation,
    pub n_bpsc: u8,
    pub coding: Coding,
    pub n_cbps: u16,
    pub n_dbps: u16,
    pub signal_nibble: u8,
}

/// 802.11a/g rate table, indexed 0..=7 for 6,9,12,18,24,36,48,54 Mbit/s.
pub const RATE_TABLE: [RateDescriptor; 8] = [
    RateDescriptor {
        rate_mbps: 6,
        modulation: Modulation::Bpsk,
        n_bpsc: 1,
        coding: Coding::R1_2,
        n_cbps: 48,
        n_dbps: 24,
        signal_nibble: 0b1101,
    },
    RateDescriptor {
        rate_mbps: 9,
        modulation: Modulation::Bpsk,
        n_bpsc: 1,
        coding: Coding::R3_4,
        n_cbps: 48,
        n_dbps: 36,
        signal_nibble: 0b1111,
    },
    RateDescriptor {
        rate_mbps: 12,
        modulation: Modulation::Qpsk,
        n_bpsc: 2,
        coding: Coding::R1_2,
        n_cbps: 96,
        n_dbps: 48,
        signal_nibble: 0b0101,
    },
    RateDescriptor {
        rate_mbps: 18,
        modulation: Modulation::Qpsk,
        n_bpsc: 2,
        coding: Coding::R3_4,
        n_cbps: 96,
        n_dbps: 72,
        signal_nibble: 0b0111,
    },
    RateDescriptor {
        rate_mbps: 24,
        modulation: Modulation::Qam16,
        n_bpsc: 4,
        coding: Coding::R1_2,
        n_cbps: 192,
        n_dbps: 96,
        signal_nibble: 0b1001,
    },
    RateDescriptor {
        rate_mbps: 36,
        modulation: Modulation::Qam16,
        n_bpsc: 4,
        coding: Coding::R3_4,
        n_cbps: 192,
        n_dbps: 144,
        signal_nibble: 0b1011,
    },
    RateDescriptor {
        rate_mbps: 48,
        modulation: Modulation::Qam64,
        n_bpsc: 6,
        coding: Coding::R2_3,
        n_cbps: 288,
        n_dbps: 192,
        signal_nibble: 0b0001,
    },
    RateDescriptor {
        rate_mbps: 54,
        modulation: Modulation::Qam64,
        n_bpsc: 6,
        coding: Coding::R3_4,
        n_cbps: 288,
        n_dbps: 216,
        signal_nibble: 0b0011,
    },
];

/// Looks up a rate by table index (0..=7).
pub fn by_index(rate: u8) -> Result<&'static RateDescriptor, PhyError> {
    RATE_TABLE
        .get(rate as usize)
        .ok_or(PhyError::InvalidRate(rate))
}

/// Reverse lookup from the 4-bit SIGNAL rate nibble to its descriptor and
/// table index. Used by `RX_SIGNAL` once the nibble has been decoded.
pub fn by_signal_nibble(nibble: u8) -> Option<(u8, &'static RateDescriptor)> {
    RATE_TABLE
        .iter()
        .enumerate()
        .find(|(_, r)| r.signal_nibble == nibble)
        .map(|(i, r)| (i as u8, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rows_hold_the_invariant() {
        for r in RATE_TABLE.iter() {
            assert_eq!(r.n_cbps, 48 * r.n_bpsc as u16);
            let (num, den) = r.coding.ratio();
            assert_eq!(r.n_dbps as u32 * den, r.n_cbps as u32 * num);
        }
    }

    #[test]
    fn nibble_roundtrips_through_index() {
        for i in 0..8u8 {
            let r = by_index(i).unwrap();
            let (idx, r2) = by_signal_nibble(r.signal_nibble).unwrap();
            assert_eq!(idx, i);
            assert_eq!(r2.rate_mbps, r.rate_mbps);
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert_eq!(by_index(8), Err(PhyError::InvalidRate(8)));
    }

    #[test]
    fn unknown_nibble_is_none() {
        assert!(by_signal_nibble(0b1110).is_none());
    }
}
