//! Cross-checks on the frequency-grid constants as seen from outside the
//! crate: bin classification is consistent with the data and pilot bin
//! lists, and the 64-bin grid has exactly one DC bin and 11 guard bins.

use dot11a_phy::tables::{bin_class, data_bin_order, s0_active_bins, s1_active_bins, BinClass, DC_BIN, GUARD_BINS, PILOT_BINS};

#[test]
fn every_bin_classifies_into_exactly_one_bucket() {
    let mut null_count = 0;
    let mut pilot_count = 0;
    let mut data_count = 0;
    for bin in 0..64 {
        match bin_class(bin) {
            BinClass::Null => null_count += 1,
            BinClass::Pilot => pilot_count += 1,
            BinClass::Data => data_count += 1,
        }
    }
    assert_eq!(null_count, 1 + GUARD_BINS.len());
    assert_eq!(pilot_count, PILOT_BINS.len());
    assert_eq!(data_count, 48);
}

#[test]
fn data_bin_order_matches_bin_class() {
    for &bin in data_bin_order() {
        assert_eq!(bin_class(bin), BinClass::Data);
    }
}

#[test]
fn dc_bin_is_bin_zero_and_null() {
    assert_eq!(DC_BIN, 0);
    assert_eq!(bin_class(0), BinClass::Null);
}

#[test]
fn pilot_bins_are_disjoint_from_data_and_guard() {
    for &(_, bin, _) in &PILOT_BINS {
        assert!(!GUARD_BINS.contains(&bin));
        assert!(!data_bin_order().contains(&bin));
    }
}

#[test]
fn short_and_long_training_active_bins_are_disjoint_from_guards() {
    for &bin in s0_active_bins() {
        assert!(!GUARD_BINS.contains(&bin));
        assert_ne!(bin, DC_BIN);
    }
    for &bin in s1_active_bins() {
        assert!(!GUARD_BINS.contains(&bin));
        assert_ne!(bin, DC_BIN);
    }
    assert_eq!(s1_active_bins().len(), PILOT_BINS.len() + data_bin_order().len());
}
