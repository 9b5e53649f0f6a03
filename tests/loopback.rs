//! End-to-end: encode a frame with `FrameGenerator`, push the sample
//! stream through `FrameSynchronizer`, and check the recovered packet
//! matches what went in.

use dot11a_phy::{FrameGenerator, FrameGeneratorConfig, FrameSynchronizer, FrameSynchronizerConfig};

fn roundtrip(rate: u8, seed: u8, payload: &[u8]) {
    let config = FrameGeneratorConfig {
        rate,
        length: payload.len() as u16,
        scrambler_seed: seed,
        ..Default::default()
    };
    let samples = FrameGenerator::new(config).generate(payload).expect("encode");

    let mut sync = FrameSynchronizer::new(FrameSynchronizerConfig::default());
    let mut events = Vec::new();
    sync.process_samples(&samples, |e| events.push(e));

    assert_eq!(events.len(), 1, "rate {rate} expected exactly one decoded frame");
    let event = &events[0];
    assert_eq!(event.rate_index, rate);
    assert_eq!(event.length, payload.len() as u16);
    assert!(event.valid, "rate {rate} frame should decode as valid");
    assert_eq!(event.payload, payload, "rate {rate} payload mismatch");
}

#[test]
fn every_rate_round_trips_a_short_payload() {
    let payload: Vec<u8> = b"hello 802.11a".to_vec();
    for rate in 0u8..8 {
        roundtrip(rate, 0x5d, &payload);
    }
}

#[test]
fn round_trips_a_payload_spanning_many_symbols() {
    let payload: Vec<u8> = (0..400u16).map(|i| (i * 37 + 11) as u8).collect();
    roundtrip(7, 0x2a, &payload);
}

#[test]
fn round_trips_the_minimum_payload_length() {
    roundtrip(0, 0x01, &[0x42]);
}

#[test]
fn back_to_back_frames_both_decode() {
    let config = FrameGeneratorConfig {
        rate: 2,
        length: 5,
        scrambler_seed: 0x11,
        ..Default::default()
    };
    let generator = FrameGenerator::new(config);
    let first = generator.generate(b"first").unwrap();
    let second = generator.generate(b"secnd").unwrap();

    let mut stream = first;
    stream.extend(std::iter::repeat(num_complex::Complex32::new(0.0, 0.0)).take(200));
    stream.extend(second);

    let mut sync = FrameSynchronizer::new(FrameSynchronizerConfig::default());
    let mut events = Vec::new();
    sync.process_samples(&stream, |e| events.push(e));

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].payload, b"first");
    assert_eq!(events[1].payload, b"secnd");
}

#[test]
fn different_scrambler_seeds_all_decode() {
    let payload = b"seed test".to_vec();
    for seed in [0x01u8, 0x2a, 0x5d, 0x7f] {
        roundtrip(3, seed, &payload);
    }
}
