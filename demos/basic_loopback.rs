//! Encodes a short payload into a PLCP frame, pushes the resulting sample
//! stream through the receive state machine, and prints the recovered
//! packet. Run with `cargo run --example basic_loopback` once wired into
//! a binary target, or adapt into an integration test driver.

use dot11a_phy::{FrameGenerator, FrameGeneratorConfig, FrameSynchronizer, FrameSynchronizerConfig};

fn main() {
    tracing_subscriber::fmt::init();

    let payload: Vec<u8> = b"hello 802.11a".to_vec();
    let config = FrameGeneratorConfig {
        rate: 2, // 12 Mbit/s, QPSK r1/2
        length: payload.len() as u16,
        scrambler_seed: 0x5d,
        ..Default::default()
    };
    let generator = FrameGenerator::new(config);
    let samples = generator.generate(&payload).expect("encode");

    println!("generated {} samples for a {}-byte payload", samples.len(), payload.len());

    let mut synchronizer = FrameSynchronizer::new(FrameSynchronizerConfig::default());
    synchronizer.process_samples(&samples, |event| {
        println!(
            "frame: rate_index={} length={} valid={} snr_db={:.1} payload={:?}",
            event.rate_index, event.length, event.valid, event.snr_db, event.payload
        );
    });
}
