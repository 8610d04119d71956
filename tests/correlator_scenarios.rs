//! Correlator state machine scenarios on hand-built magnitude streams


use rustyrx::correlator::{
    Correlator, CorrelatorConfig, DetectorState, OverlapPolicy, PayloadEncoding, Preamble,
};
use rustyrx::ConfigError;
use test_utils::init_test_tracing;

const BARKER7: [i32; 7] = [1, 1, 1, -1, -1, 1, -1];

fn barker() -> Vec<i64> {
    BARKER7.iter().map(|&c| c as i64).collect()
}

/// Payload bits as ±1 samples, MSB first
fn symbols(value: u128, bit_len: usize) -> Vec<i64> {
    (0..bit_len)
        .map(|i| if (value >> (bit_len - 1 - i)) & 1 == 1 { 1 } else { -1 })
        .collect()
}

fn correlator(payload_len: usize, overlap: OverlapPolicy) -> Correlator {
    let preamble = Preamble::new(BARKER7.to_vec()).unwrap();
    let config = CorrelatorConfig::new(preamble, 7, payload_len)
        .unwrap()
        .with_overlap_policy(overlap);
    Correlator::new(config)
}

#[test]
fn test_back_to_back_messages() {
    init_test_tracing();
    let mut stream = barker();
    stream.extend(symbols(0xA5, 8));
    stream.extend(barker());
    stream.extend(symbols(0x3C, 8));
    stream.extend([-1, -1, -1]);

    let mut correlator = correlator(8, OverlapPolicy::IgnoreWhileDecoding);
    let messages = correlator.decode_stream(&stream);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].payload, 0xA5);
    assert_eq!(messages[0].trigger_index, 6);
    assert_eq!(messages[1].payload, 0x3C);
    assert_eq!(messages[1].trigger_index, 21);
    assert!(messages.iter().all(|m| m.correlation == 7 && m.bit_len == 8));

    let stats = correlator.stats();
    assert_eq!(stats.samples, stream.len() as u64);
    assert_eq!(stats.triggers, 2);
    assert_eq!(stats.messages, 2);
    assert_eq!(stats.discarded, 0);
}

#[test]
fn test_ignore_policy_keeps_first_decode() {
    let mut stream = barker();
    stream.extend(symbols(0b1011, 4));
    stream.extend(barker());
    stream.extend(symbols(0xF0F, 12));
    stream.extend([-1; 4]);

    let mut correlator = correlator(12, OverlapPolicy::IgnoreWhileDecoding);
    let messages = correlator.decode_stream(&stream);

    assert_eq!(messages.len(), 1);
    // 1011, then the second preamble read as data, then one payload bit
    assert_eq!(messages[0].payload, 0b1011_1110010_1);
    assert_eq!(messages[0].trigger_index, 6);
    assert_eq!(correlator.stats().ignored_triggers, 1);
    assert_eq!(correlator.stats().discarded, 0);
}

#[test]
fn test_restart_policy_takes_second_preamble() {
    let mut stream = barker();
    stream.extend(symbols(0b1011, 4));
    stream.extend(barker());
    stream.extend(symbols(0xF0F, 12));
    stream.extend([-1; 4]);

    let mut correlator = correlator(12, OverlapPolicy::Restart);
    let messages = correlator.decode_stream(&stream);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload, 0xF0F);
    assert_eq!(messages[0].trigger_index, 17);
    let stats = correlator.stats();
    assert_eq!(stats.triggers, 2);
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.ignored_triggers, 0);
}

#[test]
fn test_stream_ending_mid_payload_emits_nothing() {
    let mut stream = barker();
    stream.extend(symbols(0b101, 3));

    let mut correlator = correlator(8, OverlapPolicy::IgnoreWhileDecoding);
    assert!(correlator.process(&stream).is_empty());
    assert_eq!(correlator.state(), DetectorState::Decoding);

    assert!(correlator.finish());
    assert_eq!(correlator.state(), DetectorState::Searching);
    assert_eq!(correlator.stats().messages, 0);
    assert_eq!(correlator.stats().discarded, 1);

    // The next stream starts with an empty register; sample indices keep counting
    let messages = correlator.decode_stream(&[barker(), symbols(0x81, 8)].concat());
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload, 0x81);
    assert_eq!(messages[0].trigger_index, 10 + 6);
}

#[test]
fn test_near_miss_never_triggers() {
    // One chip flipped: correlation 5, below the exact-match threshold
    let mut near = barker();
    near[3] = 1;
    let stream: Vec<i64> = near.iter().cycle().take(70).copied().collect();

    let mut correlator = correlator(4, OverlapPolicy::IgnoreWhileDecoding);
    assert!(correlator.decode_stream(&stream).is_empty());
    assert_eq!(correlator.stats().triggers, 0);
}

#[test]
fn test_pulse_position_with_peak_hold() {
    // Preamble "on on off off"; PPM bits of 4 samples
    let preamble = Preamble::from_pattern(&[1, -1], 2).unwrap();
    let config = CorrelatorConfig::new(preamble, 15, 4)
        .unwrap()
        .with_symbol_period(4, PayloadEncoding::PulsePosition)
        .unwrap()
        .with_peak_window(2)
        .unwrap();
    let mut correlator = Correlator::new(config);

    let on = 10;
    let mut stream = vec![on, on, on, 0, 0];
    for bit in [1, 0, 0, 1] {
        if bit == 1 {
            stream.extend([on, on, 0, 0]);
        } else {
            stream.extend([0, 0, on, on]);
        }
    }
    stream.push(0);

    let messages = correlator.decode_stream(&stream);
    assert_eq!(messages.len(), 1);
    let message = messages[0];
    assert_eq!(message.payload, 0b1001);
    assert_eq!(message.trigger_index, 4);
    assert_eq!(message.peak_index, 4);
    assert_eq!(message.correlation, 20);
    assert_eq!(correlator.stats().triggers, 1);
}

#[test]
fn test_peak_hold_keeps_back_to_back_frames() {
    init_test_tracing();
    let preamble = Preamble::new(vec![1, -1, -1, -1]).unwrap();

    // A hold longer than the payload would run into the next preamble
    let short = CorrelatorConfig::new(preamble.clone(), 10, 1).unwrap();
    assert_eq!(
        short.with_peak_window(6),
        Err(ConfigError::PeakWindowTooLong {
            peak_window: 6,
            payload_samples: 1
        })
    );

    // Longest hold allowed for a 4-sample payload, frames with no gap
    let config = CorrelatorConfig::new(preamble, 10, 4)
        .unwrap()
        .with_peak_window(3)
        .unwrap();
    let mut correlator = Correlator::new(config);
    let stream = [10, 0, 0, 0, 5, -5, 5, 5, 10, 0, 0, 0, -5, 5, 5, -5];

    let messages = correlator.decode_stream(&stream);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].payload, 0b1011);
    assert_eq!(messages[0].trigger_index, 3);
    assert_eq!(messages[1].payload, 0b0110);
    assert_eq!(messages[1].trigger_index, 11);
    assert_eq!(correlator.stats().triggers, 2);
    assert_eq!(correlator.stats().discarded, 0);
}
