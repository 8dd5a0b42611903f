use std::time::Duration;

use anyhow::Result;
use test_utils::pcm_fixture_bytes;

use super::AudioBuffer;
use super::SPEECH_CHANNELS;
use super::SPEECH_SAMPLE_RATE;

#[test]
fn it_decodes_pcm16() -> Result<()> {
    let buffer =
        AudioBuffer::from_pcm16le(&pcm_fixture_bytes(), SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;

    assert_eq!(buffer.sample_rate(), 24_000);
    assert_eq!(buffer.channels(), 1);
    assert_eq!(buffer.frames(), 5);
    assert_eq!(
        buffer.samples(),
        &[0.0, 0.5, -0.5, 32767.0 / 32768.0, -1.0]
    );

    return Ok(());
}

#[test]
fn it_converts_back_to_pcm16() -> Result<()> {
    let buffer =
        AudioBuffer::from_pcm16le(&pcm_fixture_bytes(), SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;
    assert_eq!(buffer.to_pcm16(), vec![0, 16384, -16384, 32767, -32768]);

    return Ok(());
}

#[test]
fn it_reports_duration() -> Result<()> {
    let bytes = vec![0u8; 48_000];
    let buffer = AudioBuffer::from_pcm16le(&bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;

    assert_eq!(buffer.frames(), 24_000);
    assert_eq!(buffer.duration(), Duration::from_secs(1));

    return Ok(());
}

#[test]
fn it_drops_partial_frames() -> Result<()> {
    let buffer = AudioBuffer::from_pcm16le(&pcm_fixture_bytes(), SPEECH_SAMPLE_RATE, 2)?;

    assert_eq!(buffer.frames(), 2);
    assert_eq!(buffer.samples().len(), 4);

    return Ok(());
}

#[test]
fn it_rejects_unaligned_payloads() {
    let res = AudioBuffer::from_pcm16le(&[0, 1, 2], SPEECH_SAMPLE_RATE, SPEECH_CHANNELS);
    assert!(res.is_err());
}

#[test]
fn it_rejects_zero_channels() {
    let res = AudioBuffer::from_pcm16le(&[0, 1], SPEECH_SAMPLE_RATE, 0);
    assert!(res.is_err());
}

#[test]
fn it_handles_empty_payloads() -> Result<()> {
    let buffer = AudioBuffer::from_pcm16le(&[], SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;
    assert_eq!(buffer.frames(), 0);
    assert_eq!(buffer.duration(), Duration::ZERO);

    return Ok(());
}
